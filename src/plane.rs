//! Infinite splitting plane: point classification and polygon splitting.

use crate::float_types::{EPSILON, Real};
use crate::polygon::Polygon;
use crate::vertex::Vertex;
use nalgebra::{Point3, Vector3};

// Classification constants, OR-able into a polygon-level class.
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// A plane in the form `normal · p == offset`.
///
/// `normal` is deliberately **not** normalized: it is the raw cross product of
/// two polygon edges, so its magnitude grows with triangle size. Classification
/// compares the raw signed distance `normal · p - offset` against [`EPSILON`],
/// which means the effective geometric tolerance shrinks for large triangles
/// and far-from-origin coordinates. Normalizing here would change the numeric
/// behavior of every split, so the non-unit form is kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub normal: Vector3<Real>,
    /// `normal · p` for any point `p` on the plane.
    pub offset: Real,
}

impl Plane {
    /// Plane through three points, right-handed: `normal = (b-a) × (c-a)`.
    ///
    /// Collinear or coincident points produce a zero normal; the result is
    /// then invalid and every consumer treats it as a pass-through.
    pub fn from_points(a: &Point3<Real>, b: &Point3<Real>, c: &Point3<Real>) -> Self {
        let normal = (b - a).cross(&(c - a));
        let offset = normal.dot(&a.coords);
        Plane { normal, offset }
    }

    pub const fn from_normal(normal: Vector3<Real>, offset: Real) -> Self {
        Plane { normal, offset }
    }

    /// A plane is usable as a splitter iff its normal has nonzero length.
    pub fn is_valid(&self) -> bool {
        self.normal.norm_squared() > 0.0
    }

    /// Swap the front/back sense of the plane.
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.offset = -self.offset;
    }

    /// Return a flipped copy of this plane.
    pub fn flipped(&self) -> Self {
        Plane {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Classify a point as [`FRONT`], [`BACK`] or [`COPLANAR`].
    pub fn orient_point(&self, point: &Point3<Real>) -> i8 {
        let t = self.normal.dot(&point.coords) - self.offset;
        if t < -EPSILON {
            BACK
        } else if t > EPSILON {
            FRONT
        } else {
            COPLANAR
        }
    }

    /// Split `polygon` by this plane if needed.
    ///
    /// Returns four buckets: `(coplanar_front, coplanar_back, front, back)`.
    /// Coplanar polygons land in `coplanar_front` when their own plane faces
    /// the same way as this one (`normal · polygon_normal > 0`), otherwise in
    /// `coplanar_back`; callers route those buckets as their operation
    /// requires. Spanning polygons are cut along the plane: the walk visits
    /// edges in vertex order so both fragments keep the original winding, and
    /// each crossing edge contributes one interpolated vertex to *both*
    /// fragments. Fragments left with fewer than 3 vertices are degenerate
    /// slivers and are dropped silently.
    pub fn split_polygon<S: Clone + Send + Sync>(
        &self,
        polygon: &Polygon<S>,
    ) -> (
        Vec<Polygon<S>>,
        Vec<Polygon<S>>,
        Vec<Polygon<S>>,
        Vec<Polygon<S>>,
    ) {
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        let mut front = Vec::new();
        let mut back = Vec::new();

        // Classify each vertex, OR the per-vertex classes into the polygon class.
        let mut types = Vec::with_capacity(polygon.vertices.len());
        let mut polygon_type: i8 = COPLANAR;
        for vertex in &polygon.vertices {
            let vertex_type = self.orient_point(&vertex.pos);
            polygon_type |= vertex_type;
            types.push(vertex_type);
        }

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            },
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),
            _ => {
                let mut split_front = Vec::<Vertex>::new();
                let mut split_back = Vec::<Vertex>::new();

                for i in 0..polygon.vertices.len() {
                    let j = (i + 1) % polygon.vertices.len();
                    let type_i = types[i];
                    let type_j = types[j];
                    let vertex_i = &polygon.vertices[i];
                    let vertex_j = &polygon.vertices[j];

                    if type_i != BACK {
                        split_front.push(*vertex_i);
                    }
                    if type_i != FRONT {
                        split_back.push(*vertex_i);
                    }

                    // Edge crosses the plane: interpolate the crossing vertex
                    // and hand it to both fragments.
                    if (type_i | type_j) == SPANNING {
                        let denom = self.normal.dot(&(vertex_j.pos - vertex_i.pos));
                        if denom.abs() > EPSILON {
                            let t = (self.offset - self.normal.dot(&vertex_i.pos.coords))
                                / denom;
                            let vertex_new = vertex_i.interpolate(vertex_j, t);
                            split_front.push(vertex_new);
                            split_back.push(vertex_new);
                        }
                    }
                }

                if split_front.len() >= 3 {
                    front.push(Polygon::new(split_front, polygon.metadata.clone()));
                }
                if split_back.len() >= 3 {
                    back.push(Polygon::new(split_back, polygon.metadata.clone()));
                }
            },
        }

        (coplanar_front, coplanar_back, front, back)
    }
}
