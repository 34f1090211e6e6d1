//! A polygon: an ordered, coplanar loop of vertices with a cached plane.

use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::plane::Plane;
use crate::vertex::Vertex;
use nalgebra::Point3;
use std::sync::OnceLock;

/// A polygon, defined by a list of at least three coplanar vertices.
/// - `S` is the generic metadata type, stored as `Option<S>`.
///
/// The cached `plane` is computed from the first three vertices at
/// construction; every vertex is expected to lie on it within epsilon.
#[derive(Debug, Clone)]
pub struct Polygon<S: Clone> {
    pub vertices: Vec<Vertex>,
    pub plane: Plane,
    /// Lazily calculated AABB that spans `vertices`.
    pub bounding_box: OnceLock<Aabb>,
    pub metadata: Option<S>,
}

impl<S: Clone + Send + Sync> Polygon<S> {
    /// Create a polygon from vertices.
    pub fn new(vertices: Vec<Vertex>, metadata: Option<S>) -> Self {
        assert!(vertices.len() >= 3, "degenerate polygon");

        let plane = Plane::from_points(
            &vertices[0].pos,
            &vertices[1].pos,
            &vertices[2].pos,
        );

        Polygon {
            vertices,
            plane,
            bounding_box: OnceLock::new(),
            metadata,
        }
    }

    /// Reverses winding order, flips vertex normals, and flips the plane.
    /// Converts an outward-facing polygon into an inward-facing one.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        for v in &mut self.vertices {
            v.flip();
        }
        self.plane.flip();
    }

    /// Returns the axis-aligned bounding box of this polygon.
    /// Vertex positions never change after construction, so the box is cached.
    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
            for v in &self.vertices {
                mins.x = mins.x.min(v.pos.x);
                mins.y = mins.y.min(v.pos.y);
                mins.z = mins.z.min(v.pos.z);
                maxs.x = maxs.x.max(v.pos.x);
                maxs.y = maxs.y.max(v.pos.y);
                maxs.z = maxs.z.max(v.pos.z);
            }
            Aabb::new(mins, maxs)
        })
    }

    /// Triangulate this polygon as a fan from vertex 0, returning `[v0, v1, v2]`
    /// triples. Splitting only ever produces convex loops, so the fan is exact.
    pub fn triangulate(&self) -> Vec<[Vertex; 3]> {
        let mut triangles = Vec::with_capacity(self.vertices.len().saturating_sub(2));
        for i in 2..self.vertices.len() {
            triangles.push([self.vertices[0], self.vertices[i - 1], self.vertices[i]]);
        }
        triangles
    }
}
