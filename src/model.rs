//! `Model`: the bridge between external mesh records and BSP polygons, plus
//! the repair passes (weld, crack repair, component split) that make a boolean
//! result simulatable again.

use crate::config::PassPolicy;
use crate::errors::MeshError;
use crate::float_types::{
    EPSILON, Real,
    parry3d::{
        bounding_volume::Aabb,
        query::{Ray, RayCast},
        shape::Triangle,
    },
};
use crate::polygon::Polygon;
use crate::submodel::SubModel;
use crate::vertex::Vertex;
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use nalgebra::{Isometry3, Matrix4, Point3, Vector2, Vector3, Vector4};
use std::sync::OnceLock;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Distance tolerance when testing whether a vertex sits on a triangle edge.
const DEFAULT_OVERLAP_RANGE: Real = 0.01;

/// The external mesh record: plain attribute and index buffers, nothing more.
///
/// This is the only currency exchanged with renderers and simulators. `uvs`
/// may be empty (imported as zero) and `colors` may be empty or mismatched
/// (imported as opaque white); positions, normals and indices must agree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<Point3<Real>>,
    pub normals: Vec<Vector3<Real>>,
    pub uvs: Vec<Vector2<Real>>,
    pub colors: Vec<Vector4<Real>>,
    /// Triangle list; length is a multiple of 3.
    pub indices: Vec<usize>,
}

/// An indexed triangle mesh in the working coordinate frame.
///
/// Round-trips losslessly to and from a flat list of triangle [`Polygon`]s;
/// owns the repair passes that run after a boolean operation.
#[derive(Debug, Clone)]
pub struct Model<S: Clone> {
    pub vertices: Vec<Vertex>,
    /// Triangle list into `vertices`; validated once at import.
    pub indices: Vec<usize>,
    /// Edge tolerance used by the crack-repair pass.
    pub overlap_range: Real,
    /// Metadata carried onto every polygon this model emits.
    pub metadata: Option<S>,
    /// Lazily calculated AABB that spans `vertices`.
    pub bounding_box: OnceLock<Aabb>,
}

fn white() -> Vector4<Real> {
    Vector4::new(1.0, 1.0, 1.0, 1.0)
}

impl<S: Clone + Send + Sync> Model<S> {
    /// Returns a new empty Model.
    pub fn new() -> Self {
        Model {
            vertices: Vec::new(),
            indices: Vec::new(),
            overlap_range: DEFAULT_OVERLAP_RANGE,
            metadata: None,
            bounding_box: OnceLock::new(),
        }
    }

    /// Import an external mesh record, transforming every position and normal
    /// by `transform` so both operands of a boolean share one coordinate
    /// frame.
    ///
    /// The index buffer is validated here and trusted everywhere after:
    /// malformed indices are precondition errors, not recoverable states.
    pub fn from_buffers(
        buffers: &MeshBuffers,
        transform: &Matrix4<Real>,
    ) -> Result<Self, MeshError> {
        let vertex_count = buffers.positions.len();

        if buffers.normals.len() != vertex_count {
            return Err(MeshError::AttributeCountMismatch {
                positions: vertex_count,
                normals: buffers.normals.len(),
            });
        }
        if buffers.indices.len() % 3 != 0 {
            return Err(MeshError::IndexCountNotTriangles {
                len: buffers.indices.len(),
            });
        }
        if let Some(&index) = buffers.indices.iter().find(|&&i| i >= vertex_count) {
            return Err(MeshError::IndexOutOfRange {
                index,
                len: vertex_count,
            });
        }

        let use_colors = buffers.colors.len() == vertex_count;
        let mut vertices = Vec::with_capacity(vertex_count);
        for i in 0..vertex_count {
            let pos = transform.transform_point(&buffers.positions[i]);
            let normal = transform.transform_vector(&buffers.normals[i]);
            let uv = buffers.uvs.get(i).copied().unwrap_or_else(Vector2::zeros);
            let color = if use_colors { buffers.colors[i] } else { white() };
            vertices.push(Vertex::new(pos, normal, uv, color));
        }

        Ok(Model {
            vertices,
            indices: buffers.indices.clone(),
            overlap_range: DEFAULT_OVERLAP_RANGE,
            metadata: None,
            bounding_box: OnceLock::new(),
        })
    }

    /// Rebuild a model from a boolean result.
    ///
    /// Every polygon is fan-triangulated from its first vertex (splitting can
    /// produce n-gons) and every triangle corner gets its own vertex slot;
    /// nothing is shared, which is why [`Model::weld`] runs next.
    pub fn from_polygons(polygons: &[Polygon<S>]) -> Self {
        let metadata = polygons.first().and_then(|p| p.metadata.clone());
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for polygon in polygons {
            for triangle in polygon.triangulate() {
                for vertex in triangle {
                    indices.push(vertices.len());
                    vertices.push(vertex);
                }
            }
        }

        Model {
            vertices,
            indices,
            overlap_range: DEFAULT_OVERLAP_RANGE,
            metadata,
            bounding_box: OnceLock::new(),
        }
    }

    /// Every 3 consecutive indices become one triangle polygon.
    pub fn to_polygons(&self) -> Vec<Polygon<S>> {
        self.indices
            .chunks_exact(3)
            .map(|tri| {
                Polygon::new(
                    vec![
                        self.vertices[tri[0]],
                        self.vertices[tri[1]],
                        self.vertices[tri[2]],
                    ],
                    self.metadata.clone(),
                )
            })
            .collect()
    }

    /// Export the model as a plain mesh record.
    pub fn to_buffers(&self) -> MeshBuffers {
        MeshBuffers {
            positions: self.vertices.iter().map(|v| v.pos).collect(),
            normals: self.vertices.iter().map(|v| v.normal).collect(),
            uvs: self.vertices.iter().map(|v| v.uv).collect(),
            colors: self.vertices.iter().map(|v| v.color).collect(),
            indices: self.indices.clone(),
        }
    }

    /// Weld vertices whose positions coincide after rounding to
    /// `decimal_places`.
    ///
    /// Walks the index buffer (so unreferenced vertices drop out), keeps the
    /// first occurrence of each quantized position (snapped to the rounded
    /// coordinates) and folds the normals of every merged occurrence into the
    /// survivor's shared normal. Idempotent: welding a welded model changes
    /// nothing.
    pub fn weld(&mut self, decimal_places: u32) {
        let factor = (10.0 as Real).powi(decimal_places as i32);
        let quantize = |p: &Point3<Real>| -> (i64, i64, i64) {
            (
                (p.x * factor).round() as i64,
                (p.y * factor).round() as i64,
                (p.z * factor).round() as i64,
            )
        };

        let mut slot_by_position: HashMap<(i64, i64, i64), usize> = HashMap::new();
        let mut vertices: Vec<Vertex> = Vec::new();
        let mut indices = Vec::with_capacity(self.indices.len());

        for &index in &self.indices {
            let source = &self.vertices[index];
            let key = quantize(&source.pos);
            match slot_by_position.entry(key) {
                Entry::Occupied(slot) => {
                    let existing = *slot.get();
                    vertices[existing].add_shared_normal(source.normal);
                    indices.push(existing);
                },
                Entry::Vacant(slot) => {
                    let rounded = Point3::new(
                        key.0 as Real / factor,
                        key.1 as Real / factor,
                        key.2 as Real / factor,
                    );
                    slot.insert(vertices.len());
                    indices.push(vertices.len());
                    vertices.push(Vertex::new(
                        rounded,
                        source.normal,
                        source.uv,
                        source.color,
                    ));
                },
            }
        }

        self.vertices = vertices;
        self.indices = indices;
        self.invalidate_bounding_box();
    }

    /// Repair T-junction cracks: a vertex lying on the interior of another
    /// triangle's edge splits that triangle in two, so boolean seams end up
    /// sharing vertices and stop showing cracks in rendering and simulation.
    ///
    /// [`PassPolicy::FixedCount`] runs exactly `passes` sweeps (at least one);
    /// [`PassPolicy::UntilFixedPoint`] sweeps until nothing changes.
    pub fn make_watertight(&mut self, passes: u32, policy: PassPolicy) {
        let mut sweeps = 0u32;
        loop {
            sweeps += 1;
            let changed = self.watertight_sweep();
            let done = match policy {
                PassPolicy::FixedCount => sweeps >= passes.max(1),
                PassPolicy::UntilFixedPoint => !changed,
            };
            if done {
                break;
            }
        }
    }

    /// One repair sweep: for each vertex, the first triangle whose edge it
    /// sits on is split, then the scan moves to the next vertex.
    #[cfg(not(feature = "parallel"))]
    fn watertight_sweep(&mut self) -> bool {
        let mut changed = false;
        for vertex in 0..self.vertices.len() {
            'triangles: for triangle in 0..self.indices.len() / 3 {
                let base = triangle * 3;
                for edge in 0..3 {
                    if let Some(replacement) = self.split_edge(vertex, base, edge) {
                        let _ = self.indices.splice(base..base + 3, replacement);
                        changed = true;
                        break 'triangles;
                    }
                }
            }
        }
        changed
    }

    /// One repair sweep, fanned out with rayon: for each vertex the triangle
    /// scan runs data-parallel into a repair list, which the calling thread
    /// then merges into the index buffer in one rebuild.
    #[cfg(feature = "parallel")]
    fn watertight_sweep(&mut self) -> bool {
        let mut changed = false;
        for vertex in 0..self.vertices.len() {
            let repairs: Vec<(usize, [usize; 6])> = (0..self.indices.len() / 3)
                .into_par_iter()
                .filter_map(|triangle| {
                    let base = triangle * 3;
                    (0..3).find_map(|edge| {
                        self.split_edge(vertex, base, edge)
                            .map(|replacement| (base, replacement))
                    })
                })
                .collect();

            if repairs.is_empty() {
                continue;
            }
            changed = true;

            let mut rebuilt = Vec::with_capacity(self.indices.len() + repairs.len() * 3);
            let mut pending = repairs.iter().peekable();
            for triangle in 0..self.indices.len() / 3 {
                let base = triangle * 3;
                match pending.peek() {
                    Some((repair_base, replacement)) if *repair_base == base => {
                        rebuilt.extend_from_slice(replacement);
                        pending.next();
                    },
                    _ => rebuilt.extend_from_slice(&self.indices[base..base + 3]),
                }
            }
            self.indices = rebuilt;
        }
        changed
    }

    /// If `split` lies on the given edge of the triangle at `base` (and is not
    /// one of its corners), return the six indices of the two replacement
    /// triangles, wound to match the original.
    fn split_edge(&self, split: usize, base: usize, edge: usize) -> Option<[usize; 6]> {
        let a = self.indices[base];
        let b = self.indices[base + 1];
        let c = self.indices[base + 2];

        if split == a || split == b || split == c {
            return None;
        }

        let (begin, end, opposite) = match edge {
            0 => (a, b, c),
            1 => (b, c, a),
            _ => (c, a, b),
        };

        if !self.point_on_edge(split, begin, end) {
            return None;
        }

        Some(match edge {
            0 => [begin, split, opposite, split, end, opposite],
            1 => [opposite, split, end, opposite, begin, split],
            _ => [opposite, begin, split, end, opposite, split],
        })
    }

    /// Distance-sum test: `point` is on the segment when going through it
    /// barely lengthens the straight path.
    fn point_on_edge(&self, point: usize, start: usize, end: usize) -> bool {
        let p = &self.vertices[point];
        let s = &self.vertices[start];
        let e = &self.vertices[end];

        let through_point = s.distance_to(p) + e.distance_to(p);
        let direct = s.distance_to(e);
        through_point >= direct - self.overlap_range
            && through_point <= direct + self.overlap_range
    }

    /// Partition the triangles into connected components by shared vertex
    /// index (run [`Model::weld`] first so geometric coincidence implies index
    /// coincidence).
    ///
    /// Returns `None` when everything is one component, so the caller exports
    /// a single mesh, and `Some(parts)` covering every triangle exactly once
    /// when the boolean physically separated the solid.
    pub fn split_connected_components(&self) -> Option<Vec<SubModel<'_, S>>> {
        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }

        if self.indices.is_empty() {
            return None;
        }

        let mut parent: Vec<usize> = (0..self.vertices.len()).collect();
        for tri in self.indices.chunks_exact(3) {
            let root = find(&mut parent, tri[0]);
            let b = find(&mut parent, tri[1]);
            parent[b] = root;
            let c = find(&mut parent, tri[2]);
            parent[c] = root;
        }

        // Group triangles by root, components ordered by first encounter.
        let mut slot_by_root: HashMap<usize, usize> = HashMap::new();
        let mut builders: Vec<(Vec<usize>, Vec<usize>)> = Vec::new();
        let mut vertex_claimed = vec![false; self.vertices.len()];

        for tri in self.indices.chunks_exact(3) {
            let root = find(&mut parent, tri[0]);
            let slot = *slot_by_root.entry(root).or_insert_with(|| {
                builders.push((Vec::new(), Vec::new()));
                builders.len() - 1
            });
            let (vertex_indices, indices) = &mut builders[slot];
            for &vi in tri {
                if !vertex_claimed[vi] {
                    vertex_claimed[vi] = true;
                    vertex_indices.push(vi);
                }
            }
            indices.extend_from_slice(tri);
        }

        if builders.len() <= 1 {
            return None;
        }

        Some(
            builders
                .into_iter()
                .map(|(vertex_indices, indices)| SubModel {
                    parent: self,
                    vertex_indices,
                    indices,
                })
                .collect(),
        )
    }

    /// Re-center positions on the vertex centroid; returns the centroid so the
    /// caller can keep it as the mesh's new world anchor.
    pub fn realign_to_centroid(&mut self) -> Point3<Real> {
        if self.vertices.is_empty() {
            return Point3::origin();
        }

        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.pos.coords);
        let centroid = Point3::from(sum / self.vertices.len() as Real);

        for v in &mut self.vertices {
            v.pos -= centroid.coords;
        }
        self.invalidate_bounding_box();
        centroid
    }

    /// Returns the axis-aligned bounding box spanning all vertices.
    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            if self.vertices.is_empty() {
                return Aabb::new(Point3::origin(), Point3::origin());
            }
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

    pub fn invalidate_bounding_box(&mut self) {
        self.bounding_box = OnceLock::new();
    }

    /// Casts a ray defined by `origin` + t * `direction` against all triangles
    /// and returns `(intersection_point, distance)` pairs sorted by ascending
    /// distance, with duplicate hits within tolerance removed.
    pub fn ray_intersections(
        &self,
        origin: &Point3<Real>,
        direction: &Vector3<Real>,
    ) -> Vec<(Point3<Real>, Real)> {
        let ray = Ray::new(*origin, *direction);
        let iso = Isometry3::identity();

        let mut hits = Vec::new();
        for tri in self.indices.chunks_exact(3) {
            let triangle = Triangle::new(
                self.vertices[tri[0]].pos,
                self.vertices[tri[1]].pos,
                self.vertices[tri[2]].pos,
            );
            if let Some(hit) = triangle.cast_ray_and_get_normal(&iso, &ray, Real::MAX, true)
            {
                let point_on_ray = ray.point_at(hit.time_of_impact);
                hits.push((Point3::from(point_on_ray.coords), hit.time_of_impact));
            }
        }

        hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        hits.dedup_by(|a, b| (a.1 - b.1).abs() < EPSILON);
        hits
    }

    /// Ray-parity point containment test.
    pub fn contains_point(&self, point: &Point3<Real>) -> bool {
        self.ray_intersections(point, &Vector3::new(1.0, 1.0, 1.0)).len() % 2 == 1
    }
}

impl<S: Clone + Send + Sync> Default for Model<S> {
    fn default() -> Self {
        Self::new()
    }
}
