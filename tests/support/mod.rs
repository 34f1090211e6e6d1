//! Test support library
//! Provides various helper functions & utilities for tests.

use cleave::float_types::Real;
use cleave::model::{MeshBuffers, Model};
use cleave::polygon::Polygon;
use cleave::vertex::Vertex;
use nalgebra::{Point3, Vector2, Vector3, Vector4};

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Opaque white, the default vertex color.
pub fn white() -> Vector4<Real> {
    Vector4::new(1.0, 1.0, 1.0, 1.0)
}

/// Helper to make a vertex with default uv/color.
pub fn vert(pos: [Real; 3], normal: [Real; 3]) -> Vertex {
    Vertex::new(
        Point3::new(pos[0], pos[1], pos[2]),
        Vector3::new(normal[0], normal[1], normal[2]),
        Vector2::zeros(),
        white(),
    )
}

/// Helper to make a simple triangle Polygon in 3D with given vertices.
/// The stored normal is arbitrary; `Polygon::new` re-computes the plane anyway.
pub fn make_triangle(points: [[Real; 3]; 3]) -> Polygon<()> {
    let vertices = points.iter().map(|p| vert(*p, [0.0, 0.0, 1.0])).collect();
    Polygon::new(vertices, None)
}

/// Area of a planar convex polygon via its triangle fan.
pub fn polygon_area(polygon: &Polygon<()>) -> Real {
    let mut doubled = Vector3::zeros();
    for i in 2..polygon.vertices.len() {
        let a = polygon.vertices[0].pos;
        let b = polygon.vertices[i - 1].pos;
        let c = polygon.vertices[i].pos;
        doubled += (b - a).cross(&(c - a));
    }
    doubled.norm() * 0.5
}

/// An axis-aligned box as an external mesh record: 6 quads, 4 vertices each,
/// split into 12 triangles with outward normals and CCW winding.
pub fn cube_buffers(center: [Real; 3], half: [Real; 3]) -> MeshBuffers {
    let faces: [([usize; 4], [Real; 3]); 6] = [
        ([0, 4, 6, 2], [-1.0, 0.0, 0.0]),
        ([1, 3, 7, 5], [1.0, 0.0, 0.0]),
        ([0, 1, 5, 4], [0.0, -1.0, 0.0]),
        ([2, 6, 7, 3], [0.0, 1.0, 0.0]),
        ([0, 2, 3, 1], [0.0, 0.0, -1.0]),
        ([4, 5, 7, 6], [0.0, 0.0, 1.0]),
    ];

    let mut buffers = MeshBuffers::default();
    for (corners, normal) in faces {
        let base = buffers.positions.len();
        for corner in corners {
            buffers.positions.push(Point3::new(
                center[0] + half[0] * (if corner & 1 != 0 { 1.0 } else { -1.0 }),
                center[1] + half[1] * (if corner & 2 != 0 { 1.0 } else { -1.0 }),
                center[2] + half[2] * (if corner & 4 != 0 { 1.0 } else { -1.0 }),
            ));
            buffers
                .normals
                .push(Vector3::new(normal[0], normal[1], normal[2]));
            buffers.uvs.push(Vector2::zeros());
            buffers.colors.push(white());
        }
        buffers.indices.extend_from_slice(&[
            base,
            base + 1,
            base + 2,
            base,
            base + 2,
            base + 3,
        ]);
    }
    buffers
}

/// Discrete point-sampling volume estimator: the fraction of bounding-box
/// cell centers inside the model, times the bounding-box volume.
pub fn estimate_volume(model: &Model<()>, samples_per_axis: usize) -> Real {
    let aabb = model.bounding_box();
    let extents = aabb.maxs - aabb.mins;
    let n = samples_per_axis;

    let mut inside = 0usize;
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let point = Point3::new(
                    aabb.mins.x + extents.x * ((i as Real + 0.5) / n as Real),
                    aabb.mins.y + extents.y * ((j as Real + 0.5) / n as Real),
                    aabb.mins.z + extents.z * ((k as Real + 0.5) / n as Real),
                );
                if model.contains_point(&point) {
                    inside += 1;
                }
            }
        }
    }

    extents.x * extents.y * extents.z * inside as Real / (n * n * n) as Real
}

/// Import a result record back into a model for volume sampling.
pub fn model_of(buffers: &MeshBuffers) -> Model<()> {
    Model::from_buffers(buffers, &nalgebra::Matrix4::identity())
        .expect("result record should always be well-formed")
}
