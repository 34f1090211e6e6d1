mod support;

use cleave::errors::MeshError;
use cleave::model::Model;
use cleave::{PassPolicy, Vertex};
use nalgebra::{Matrix4, Point3, Translation3, Vector2, Vector3};

use crate::support::{approx_eq, cube_buffers, vert, white};

fn cube_model() -> Model<()> {
    Model::from_buffers(&cube_buffers([0.0, 0.0, 0.0], [0.5, 0.5, 0.5]), &Matrix4::identity())
        .unwrap()
}

#[test]
fn from_buffers_applies_the_transform() {
    let transform = Translation3::new(1.0, 2.0, 3.0).to_homogeneous();
    let model: Model<()> =
        Model::from_buffers(&cube_buffers([0.0, 0.0, 0.0], [0.5, 0.5, 0.5]), &transform)
            .unwrap();

    let aabb = model.bounding_box();
    assert!(approx_eq(aabb.mins.x, 0.5, 1e-9));
    assert!(approx_eq(aabb.maxs.y, 2.5, 1e-9));
    assert!(approx_eq(aabb.maxs.z, 3.5, 1e-9));
    // Translation leaves normals untouched.
    assert!(approx_eq(model.vertices[0].normal.norm(), 1.0, 1e-9));
}

#[test]
fn from_buffers_rejects_out_of_range_index() {
    let mut buffers = cube_buffers([0.0, 0.0, 0.0], [0.5, 0.5, 0.5]);
    buffers.indices[0] = 999;
    let result = Model::<()>::from_buffers(&buffers, &Matrix4::identity());
    assert_eq!(
        result.unwrap_err(),
        MeshError::IndexOutOfRange { index: 999, len: 24 }
    );
}

#[test]
fn from_buffers_rejects_partial_triangles() {
    let mut buffers = cube_buffers([0.0, 0.0, 0.0], [0.5, 0.5, 0.5]);
    buffers.indices.pop();
    let result = Model::<()>::from_buffers(&buffers, &Matrix4::identity());
    assert_eq!(
        result.unwrap_err(),
        MeshError::IndexCountNotTriangles { len: 35 }
    );
}

#[test]
fn from_buffers_rejects_attribute_mismatch() {
    let mut buffers = cube_buffers([0.0, 0.0, 0.0], [0.5, 0.5, 0.5]);
    buffers.normals.pop();
    let result = Model::<()>::from_buffers(&buffers, &Matrix4::identity());
    assert_eq!(
        result.unwrap_err(),
        MeshError::AttributeCountMismatch { positions: 24, normals: 23 }
    );
}

#[test]
fn missing_uvs_and_colors_get_defaults() {
    let mut buffers = cube_buffers([0.0, 0.0, 0.0], [0.5, 0.5, 0.5]);
    buffers.uvs.clear();
    buffers.colors.truncate(3); // length mismatch: ignored entirely
    let model: Model<()> = Model::from_buffers(&buffers, &Matrix4::identity()).unwrap();
    assert_eq!(model.vertices[0].uv, Vector2::zeros());
    assert_eq!(model.vertices[0].color, white());
}

#[test]
fn polygon_round_trip_preserves_triangles() {
    let model = cube_model();
    let polygons = model.to_polygons();
    assert_eq!(polygons.len(), 12);

    let rebuilt: Model<()> = Model::from_polygons(&polygons);
    // Fan re-import gives every corner its own slot until welding.
    assert_eq!(rebuilt.indices.len(), 36);
    assert_eq!(rebuilt.vertices.len(), 36);
}

#[test]
fn weld_merges_coincident_corners() {
    let mut model: Model<()> = Model::from_polygons(&cube_model().to_polygons());
    assert_eq!(model.vertices.len(), 36);

    model.weld(2);
    assert_eq!(model.vertices.len(), 8, "a cube welds to its 8 corners");
    assert_eq!(model.indices.len(), 36);

    // A welded corner accumulates the normals of its three faces.
    let corner = model
        .vertices
        .iter()
        .find(|v| v.pos == Point3::new(0.5, 0.5, 0.5))
        .expect("corner must survive welding");
    let expected = Vector3::new(1.0, 1.0, 1.0).normalize();
    assert!((corner.normal - expected).norm() < 1e-9);
}

#[test]
fn weld_is_idempotent() {
    let mut model: Model<()> = Model::from_polygons(&cube_model().to_polygons());
    model.weld(2);
    let vertices = model.vertices.clone();
    let indices = model.indices.clone();

    model.weld(2);
    assert_eq!(model.indices, indices);
    assert_eq!(model.vertices.len(), vertices.len());
    for (a, b) in model.vertices.iter().zip(vertices.iter()) {
        assert_eq!(a.pos, b.pos);
        assert!((a.normal - b.normal).norm() < 1e-12);
        assert_eq!(a.uv, b.uv);
        assert_eq!(a.color, b.color);
    }
}

#[test]
fn weld_drops_unreferenced_vertices() {
    let mut model = cube_model();
    model
        .vertices
        .push(vert([9.0, 9.0, 9.0], [0.0, 1.0, 0.0]));
    model.weld(2);
    assert_eq!(model.vertices.len(), 8);
}

#[test]
fn weld_keeps_first_occurrence_attributes() {
    let mut model: Model<()> = Model::new();
    let mut duplicate = vert([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
    duplicate.uv = Vector2::new(0.75, 0.0);
    let mut original = vert([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
    original.uv = Vector2::new(0.25, 0.0);

    model.vertices = vec![
        original,
        vert([1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        vert([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        duplicate,
        vert([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        vert([0.0, -1.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    model.indices = vec![0, 1, 2, 3, 4, 5];

    model.weld(2);
    assert_eq!(model.vertices.len(), 5);
    // Both triangles now share slot 0, which kept the first occurrence's uv.
    assert_eq!(model.indices[3], 0);
    assert_eq!(model.vertices[0].uv, Vector2::new(0.25, 0.0));
}

/// A triangle with a vertex sitting on its edge but not referenced by it.
fn t_junction_model() -> Model<()> {
    let vertices = vec![
        vert([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        vert([2.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        vert([0.0, 2.0, 0.0], [0.0, 0.0, 1.0]),
        // On edge (0, 1) of the triangle above, referenced only below it.
        vert([1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        vert([0.0, -1.0, 0.0], [0.0, 0.0, 1.0]),
        vert([2.0, -1.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    let indices = vec![0, 1, 2, 4, 5, 3];
    let mut model = Model::new();
    model.vertices = vertices;
    model.indices = indices;
    model
}

#[test]
fn watertight_repair_splits_the_junction() {
    let mut model = t_junction_model();
    model.make_watertight(1, PassPolicy::UntilFixedPoint);

    // The cracked triangle became two; the lower one is untouched.
    assert_eq!(model.indices.len(), 9);
    // Every emitted triangle now references the junction vertex or avoids
    // its edge entirely.
    let triangles: Vec<&[usize]> = model.indices.chunks_exact(3).collect();
    assert!(triangles.iter().any(|t| t.contains(&3) && t.contains(&0)));
    assert!(triangles.iter().any(|t| t.contains(&3) && t.contains(&1)));
}

#[test]
fn watertight_repair_reaches_a_fixed_point() {
    let mut model = t_junction_model();
    model.make_watertight(8, PassPolicy::UntilFixedPoint);
    let indices = model.indices.clone();

    // Re-running finds nothing left to repair.
    model.make_watertight(1, PassPolicy::UntilFixedPoint);
    assert_eq!(model.indices, indices);
}

#[test]
fn watertight_fixed_count_runs_at_least_once() {
    let mut model = t_junction_model();
    model.make_watertight(0, PassPolicy::FixedCount);
    assert_eq!(model.indices.len(), 9);
}

#[test]
fn split_returns_none_for_a_single_component() {
    let mut model: Model<()> = Model::from_polygons(&cube_model().to_polygons());
    model.weld(2);
    assert!(model.split_connected_components().is_none());
}

#[test]
fn split_partitions_every_triangle_exactly_once() {
    // Two triangle islands sharing no vertex index.
    let mut model: Model<()> = Model::new();
    model.vertices = vec![
        vert([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        vert([1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        vert([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        vert([5.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        vert([6.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        vert([5.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    model.indices = vec![0, 1, 2, 3, 4, 5];

    let parts = model.split_connected_components().expect("two islands");
    assert_eq!(parts.len(), 2);

    let total: usize = parts.iter().map(|p| p.indices.len()).sum();
    assert_eq!(total, model.indices.len());

    // Each part exports a compacted, self-contained record.
    for part in &parts {
        let buffers = part.to_buffers();
        assert_eq!(buffers.positions.len(), 3);
        assert_eq!(buffers.indices, vec![0, 1, 2]);
    }
}

#[test]
fn split_joins_islands_bridged_by_a_shared_vertex() {
    // Two triangles sharing one vertex index form a single component.
    let mut model: Model<()> = Model::new();
    model.vertices = vec![
        vert([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        vert([1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        vert([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        vert([2.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        vert([1.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    model.indices = vec![0, 1, 2, 1, 3, 4];
    assert!(model.split_connected_components().is_none());
}

#[test]
fn empty_model_repairs_are_no_ops() {
    let mut model: Model<()> = Model::new();
    model.weld(2);
    model.make_watertight(2, PassPolicy::UntilFixedPoint);
    assert!(model.split_connected_components().is_none());
    assert!(model.to_buffers().positions.is_empty());
}

#[test]
fn contains_point_by_ray_parity() {
    let model = cube_model();
    assert!(model.contains_point(&Point3::new(0.1, 0.2, 0.3)));
    assert!(!model.contains_point(&Point3::new(2.0, 0.0, 0.0)));
}

#[test]
fn realign_recenters_on_the_centroid() {
    let mut model: Model<()> = Model::from_buffers(
        &cube_buffers([1.0, 2.0, 3.0], [0.5, 0.5, 0.5]),
        &Matrix4::identity(),
    )
    .unwrap();

    let centroid = model.realign_to_centroid();
    assert!((centroid - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-9);

    let aabb = model.bounding_box();
    let center = (aabb.mins.coords + aabb.maxs.coords) * 0.5;
    assert!(center.norm() < 1e-9);
}

#[test]
fn to_buffers_round_trips_through_from_buffers() {
    let model = cube_model();
    let buffers = model.to_buffers();
    let again: Model<()> = Model::from_buffers(&buffers, &Matrix4::identity()).unwrap();
    assert_eq!(model.vertices.len(), again.vertices.len());
    assert_eq!(model.indices, again.indices);
    for (a, b) in model.vertices.iter().zip(again.vertices.iter()) {
        assert_eq!(a.pos, b.pos);
    }
}

#[test]
fn interpolated_vertices_blend_attributes() {
    let a = Vertex::new(
        Point3::origin(),
        Vector3::z(),
        Vector2::new(0.0, 0.0),
        white(),
    );
    let b = Vertex::new(
        Point3::new(1.0, 0.0, 0.0),
        Vector3::z(),
        Vector2::new(1.0, 0.0),
        white(),
    );
    let quarter = a.interpolate(&b, 0.25);
    assert!(approx_eq(quarter.pos.x, 0.25, 1e-12));
    assert!(approx_eq(quarter.uv.x, 0.25, 1e-12));
}
