//! Boolean combinators over BSP trees and the mesh-record driver.
//!
//! Union, subtraction and intersection are all schedules of the same four BSP
//! primitives (`clip_to`, `invert`, `build`, `all_polygons`); the closed
//! [`BooleanOp`] enum selects which invert/clip steps run. Every combinator
//! works on deep clones of its operands, so callers keep their trees intact.

use crate::bsp::Node;
use crate::config::MeshingConfig;
use crate::errors::MeshError;
use crate::float_types::{
    Real,
    parry3d::bounding_volume::{Aabb, BoundingVolume},
};
use crate::model::{MeshBuffers, Model};
use crate::polygon::Polygon;
use nalgebra::Matrix4;

/// The supported boolean combinations of two solids.
///
/// ```text
///    union            subtract         intersect
///  +-------+         +-------+
///  |       |         |       |
///  |   c   |         |   c   |
///  |       +----+    |    +--+            +--+
///  +----+       |    +----+               +--+
///       |   c   |
///       |       |
///       +-------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// Space in either solid.
    Union,
    /// Space in the first solid but not the second.
    Subtract,
    /// Space in both solids.
    Intersect,
}

/// Combine two BSP trees without mutating either operand.
///
/// Subtraction and intersection are the union schedule wrapped in invert
/// steps (De Morgan over half-spaces):
///
/// ```text
/// union:     A.clip_to(B); B.clip_to(A); B.invert(); B.clip_to(A); B.invert();
///            A.build(B.all_polygons())
/// subtract:  A.invert(); <union steps>; A.invert()
/// intersect: A.invert(); B.clip_to(A); B.invert(); A.clip_to(B); B.clip_to(A);
///            A.build(B.all_polygons()); A.invert()
/// ```
pub fn combine<S: Clone + Send + Sync>(
    a: &Node<S>,
    b: &Node<S>,
    op: BooleanOp,
) -> Node<S> {
    let mut a = a.clone();
    let mut b = b.clone();

    match op {
        BooleanOp::Union => {
            a.clip_to(&b);
            b.clip_to(&a);
            b.invert();
            b.clip_to(&a);
            b.invert();
            a.build(&b.all_polygons());
        },
        BooleanOp::Subtract => {
            a.invert();
            a.clip_to(&b);
            b.clip_to(&a);
            b.invert();
            b.clip_to(&a);
            b.invert();
            a.build(&b.all_polygons());
            a.invert();
        },
        BooleanOp::Intersect => {
            a.invert();
            b.clip_to(&a);
            b.invert();
            a.clip_to(&b);
            b.clip_to(&a);
            a.build(&b.all_polygons());
            a.invert();
        },
    }

    a
}

/// One-sided cleave: clip `a` against `cutter` and stop.
///
/// Skips the full combine schedule, trading water-tightness for speed when
/// only a planar cut against a simple cutting volume is needed. With
/// `invert_cutter` the kept side is the inside of the cutter instead of the
/// outside.
pub fn cleave<S: Clone + Send + Sync>(
    a: &Node<S>,
    cutter: &Node<S>,
    invert_cutter: bool,
) -> Node<S> {
    let mut a = a.clone();
    if invert_cutter {
        let mut cutter = cutter.clone();
        cutter.invert();
        a.clip_to(&cutter);
    } else {
        a.clip_to(cutter);
    }
    a
}

/// Split polygons into (may_touch, cannot_touch) using bounding-box tests.
fn partition_polys<S: Clone + Send + Sync>(
    polys: &[Polygon<S>],
    other_bb: &Aabb,
) -> (Vec<Polygon<S>>, Vec<Polygon<S>>) {
    let mut maybe = Vec::new();
    let mut never = Vec::new();
    for p in polys {
        if p.bounding_box().intersects(other_bb) {
            maybe.push(p.clone());
        } else {
            never.push(p.clone());
        }
    }
    (maybe, never)
}

/// Perform a boolean operation between two external mesh records.
///
/// Both operands are imported through their world transforms into one shared
/// coordinate frame, combined, and the result is rebuilt into a [`Model`] and
/// run through the repair passes `config` enables. Returns one mesh record,
/// or several iff component splitting is enabled *and* the geometry actually
/// separated. A result with zero vertices (disjoint intersect, A consumed by
/// B) is a valid empty output, not an error.
pub fn boolean_op(
    op: BooleanOp,
    a: &MeshBuffers,
    a_transform: &Matrix4<Real>,
    b: &MeshBuffers,
    b_transform: &Matrix4<Real>,
    config: &MeshingConfig,
) -> Result<Vec<MeshBuffers>, MeshError> {
    let model_a: Model<()> = Model::from_buffers(a, a_transform)?;
    let model_b: Model<()> = Model::from_buffers(b, b_transform)?;

    // Avoid splitting obvious non-intersecting faces: only polygons whose
    // boxes touch the other operand enter the BSP trees. What the op does
    // with the untouched remainder depends on the op itself.
    let (a_clip, a_passthru) =
        partition_polys(&model_a.to_polygons(), &model_b.bounding_box());
    let (b_clip, b_passthru) =
        partition_polys(&model_b.to_polygons(), &model_a.bounding_box());

    let node_a = Node::from_polygons(&a_clip);
    let node_b = Node::from_polygons(&b_clip);

    let mut final_polys = combine(&node_a, &node_b, op).all_polygons();
    match op {
        BooleanOp::Union => {
            final_polys.extend(a_passthru);
            final_polys.extend(b_passthru);
        },
        // Surface of A away from B survives subtraction untouched; B's does not.
        BooleanOp::Subtract => final_polys.extend(a_passthru),
        // Nothing outside the other operand can be part of an intersection.
        BooleanOp::Intersect => {},
    }

    let mut model = Model::from_polygons(&final_polys);

    if config.use_meshing {
        if config.remove_overlaps {
            model.weld(config.overlap_rounding_decimals);
        }
        if config.make_watertight {
            model.make_watertight(config.watertight_passes, config.pass_policy);
        }
        if config.split_components {
            if let Some(parts) = model.split_connected_components() {
                return Ok(parts.iter().map(|part| part.to_buffers()).collect());
            }
        }
    }

    Ok(vec![model.to_buffers()])
}
