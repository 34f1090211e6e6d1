//! **Constructive Solid Geometry (CSG)** on triangle meshes, built around Boolean
//! operations (*union*, *subtract*, *intersect*) on sets of polygons stored in
//! [BSP](bsp) trees, followed by the repair passes that turn the raw boolean
//! result back into one or more meshes fit for rendering and physical
//! simulation: duplicate-vertex welding, T-junction (crack) repair, and
//! connected-component splitting.
//!
//! The crate begins and ends at plain mesh records ([`MeshBuffers`]): vertex
//! positions, normals, uvs, vertex colors and a triangle index list. Scene
//! graphs, renderers and soft-body solvers consume those records; none of them
//! are modeled here.
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon to parallelize the crack-repair scan

#![forbid(unsafe_code)]
#![warn(clippy::approx_constant, clippy::all)]

pub mod errors;
pub mod float_types;
pub mod config;
pub mod vertex;
pub mod plane;
pub mod polygon;
pub mod bsp;
pub mod csg;
pub mod model;
pub mod submodel;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use config::{MeshingConfig, PassPolicy};
pub use csg::{BooleanOp, boolean_op};
pub use model::{MeshBuffers, Model};
pub use submodel::SubModel;
pub use vertex::Vertex;
