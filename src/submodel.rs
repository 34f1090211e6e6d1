//! `SubModel`: a connected component of a `Model`, used as an export view
//! when a boolean result separates into disjoint solids.

use crate::model::{MeshBuffers, Model};
use hashbrown::HashMap;

/// One connected subgraph of a parent [`Model`]'s triangles.
///
/// Holds only indices into the parent; the parent stays borrowed read-only
/// for the sub-model's lifetime and is never modified through it.
#[derive(Debug)]
pub struct SubModel<'a, S: Clone> {
    pub parent: &'a Model<S>,
    /// Parent vertex indices belonging to this component, in first-seen order.
    pub vertex_indices: Vec<usize>,
    /// Parent-space triangle list; every index appears in `vertex_indices`.
    pub indices: Vec<usize>,
}

impl<S: Clone + Send + Sync> SubModel<'_, S> {
    /// Export this component as an independent mesh record: the parent's
    /// attribute arrays projected down to this component's vertices, with
    /// triangle indices remapped into the compacted local arrays.
    pub fn to_buffers(&self) -> MeshBuffers {
        let mut buffers = MeshBuffers::default();

        let mut local_slot: HashMap<usize, usize> =
            HashMap::with_capacity(self.vertex_indices.len());
        for (slot, &parent_index) in self.vertex_indices.iter().enumerate() {
            local_slot.insert(parent_index, slot);
            let vertex = &self.parent.vertices[parent_index];
            buffers.positions.push(vertex.pos);
            buffers.normals.push(vertex.normal);
            buffers.uvs.push(vertex.uv);
            buffers.colors.push(vertex.color);
        }

        buffers.indices = self
            .indices
            .iter()
            .map(|parent_index| local_slot[parent_index])
            .collect();

        buffers
    }
}
