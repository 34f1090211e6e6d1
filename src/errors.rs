//! Validation errors

/// Precondition failures detected when importing an external mesh record.
///
/// These surface immediately at the [`Model`](crate::model::Model) boundary;
/// nothing further down the pipeline re-checks the index buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    /// (IndexOutOfRange) A triangle index does not address any vertex
    #[error("(IndexOutOfRange) triangle index {index} is out of range (vertex count {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// (IndexCountNotTriangles) The index list does not describe whole triangles
    #[error("(IndexCountNotTriangles) index list length {len} is not a multiple of 3")]
    IndexCountNotTriangles { len: usize },
    /// (AttributeCountMismatch) Position and normal buffers disagree in length
    #[error(
        "(AttributeCountMismatch) attribute buffers disagree: {positions} positions, {normals} normals"
    )]
    AttributeCountMismatch { positions: usize, normals: usize },
}
