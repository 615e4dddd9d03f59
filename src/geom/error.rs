use super::mesh::NodeId;

/// Result type for the geometry kernels.
pub type GeomResult<T> = Result<T, GeomError>;

/// Failures reported by the geometry kernels.
///
/// Every failure is a deterministic function of the inputs; none of them are
/// transient.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeomError {
    #[error("invalid knot vector: {0}")]
    InvalidKnotVector(String),
    #[error("invalid degree: {0}")]
    InvalidDegree(String),
    #[error("invalid coefficient count: expected {expected}, got {actual}")]
    InvalidCoefficientCount { expected: usize, actual: usize },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("node {0} has no neighbors")]
    DegenerateNeighborhood(NodeId),
    #[error("node {0} is referenced but has no coordinates")]
    UnknownNode(NodeId),
}

impl GeomError {
    pub(crate) fn parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }
}
