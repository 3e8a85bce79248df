use thiserror::Error;

/// Errors produced by the projection engine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlanError {
    /// Input outside its domain. Rejected before any simulation runs.
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },
    /// A solver exhausted its bracket or iteration cap.
    #[error("no solution: {0}")]
    NoSolution(String),
    /// A formula would divide by zero (or by a non-finite factor).
    #[error("division degeneracy: {0}")]
    DivisionDegeneracy(String),
}

impl PlanError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        PlanError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}
