use common_errors::{ChainError, MathError};
use common_structs::{Stage, Step};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// A transaction or call failed; the workflow stays at `stage`.
    #[error("{step} failed at stage {stage}: {source}")]
    Step {
        step: Step,
        stage: Stage,
        #[source]
        source: ChainError,
    },

    #[error("position query failed at stage {stage}: {source}")]
    Query {
        stage: Stage,
        #[source]
        source: ChainError,
    },

    #[error("could not resolve the lending pool: {0}")]
    Resolve(#[source] ChainError),

    #[error("{step} requires stage {expected}, workflow is at {actual}")]
    OutOfOrder {
        step: Step,
        expected: Stage,
        actual: Stage,
    },

    /// A conversion failed inside a step; the workflow stays at `stage`.
    #[error("{source} (stage {stage})")]
    Math {
        stage: Stage,
        #[source]
        source: MathError,
    },
}

impl WorkflowError {
    /// Stage the workflow was left at. `None` only when the pool could not be
    /// resolved and no workflow exists yet.
    pub fn halted_at(&self) -> Option<Stage> {
        match self {
            WorkflowError::Step { stage, .. }
            | WorkflowError::Query { stage, .. }
            | WorkflowError::Math { stage, .. } => Some(*stage),
            WorkflowError::OutOfOrder { actual, .. } => Some(*actual),
            WorkflowError::Resolve(_) => None,
        }
    }
}
