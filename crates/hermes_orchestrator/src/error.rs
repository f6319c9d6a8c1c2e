use hermes_router::RouterError;
use thiserror::Error;

use crate::{jobs::JobQueueError, solver::SolverError, verifier::ConsistencyError};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("{message}")]
    UnsupportedProblem {
        message: String,
        reasons: Vec<Vec<String>>,
    },

    #[error("Discordant problem: {0}")]
    DiscordantProblem(String),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    #[error(transparent)]
    JobQueue(#[from] JobQueueError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OrchestratorError {
    pub fn unsupported(message: impl Into<String>) -> Self {
        OrchestratorError::UnsupportedProblem {
            message: message.into(),
            reasons: Vec::new(),
        }
    }
}
