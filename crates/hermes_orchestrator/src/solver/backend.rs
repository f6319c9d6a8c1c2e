use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{problem::problem::Problem, solution::Solution};

/// The closed set of solver backends a profile may allow
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    Demo,
    Ortools,
    Vroom,
    Pyvrp,
}

impl Display for SolverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SolverKind::Demo => "demo",
                SolverKind::Ortools => "ortools",
                SolverKind::Vroom => "vroom",
                SolverKind::Pyvrp => "pyvrp",
            }
        )
    }
}

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Solver {kind} failed: {message}")]
    Failed { kind: SolverKind, message: String },

    #[error("Solver {0} provided no solution")]
    NoSolution(SolverKind),

    #[error("Solver {0} is not registered")]
    NotRegistered(SolverKind),

    #[error("Job was killed")]
    Killed,
}

pub trait Solver: Send + Sync {
    fn kind(&self) -> SolverKind;

    /// Empty when the solver can handle the problem
    fn inapplicable_reasons(&self, problem: &Problem) -> Vec<String>;

    /// Whether the problem is cheap enough to be solved without a job
    fn solve_synchronously(&self, problem: &Problem) -> bool;

    fn solve(&self, problem: &Problem) -> Result<Solution, SolverError>;
}
