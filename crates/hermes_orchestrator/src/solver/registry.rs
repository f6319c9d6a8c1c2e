use std::sync::Arc;

use fxhash::FxHashMap;
use tracing::debug;

use crate::problem::problem::Problem;

use super::backend::{Solver, SolverError, SolverKind};

/// Solvers available to an orchestrator, keyed by kind
#[derive(Default, Clone)]
pub struct SolverRegistry {
    solvers: FxHashMap<SolverKind, Arc<dyn Solver>>,
}

impl SolverRegistry {
    pub fn with_solver(mut self, solver: Arc<dyn Solver>) -> Self {
        self.register(solver);
        self
    }

    pub fn register(&mut self, solver: Arc<dyn Solver>) {
        self.solvers.insert(solver.kind(), solver);
    }

    pub fn get(&self, kind: SolverKind) -> Result<&Arc<dyn Solver>, SolverError> {
        self.solvers.get(&kind).ok_or(SolverError::NotRegistered(kind))
    }

    /// First applicable solver in priority order, or the reasons of every refusal
    pub fn select(
        &self,
        problem: &Problem,
        priority: &[SolverKind],
    ) -> Result<SolverKind, Vec<String>> {
        let mut reasons = Vec::new();

        for &kind in priority {
            let Some(solver) = self.solvers.get(&kind) else {
                reasons.push(format!("{kind}: solver is not registered"));
                continue;
            };

            let inapplicable = solver.inapplicable_reasons(problem);
            if inapplicable.is_empty() {
                debug!(solver = %kind, "Selected solver");
                return Ok(kind);
            }

            reasons.extend(
                inapplicable
                    .into_iter()
                    .map(|reason| format!("{kind}: {reason}")),
            );
        }

        Err(reasons)
    }
}
