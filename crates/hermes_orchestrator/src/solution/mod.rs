pub mod route;
pub mod stop;

use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::{
    problem::{mission::Mission, problem::Problem},
    solver::SolverKind,
};

use self::{route::Route, stop::Stop};

pub const NO_VEHICLE_REASON: &str = "No vehicle available for this service";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Solution {
    pub name: Option<String>,
    pub solvers: Vec<SolverKind>,
    pub elapsed: Option<SignedDuration>,
    pub routes: Vec<Route>,
    pub unassigned: Vec<Stop>,
}

impl Solution {
    /// One empty route per vehicle, every mission unassigned with `reason`
    pub fn empty(solver: SolverKind, problem: &Problem, reason: Option<&str>) -> Self {
        Solution {
            name: problem.name().map(String::from),
            solvers: vec![solver],
            elapsed: None,
            routes: problem.vehicles().iter().map(Route::empty).collect(),
            unassigned: problem
                .missions()
                .iter()
                .map(|mission: &Mission| Stop::unassigned(mission, reason))
                .collect(),
        }
    }

    /// Solutions of independent sub-problems are joined by concatenation
    pub fn merge(mut self, other: Solution) -> Solution {
        for solver in other.solvers {
            if !self.solvers.contains(&solver) {
                self.solvers.push(solver);
            }
        }
        self.elapsed = match (self.elapsed, other.elapsed) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.name = self.name.or(other.name);
        self.routes.extend(other.routes);
        self.unassigned.extend(other.unassigned);
        self
    }

    pub fn count_assigned_missions(&self) -> usize {
        self.routes.iter().map(Route::count_missions).sum()
    }

    pub fn count_unassigned_missions(&self) -> usize {
        self.unassigned
            .iter()
            .filter(|stop| stop.mission_id().is_some())
            .count()
    }

    pub fn count_used_routes(&self) -> usize {
        self.routes.iter().filter(|route| route.count_missions() > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_line_problem;

    #[test]
    fn test_empty_solution() {
        let problem = create_line_problem(3, 2);
        let solution = Solution::empty(SolverKind::Demo, &problem, Some(NO_VEHICLE_REASON));

        assert_eq!(solution.routes.len(), 2);
        assert_eq!(solution.count_assigned_missions(), 0);
        assert_eq!(solution.count_unassigned_missions(), 3);
        assert_eq!(solution.count_used_routes(), 0);
        assert_eq!(solution.unassigned[0].reason.as_deref(), Some(NO_VEHICLE_REASON));
    }

    #[test]
    fn test_merge_concatenates() {
        let problem = create_line_problem(2, 1);
        let first = Solution::empty(SolverKind::Demo, &problem, None);
        let second = Solution::empty(SolverKind::Vroom, &problem, None);

        let merged = first.merge(second);
        assert_eq!(merged.routes.len(), 2);
        assert_eq!(merged.count_unassigned_missions(), 4);
        assert_eq!(merged.solvers, vec![SolverKind::Demo, SolverKind::Vroom]);
    }
}
