use hermes_router::{RouteLeg, Router, RouterDimension, RouterError, RouterOptions, Segment};
use jiff::SignedDuration;

use crate::{
    problem::{
        activity::Activity,
        location::{Location, Point},
        matrix::TravelMatrix,
        mission::{Mission, MissionBuilder, Quantity},
        problem::{Problem, ProblemBuilder},
        skill::SkillSet,
        vehicle::{Vehicle, VehicleBuilder},
    },
    solution::Solution,
    solver::{Solver, SolverError, SolverKind, demo::DemoSolver},
};

pub const MISSION_DURATION_SECS: i64 = 300;

/// Points are spread along a parallel, `p{index}` sits at matrix index `index`
pub fn create_point(index: usize) -> Point {
    Point::new(
        format!("p{index}"),
        Some(index),
        Some(Location::from_lat_lon(44.8, -0.58 + 0.01 * index as f64)),
    )
}

/// One minute and one kilometre between neighbouring points
pub fn create_line_matrix(size: usize) -> TravelMatrix {
    let rows = |unit: f64| -> Vec<Vec<f64>> {
        (0..size)
            .map(|i| {
                (0..size)
                    .map(|j| (i as f64 - j as f64).abs() * unit)
                    .collect()
            })
            .collect()
    };

    TravelMatrix::new("m1", Some(rows(60.0)), Some(rows(1000.0)), None)
}

pub fn create_mission(index: usize, skills: &[&str]) -> Mission {
    let mut builder = MissionBuilder::new(format!("m{index}"));
    builder
        .set_activity(Activity::new(
            Some(create_point(index)),
            SignedDuration::from_secs(MISSION_DURATION_SECS),
        ))
        .add_quantity(Quantity::new("kg", 1.0))
        .set_skills(SkillSet::new(skills.iter().copied()));
    builder.build()
}

pub fn create_vehicle(id: &str, skills: &[&str]) -> Vehicle {
    let mut builder = VehicleBuilder::new(id);
    builder
        .set_start_point(create_point(0))
        .set_end_point(create_point(0))
        .add_skills(SkillSet::new(skills.iter().copied()));
    builder.build()
}

/// Missions `m1..=mn` on a line starting at the shared depot `p0`
pub fn create_line_problem(missions: usize, vehicles: usize) -> Problem {
    let mut builder = ProblemBuilder::default();
    builder
        .set_name("line")
        .set_missions((1..=missions).map(|i| create_mission(i, &[])).collect())
        .set_vehicles(
            (0..vehicles)
                .map(|i| create_vehicle(&format!("v{i}"), &[]))
                .collect(),
        )
        .add_matrix(create_line_matrix(missions + 1));
    builder.build()
}

/// Delegates to the demo construction under another kind
pub struct StubSolver {
    kind: SolverKind,
    reasons: Vec<String>,
    synchronous: bool,
}

impl StubSolver {
    pub fn refusing(kind: SolverKind, reason: &str) -> Self {
        StubSolver {
            kind,
            reasons: vec![String::from(reason)],
            synchronous: true,
        }
    }
}

impl Solver for StubSolver {
    fn kind(&self) -> SolverKind {
        self.kind
    }

    fn inapplicable_reasons(&self, _problem: &Problem) -> Vec<String> {
        self.reasons.clone()
    }

    fn solve_synchronously(&self, _problem: &Problem) -> bool {
        self.synchronous
    }

    fn solve(&self, problem: &Problem) -> Result<Solution, SolverError> {
        let mut solution = DemoSolver::default().solve(problem)?;
        solution.solvers = vec![self.kind];
        Ok(solution)
    }
}

/// Router answering every request with `RouterError::NoRoute`
pub struct FailingRouter;

impl Router for FailingRouter {
    fn compute_batch(
        &self,
        _url: &str,
        _mode: &str,
        _dimension: RouterDimension,
        _segments: &[Segment],
        _encoded_polyline: bool,
        _options: &RouterOptions,
    ) -> Result<Vec<RouteLeg>, RouterError> {
        Err(RouterError::NoRoute)
    }
}
