use fxhash::FxHashMap;
use jiff::SignedDuration;
use tracing::debug;

use crate::{
    problem::{
        matrix::{Dimension, TravelMatrix},
        mission::Mission,
        problem::Problem,
        relation::RelationType,
        vehicle::{Vehicle, VehicleIdx},
    },
    solution::{
        Solution,
        route::Route,
        stop::{Stop, StopInfo},
    },
    utils::time::seconds,
};

use super::backend::{Solver, SolverError, SolverKind};

pub const UNREACHABLE_REASON: &str = "No vehicle is able to perform this mission";

/// Greedy nearest neighbour construction, used for demos and small sequencing problems
pub struct DemoSolver {
    synchronous_limit: usize,
}

impl Default for DemoSolver {
    fn default() -> Self {
        Self {
            synchronous_limit: 200,
        }
    }
}

struct Candidate {
    mission_index: usize,
    travel: f64,
    info: StopInfo,
}

impl DemoSolver {
    pub fn new(synchronous_limit: usize) -> Self {
        Self { synchronous_limit }
    }

    /// Vehicles in solving order with the lapse to respect after their predecessor
    fn vehicle_order(problem: &Problem) -> Vec<(VehicleIdx, Option<(VehicleIdx, i64)>)> {
        let mut predecessors: FxHashMap<usize, (usize, i64)> = FxHashMap::default();
        for relation in problem.relations() {
            if relation.relation_type() != RelationType::VehicleTrips {
                continue;
            }
            let indices: Vec<usize> = relation
                .linked_vehicle_ids()
                .iter()
                .filter_map(|id| problem.vehicles().iter().position(|vehicle| vehicle.id() == id))
                .collect();
            for pair in indices.windows(2) {
                predecessors.insert(pair[1], (pair[0], relation.lapse().unwrap_or(0)));
            }
        }

        let mut order = Vec::with_capacity(problem.vehicles().len());
        let mut placed = vec![false; problem.vehicles().len()];
        for index in 0..problem.vehicles().len() {
            let mut chain = vec![index];
            let mut current = index;
            while let Some(&(previous, _)) = predecessors.get(&current) {
                if chain.contains(&previous) {
                    break;
                }
                chain.push(previous);
                current = previous;
            }
            for &vehicle_index in chain.iter().rev() {
                if !placed[vehicle_index] {
                    placed[vehicle_index] = true;
                    let predecessor = predecessors
                        .get(&vehicle_index)
                        .map(|&(previous, lapse)| (VehicleIdx::new(previous), lapse));
                    order.push((VehicleIdx::new(vehicle_index), predecessor));
                }
            }
        }

        order
    }

    fn travel(matrix: Option<&TravelMatrix>, dimension: Dimension, from: Option<usize>, to: Option<usize>) -> Option<f64> {
        match (matrix, from, to) {
            (Some(matrix), Some(from), Some(to)) => matrix.get(dimension, from, to),
            _ => None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn evaluate(
        vehicle: &Vehicle,
        matrix: Option<&TravelMatrix>,
        mission: &Mission,
        current_index: Option<usize>,
        current_point: Option<&str>,
        departure: SignedDuration,
        route_start: SignedDuration,
        loads: &FxHashMap<String, f64>,
    ) -> Option<(f64, StopInfo)> {
        let activity = mission.main_activity()?;
        if !vehicle.can_serve(mission.skills()) {
            return None;
        }

        for capacity in vehicle.capacities() {
            let Some(limit) = capacity.limit() else {
                continue;
            };
            let used = loads.get(capacity.unit_id()).copied().unwrap_or(0.0);
            let requested: f64 = mission
                .quantities()
                .iter()
                .filter(|quantity| quantity.unit_id() == capacity.unit_id())
                .map(|quantity| quantity.value())
                .sum();
            if used + requested > limit {
                return None;
            }
        }

        let index = activity.matrix_index();
        let travel_time = Self::travel(matrix, Dimension::Time, current_index, index).unwrap_or(0.0);
        let arrival = departure + seconds(travel_time);
        let setup = if current_point != activity.point_id() {
            vehicle.setup_duration_on(activity)
        } else {
            SignedDuration::ZERO
        };

        let begin = if activity.time_windows().is_empty() {
            arrival + setup
        } else {
            let time_window = activity
                .time_windows()
                .iter()
                .find(|time_window| time_window.is_open_after(arrival))?;
            let begin = (arrival + setup).max(time_window.start());
            if time_window.end().is_some_and(|end| begin > end) {
                return None;
            }
            begin
        };
        let end = begin + vehicle.duration_on(activity);

        let back = Self::travel(
            matrix,
            Dimension::Time,
            index,
            vehicle.end_point().and_then(|point| point.matrix_index()),
        )
        .unwrap_or(0.0);
        let back_home = end + seconds(back);
        if vehicle
            .duration()
            .is_some_and(|duration| back_home - route_start > duration)
        {
            return None;
        }
        if vehicle
            .time_window()
            .and_then(|time_window| time_window.end())
            .is_some_and(|latest| back_home > latest)
        {
            return None;
        }

        Some((
            travel_time,
            StopInfo {
                travel_time: Some(seconds(travel_time)),
                travel_distance: Self::travel(matrix, Dimension::Distance, current_index, index),
                travel_value: Self::travel(matrix, Dimension::Value, current_index, index),
                setup_time: Some(setup),
                waiting_time: Some((begin - arrival - setup).max(SignedDuration::ZERO)),
                begin_time: begin,
                end_time: Some(end),
                departure_time: end,
                ..Default::default()
            },
        ))
    }

    fn build_route(
        problem: &Problem,
        vehicle: &Vehicle,
        start: SignedDuration,
        served: &mut [bool],
    ) -> Route {
        let matrix = problem.matrix_for(vehicle);
        let mut stops = Vec::new();
        let mut loads: FxHashMap<String, f64> = FxHashMap::default();
        let mut current_index = vehicle.start_point().and_then(|point| point.matrix_index());
        let mut current_point = vehicle.start_point().map(|point| point.id().to_owned());
        let mut departure = start;

        if let Some(point) = vehicle.start_point() {
            stops.push(Stop::depot(point).with_info(StopInfo {
                begin_time: start,
                end_time: Some(start),
                departure_time: start,
                waiting_time: Some(SignedDuration::ZERO),
                ..Default::default()
            }));
        }

        loop {
            let mut best: Option<Candidate> = None;
            for (mission_index, mission) in problem.missions().iter().enumerate() {
                if served[mission_index] {
                    continue;
                }
                let Some((travel, info)) = Self::evaluate(
                    vehicle,
                    matrix,
                    mission,
                    current_index,
                    current_point.as_deref(),
                    departure,
                    start,
                    &loads,
                ) else {
                    continue;
                };
                if best.as_ref().is_none_or(|best| travel < best.travel) {
                    best = Some(Candidate {
                        mission_index,
                        travel,
                        info,
                    });
                }
            }

            let Some(candidate) = best else {
                break;
            };

            let mission = &problem.missions()[candidate.mission_index];
            served[candidate.mission_index] = true;
            for quantity in mission.quantities() {
                *loads.entry(quantity.unit_id().to_owned()).or_default() += quantity.value();
            }
            current_index = mission.main_activity().and_then(|activity| activity.matrix_index());
            current_point = mission
                .main_activity()
                .and_then(|activity| activity.point_id())
                .map(String::from);
            departure = candidate.info.departure_time;
            stops.push(Stop::mission(mission).with_info(candidate.info));
        }

        if let Some(point) = vehicle.end_point() {
            let index = point.matrix_index();
            let travel_time = Self::travel(matrix, Dimension::Time, current_index, index).unwrap_or(0.0);
            let arrival = departure + seconds(travel_time);
            stops.push(Stop::depot(point).with_info(StopInfo {
                travel_time: Some(seconds(travel_time)),
                travel_distance: Self::travel(matrix, Dimension::Distance, current_index, index),
                travel_value: Self::travel(matrix, Dimension::Value, current_index, index),
                setup_time: Some(SignedDuration::ZERO),
                waiting_time: Some(SignedDuration::ZERO),
                begin_time: arrival,
                end_time: Some(arrival),
                departure_time: arrival,
                ..Default::default()
            }));
        }

        Route::new(vehicle.id(), stops)
    }
}

impl Solver for DemoSolver {
    fn kind(&self) -> SolverKind {
        SolverKind::Demo
    }

    fn inapplicable_reasons(&self, problem: &Problem) -> Vec<String> {
        let mut reasons = Vec::new();

        if problem.has_rests() {
            reasons.push(String::from("Rests are not supported"));
        }
        if problem
            .missions()
            .iter()
            .any(|mission| mission.activity().is_none() && mission.activities().len() > 1)
        {
            reasons.push(String::from("Alternative activities are not supported"));
        }
        if !problem.missions().is_empty()
            && !problem
                .matrices()
                .iter()
                .any(|matrix| matrix.has(Dimension::Time))
        {
            reasons.push(String::from("A time matrix is required"));
        }
        for relation in problem.relations() {
            if relation.relation_type() != RelationType::VehicleTrips {
                reasons.push(format!("Relation {} is not supported", relation.relation_type()));
            }
        }

        reasons
    }

    fn solve_synchronously(&self, problem: &Problem) -> bool {
        problem.missions().len() < self.synchronous_limit
    }

    fn solve(&self, problem: &Problem) -> Result<Solution, SolverError> {
        let tic = jiff::Timestamp::now();
        let mut served = vec![false; problem.missions().len()];
        let mut route_ends: FxHashMap<VehicleIdx, SignedDuration> = FxHashMap::default();
        let mut routes: Vec<Option<Route>> = vec![None; problem.vehicles().len()];

        for (vehicle_index, predecessor) in Self::vehicle_order(problem) {
            let vehicle = &problem.vehicles()[vehicle_index];
            let mut start = vehicle
                .time_window()
                .map(|time_window| time_window.start())
                .unwrap_or(SignedDuration::ZERO);
            if let Some((previous, lapse)) = predecessor
                && let Some(&previous_end) = route_ends.get(&previous)
            {
                start = start.max(previous_end + SignedDuration::from_secs(lapse));
            }

            let route = Self::build_route(problem, vehicle, start, &mut served);
            let end = route
                .stops
                .last()
                .map(|stop| stop.info.departure_time)
                .unwrap_or(start);
            route_ends.insert(vehicle_index, end);
            routes[vehicle_index.get()] = Some(route);
        }

        let unassigned: Vec<Stop> = problem
            .missions()
            .iter()
            .zip(served.iter())
            .filter(|(_, served)| !**served)
            .map(|(mission, _)| Stop::unassigned(mission, Some(UNREACHABLE_REASON)))
            .collect();

        debug!(
            routes = routes.len(),
            unassigned = unassigned.len(),
            "Demo solver built routes"
        );

        Ok(Solution {
            name: problem.name().map(String::from),
            solvers: vec![SolverKind::Demo],
            elapsed: Some(jiff::Timestamp::now().duration_since(tic)),
            routes: routes.into_iter().flatten().collect(),
            unassigned,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        problem::{
            problem::ProblemBuilder,
            relation::Relation,
            skill::SkillSet,
            vehicle::{Capacity, VehicleBuilder},
        },
        test_utils::{create_line_matrix, create_line_problem, create_mission, create_point},
    };

    #[test]
    fn test_serves_every_mission() {
        let problem = create_line_problem(5, 1);
        let solution = DemoSolver::default().solve(&problem).unwrap();

        assert_eq!(solution.count_assigned_missions(), 5);
        assert!(solution.unassigned.is_empty());
        let ids: Vec<_> = solution.routes[0]
            .stops
            .iter()
            .filter_map(|stop| stop.mission_id())
            .collect();
        assert_eq!(ids, vec!["m1", "m2", "m3", "m4", "m5"]);
    }

    #[test]
    fn test_skills_respected() {
        let mut builder = ProblemBuilder::default();
        let mut vehicle = VehicleBuilder::new("v0");
        vehicle
            .set_start_point(create_point(0))
            .add_skills(SkillSet::new(["frozen"]));
        builder
            .set_missions(vec![create_mission(1, &["frozen"]), create_mission(2, &["heavy"])])
            .add_vehicle(vehicle.build())
            .add_matrix(create_line_matrix(3));
        let problem = builder.build();

        let solution = DemoSolver::default().solve(&problem).unwrap();
        assert_eq!(solution.count_assigned_missions(), 1);
        assert_eq!(solution.unassigned[0].mission_id(), Some("m2"));
        assert_eq!(solution.unassigned[0].reason.as_deref(), Some(UNREACHABLE_REASON));
    }

    #[test]
    fn test_vehicle_trips_are_chained() {
        let mut builder = ProblemBuilder::default();
        builder
            .set_missions((1..6).map(|i| create_mission(i, &[])).collect())
            .add_matrix(create_line_matrix(6))
            .add_relation(
                Relation::on_vehicles(
                    RelationType::VehicleTrips,
                    vec![String::from("v1"), String::from("v0")],
                )
                .with_lapse(0),
            );
        for id in ["v0", "v1"] {
            let mut vehicle = VehicleBuilder::new(id);
            vehicle
                .set_start_point(create_point(0))
                .set_end_point(create_point(0))
                .add_capacity(Capacity::new("kg", Some(3.0)));
            builder.add_vehicle(vehicle.build());
        }
        let problem = builder.build();

        let solution = DemoSolver::default().solve(&problem).unwrap();
        let first = solution.routes.iter().find(|route| route.vehicle_id == "v1").unwrap();
        let second = solution.routes.iter().find(|route| route.vehicle_id == "v0").unwrap();

        assert_eq!(first.count_missions(), 3);
        assert_eq!(second.count_missions(), 2);
        let first_end = first.stops.last().unwrap().info.departure_time;
        let second_start = second.stops.first().unwrap().info.begin_time;
        assert!(first_end <= second_start);
    }

    #[test]
    fn test_line_problem_is_applicable() {
        let problem = create_line_problem(2, 1);
        assert!(DemoSolver::default().inapplicable_reasons(&problem).is_empty());
        assert!(DemoSolver::default().solve_synchronously(&problem));
        assert!(!DemoSolver::new(2).solve_synchronously(&problem));
    }
}
