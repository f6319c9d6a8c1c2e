use hermes_router::{RouteLeg, Router, RouterDimension, RouterError, RouterOptions, Segment};
use jiff::SignedDuration;
use rayon::prelude::*;
use tracing::debug;

use crate::{
    problem::{
        activity::Activity,
        location::Location,
        matrix::{Dimension, TravelMatrix},
        problem::Problem,
        vehicle::Vehicle,
    },
    solution::{Solution, route::Route, stop::Stop},
    utils::time::{round_to, seconds},
};

pub const WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

pub struct ReconstructionContext<'a> {
    pub problem: &'a Problem,
    pub router: &'a dyn Router,
    pub router_url: &'a str,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ReconstructOptions {
    /// Back-fill travel figures and timings the solver left empty
    pub compute_dimensions: bool,
}

/// Annotates every route of the solution, routes are independent and processed in parallel
pub fn reconstruct_solution(
    mut solution: Solution,
    context: &ReconstructionContext,
    options: ReconstructOptions,
) -> Result<Solution, RouterError> {
    solution.routes = solution
        .routes
        .into_par_iter()
        .map(|route| reconstruct_route(route, context, options))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(solution)
}

pub fn reconstruct_route(
    mut route: Route,
    context: &ReconstructionContext,
    options: ReconstructOptions,
) -> Result<Route, RouterError> {
    if route.stops.is_empty() {
        return Ok(route);
    }

    let parser = RouteParser {
        vehicle: context.problem.vehicle(&route.vehicle_id),
        matrix: context
            .problem
            .vehicle(&route.vehicle_id)
            .and_then(|vehicle| context.problem.matrix_for(vehicle))
            .or_else(|| context.problem.matrices().first()),
        context,
    };

    if options.compute_dimensions {
        parser.compute_missing_dimensions(&mut route);
    }
    let legs = parser.compute_route_travel_distances(&mut route)?;
    compute_total_time(&mut route);
    parser.compute_route_waiting_times(&mut route);
    parser.compute_route_total_dimensions(&mut route);
    if legs.is_some() && parser.matrix.is_none_or(|matrix| !matrix.has(Dimension::Distance)) {
        route.info.total_distance = Some(round_to(
            route
                .stops
                .iter()
                .filter_map(|stop| stop.info.travel_distance)
                .sum(),
            4,
        ));
    }
    parser.set_schedule(&mut route);

    let restitution = &context.problem.configuration().restitution;
    if restitution.wants_polylines() && route.stops.iter().any(|stop| stop.mission_id().is_some()) {
        let legs = match legs {
            Some(legs) => Some(legs),
            None => parser.route_info(&route)?,
        };
        route.geometry = legs.map(|legs| legs.into_iter().filter_map(|leg| leg.geometry).collect());
    }

    debug!(
        vehicle = %route.vehicle_id,
        stops = route.stops.len(),
        total_time = ?route.info.total_time,
        "Route reconstructed"
    );

    Ok(route)
}

/// `None` as soon as one stop lacks the figure
fn sum_durations(durations: impl Iterator<Item = Option<SignedDuration>>) -> Option<SignedDuration> {
    durations.fold(Some(SignedDuration::ZERO), |total, duration| Some(total? + duration?))
}

fn compute_total_time(route: &mut Route) {
    let (Some(first), Some(last)) = (route.stops.first(), route.stops.last()) else {
        return;
    };

    let start = first.info.begin_time;
    let end = last.info.end_time.unwrap_or(last.info.begin_time);
    route.info.start_time = Some(start);
    route.info.end_time = Some(end);
    route.info.total_time = Some(end - start);
}

struct RouteParser<'a> {
    vehicle: Option<&'a Vehicle>,
    matrix: Option<&'a TravelMatrix>,
    context: &'a ReconstructionContext<'a>,
}

impl RouteParser<'_> {
    fn duration_on(&self, activity: &Activity) -> SignedDuration {
        match self.vehicle {
            Some(vehicle) => vehicle.duration_on(activity),
            None => activity.duration(),
        }
    }

    fn setup_duration_on(&self, activity: &Activity) -> SignedDuration {
        match self.vehicle {
            Some(vehicle) => vehicle.setup_duration_on(activity),
            None => activity.setup_duration(),
        }
    }

    fn matrix_value(&self, dimension: Dimension, from: Option<usize>, to: Option<usize>) -> Option<f64> {
        match (self.matrix, from, to) {
            (Some(matrix), Some(from), Some(to)) => matrix.get(dimension, from, to),
            _ => None,
        }
    }

    /// Simulates each matrix dimension the solver left empty.
    /// A dimension is skipped as soon as one stop carries a positive figure for it.
    fn compute_missing_dimensions(&self, route: &mut Route) {
        let Some(matrix) = self.matrix else {
            return;
        };

        for dimension in Dimension::ALL {
            if !matrix.has(dimension)
                || route
                    .stops
                    .iter()
                    .any(|stop| stop.info.travel(dimension).is_some_and(|travel| travel > 0.0))
            {
                continue;
            }

            let mut previous_departure = route.stops[0].info.begin_time;
            let mut cumulated = 0.0;
            let mut previous_point: Option<String> = None;
            let mut previous_index: Option<usize> = None;

            for stop in route.stops.iter_mut() {
                let current_index = stop.activity.matrix_index();
                let travel = self.matrix_value(dimension, previous_index, current_index);
                if let Some(travel) = travel {
                    stop.info.set_travel(dimension, travel);
                }

                match dimension {
                    Dimension::Time => {
                        previous_departure = self.compute_time_info(
                            previous_point.as_deref(),
                            stop,
                            previous_departure,
                            travel.unwrap_or(0.0),
                        );
                    }
                    Dimension::Distance => {
                        stop.info.current_distance = cumulated;
                        cumulated += travel.unwrap_or(0.0);
                    }
                    Dimension::Value => {}
                }

                if !stop.is_rest() {
                    previous_point = stop.point_id().map(String::from);
                    previous_index = current_index;
                }
            }
        }
    }

    /// Earliest start given the first time window still open and the travel, returns the departure
    fn compute_time_info(
        &self,
        previous_point: Option<&str>,
        stop: &mut Stop,
        previous_departure: SignedDuration,
        travel_time: f64,
    ) -> SignedDuration {
        let window_start = stop
            .activity
            .time_windows()
            .iter()
            .find(|time_window| time_window.is_open_after(previous_departure))
            .map(|time_window| time_window.start())
            .unwrap_or(SignedDuration::ZERO);

        let mut earliest_arrival = window_start.max(previous_departure + seconds(travel_time));
        if previous_point != stop.point_id() {
            earliest_arrival += self.setup_duration_on(&stop.activity);
        }

        stop.info.begin_time = earliest_arrival;
        let end = earliest_arrival + self.duration_on(&stop.activity);
        stop.info.end_time = Some(end);
        stop.info.departure_time = end;
        end
    }

    fn compute_route_travel_distances(
        &self,
        route: &mut Route,
    ) -> Result<Option<Vec<RouteLeg>>, RouterError> {
        let matrix_has_distance = self
            .matrix
            .is_some_and(|matrix| matrix.has(Dimension::Distance));
        if matrix_has_distance
            || route.stops.len() <= 1
            || !route
                .stops
                .iter()
                .filter(|stop| !stop.is_rest())
                .all(Stop::has_location)
        {
            return Ok(None);
        }

        let Some(legs) = self.route_info(route)? else {
            return Ok(None);
        };

        for (stop, leg) in route.stops[1..].iter_mut().zip(legs.iter()) {
            stop.info.travel_distance = leg.distance;
        }

        Ok(Some(legs))
    }

    /// One segment per consecutive pair of located stops, a rest stands at the next location
    fn route_info(&self, route: &Route) -> Result<Option<Vec<RouteLeg>>, RouterError> {
        let mut next: Option<Location> = None;
        let mut segments: Vec<Segment> = route
            .stops
            .iter()
            .rev()
            .filter_map(|stop| {
                let current = if stop.is_rest() {
                    next
                } else {
                    stop.activity
                        .point()
                        .and_then(|point| point.location())
                        .copied()
                };
                let segment = match (current, next) {
                    (Some(from), Some(to)) => {
                        Some(Segment::from_lat_lon(from.lat(), from.lon(), to.lat(), to.lon()))
                    }
                    _ => None,
                };
                next = current;
                segment
            })
            .collect();
        segments.reverse();

        if segments.is_empty() {
            return Ok(None);
        }

        let default_options = RouterOptions::default();
        let (mode, dimension, options) = match self.vehicle {
            Some(vehicle) => (
                vehicle.router_mode(),
                vehicle.router_dimension(),
                vehicle.router_options(),
            ),
            None => ("car", RouterDimension::Time, &default_options),
        };

        let mut legs = self.context.router.compute_batch(
            self.context.router_url,
            mode,
            dimension,
            &segments,
            self.context
                .problem
                .configuration()
                .restitution
                .wants_encoded_polylines(),
            options,
        )?;
        if legs.is_empty() {
            return Err(RouterError::NoRoute);
        }

        for leg in legs.iter_mut() {
            leg.distance = leg.distance.map(|meters| round_to(meters / 1000.0, 4));
        }

        Ok(Some(legs))
    }

    /// Waiting is the gap left once travel and setup are accounted for.
    /// A run of rests consumes the travel and setup of the next real stop first.
    fn compute_route_waiting_times(&self, route: &mut Route) {
        let mut previous_point: Option<String> = None;
        let mut previous_end = route.info.start_time.unwrap_or(route.stops[0].info.begin_time);
        let mut location_index: Option<usize> = None;
        let mut consumed_travel_time = SignedDuration::ZERO;
        let mut consumed_setup_time = SignedDuration::ZERO;

        for index in 0..route.stops.len() {
            let stop = &route.stops[index];
            let begin = stop.info.begin_time;
            let used_travel_time;
            let considered_setup;

            if stop.is_rest() {
                if location_index.is_none() {
                    location_index = route.stops[index..]
                        .iter()
                        .position(|stop| !stop.is_rest())
                        .map(|offset| index + offset);
                    consumed_travel_time = SignedDuration::ZERO;
                }
                let location_stop = location_index.map(|location| &route.stops[location]);
                let shared_travel_time = location_stop
                    .and_then(|stop| stop.info.travel_time)
                    .unwrap_or(SignedDuration::ZERO);
                let potential_setup = match location_stop {
                    Some(location_stop) if previous_point.as_deref() != location_stop.point_id() => {
                        self.setup_duration_on(&location_stop.activity)
                    }
                    _ => SignedDuration::ZERO,
                };

                let left_travel_time = shared_travel_time - consumed_travel_time;
                used_travel_time = (begin - previous_end).min(left_travel_time);
                consumed_travel_time += used_travel_time;

                // setup may be performed before the rest to reduce waiting
                let extra_time = begin - previous_end - used_travel_time;
                considered_setup = extra_time.max(SignedDuration::ZERO).min(potential_setup);
                consumed_setup_time += considered_setup;
            } else {
                let potential_setup = if previous_point.as_deref() != stop.point_id() {
                    self.setup_duration_on(&stop.activity)
                } else {
                    SignedDuration::ZERO
                };
                used_travel_time =
                    stop.info.travel_time.unwrap_or(SignedDuration::ZERO) - consumed_travel_time;
                consumed_travel_time = SignedDuration::ZERO;
                location_index = None;
                considered_setup = (potential_setup - consumed_setup_time).max(SignedDuration::ZERO);
            }

            let arrival_time = previous_end + used_travel_time;
            let is_rest = stop.is_rest();
            let point = stop.point_id().map(String::from);

            let stop = &mut route.stops[index];
            stop.info.waiting_time =
                Some((begin - (arrival_time + considered_setup)).max(SignedDuration::ZERO));
            stop.info.setup_time = Some(considered_setup);
            previous_end = stop.info.end_time.unwrap_or(begin);

            if !is_rest {
                consumed_setup_time = SignedDuration::ZERO;
                previous_point = point;
            }
        }
    }

    fn compute_route_total_dimensions(&self, route: &mut Route) {
        let dimensions: Vec<Dimension> = Dimension::ALL
            .into_iter()
            .filter(|dimension| self.matrix.is_some_and(|matrix| matrix.has(*dimension)))
            .collect();
        let mut totals = [0.0; 3];
        let mut previous_index: Option<usize> = None;

        for stop in route.stops.iter_mut() {
            let matrix_index = stop.activity.matrix_index();
            for (slot, &dimension) in dimensions.iter().enumerate() {
                if previous_index.is_some() && matrix_index.is_some() {
                    if stop.info.travel(dimension).is_none()
                        && let Some(value) = self.matrix_value(dimension, previous_index, matrix_index)
                    {
                        stop.info.set_travel(dimension, value);
                    }
                    totals[slot] += stop.info.travel(dimension).unwrap_or(0.0).round();
                    if dimension == Dimension::Distance {
                        stop.info.current_distance = totals[slot].round();
                    }
                } else {
                    stop.info.set_travel(dimension, 0.0);
                }
            }

            if !stop.is_rest() {
                previous_index = matrix_index;
            }
        }

        compute_total_time(route);
        for (slot, dimension) in dimensions.iter().enumerate() {
            match dimension {
                Dimension::Time => route.info.total_travel_time = Some(seconds(totals[slot])),
                Dimension::Distance => route.info.total_distance = Some(totals[slot].round()),
                Dimension::Value => route.info.total_travel_value = Some(totals[slot].round()),
            }
        }

        route.info.total_waiting_time = sum_durations(route.stops.iter().map(|stop| stop.info.waiting_time));
        route.info.total_setup_time = sum_durations(route.stops.iter().map(|stop| stop.info.setup_time));
    }

    /// Day labels for periodic problems, weeks are zero padded to the horizon width
    fn set_schedule(&self, route: &mut Route) {
        let Some(schedule) = self.context.problem.configuration().schedule else {
            return;
        };
        let Some(day_index) = self.vehicle.and_then(|vehicle| vehicle.global_day_index()) else {
            return;
        };

        let size_weeks = ((schedule.end_index as f64) / 7.0).ceil().to_string().len();
        let week = format!("{:0width$}", day_index.div_euclid(7) + 1, width = size_weeks);
        let weekday = day_index.rem_euclid(7);
        let day_week_num = format!("{weekday}_{week}");
        let day_week = format!("{}_{week}", WEEKDAYS[weekday as usize]);

        for stop in route.stops.iter_mut() {
            stop.info.day_week_num = Some(day_week_num.clone());
            stop.info.day_week = Some(day_week.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use hermes_router::{LegGeometry, as_the_crow_flies::AsTheCrowFliesRouter};

    use super::*;
    use crate::{
        problem::{
            configuration::{GeometryKind, Schedule},
            location::Point,
            matrix::TravelMatrix,
            mission::MissionBuilder,
            problem::ProblemBuilder,
            time_window::TimeWindow,
            vehicle::{Rest, VehicleBuilder},
        },
        solution::stop::StopInfo,
        test_utils::{
            FailingRouter, create_line_matrix, create_line_problem, create_point, create_vehicle,
        },
    };

    fn secs(value: i64) -> SignedDuration {
        SignedDuration::from_secs(value)
    }

    fn context<'a>(problem: &'a Problem, router: &'a dyn Router) -> ReconstructionContext<'a> {
        ReconstructionContext {
            problem,
            router,
            router_url: "",
        }
    }

    fn timed(stop: Stop, travel: Option<i64>, begin: i64, end: i64) -> Stop {
        stop.with_info(StopInfo {
            travel_time: travel.map(secs),
            begin_time: secs(begin),
            end_time: Some(secs(end)),
            departure_time: secs(end),
            ..Default::default()
        })
    }

    fn mission_stop(problem: &Problem, id: &str) -> Stop {
        Stop::mission(problem.mission(id).unwrap())
    }

    #[test]
    fn test_waiting_times_without_setup() {
        let problem = create_line_problem(3, 1);
        let route = Route::new(
            "v0",
            vec![
                timed(Stop::depot(&create_point(0)), None, 0, 0),
                timed(mission_stop(&problem, "m1"), Some(60), 100, 400),
                timed(mission_stop(&problem, "m2"), Some(60), 460, 760),
                timed(mission_stop(&problem, "m3"), Some(60), 900, 1200),
                timed(Stop::depot(&create_point(0)), Some(180), 1380, 1380),
            ],
        );
        let router = AsTheCrowFliesRouter::default();

        let route = reconstruct_route(route, &context(&problem, &router), ReconstructOptions::default())
            .unwrap();

        let waiting: Vec<_> = route
            .stops
            .iter()
            .map(|stop| stop.info.waiting_time.unwrap())
            .collect();
        assert_eq!(waiting, vec![secs(0), secs(40), secs(0), secs(80), secs(0)]);

        let mut previous_end = SignedDuration::ZERO;
        for stop in &route.stops {
            let expected = (stop.info.begin_time
                - (previous_end + stop.info.travel_time.unwrap_or(SignedDuration::ZERO)))
            .max(SignedDuration::ZERO);
            assert_eq!(stop.info.waiting_time, Some(expected));
            previous_end = stop.info.end_time.unwrap();
        }

        let durations = route.stops.iter().fold(SignedDuration::ZERO, |total, stop| {
            total + (stop.info.departure_time - stop.info.begin_time)
        });
        assert_eq!(route.info.total_time, Some(secs(1380)));
        assert_eq!(route.info.total_travel_time, Some(secs(360)));
        assert_eq!(route.info.total_waiting_time, Some(secs(120)));
        assert_eq!(
            route.info.total_time.unwrap(),
            route.info.total_travel_time.unwrap() + route.info.total_waiting_time.unwrap() + durations
        );
        assert_eq!(route.info.total_distance, Some(6000.0));
        assert_eq!(route.stops[3].info.current_distance, 3000.0);
    }

    #[test]
    fn test_compute_missing_dimensions() {
        let mut problem = create_line_problem(2, 1);
        let mut builder = MissionBuilder::new("m2");
        builder.set_activity(
            Activity::new(Some(create_point(2)), secs(300))
                .with_time_window(TimeWindow::new(secs(1000), Some(secs(2000)))),
        );
        problem.missions_mut()[1] = builder.build();

        let route = Route::new(
            "v0",
            vec![
                Stop::depot(&create_point(0)),
                mission_stop(&problem, "m1"),
                mission_stop(&problem, "m2"),
                Stop::depot(&create_point(0)),
            ],
        );
        let router = AsTheCrowFliesRouter::default();

        let route = reconstruct_route(
            route,
            &context(&problem, &router),
            ReconstructOptions {
                compute_dimensions: true,
            },
        )
        .unwrap();

        let begins: Vec<_> = route.stops.iter().map(|stop| stop.info.begin_time).collect();
        assert_eq!(begins, vec![secs(0), secs(60), secs(1000), secs(1420)]);
        assert_eq!(route.stops[2].info.waiting_time, Some(secs(580)));
        assert_eq!(route.stops[2].info.current_distance, 2000.0);
        assert_eq!(route.info.total_distance, Some(4000.0));
        assert_eq!(route.info.total_time, Some(secs(1420)));
        assert_eq!(route.info.total_travel_time, Some(secs(240)));
    }

    #[test]
    fn test_setup_duration_on_location_change() {
        let mut problem = create_line_problem(2, 1);
        let mut builder = MissionBuilder::new("m1");
        builder.set_activity(
            Activity::new(Some(create_point(1)), secs(300)).with_setup_duration(secs(30)),
        );
        problem.missions_mut()[0] = builder.build();

        let route = Route::new(
            "v0",
            vec![Stop::depot(&create_point(0)), mission_stop(&problem, "m1")],
        );
        let router = AsTheCrowFliesRouter::default();

        let route = reconstruct_route(
            route,
            &context(&problem, &router),
            ReconstructOptions {
                compute_dimensions: true,
            },
        )
        .unwrap();

        assert_eq!(route.stops[1].info.begin_time, secs(90));
        assert_eq!(route.stops[1].info.setup_time, Some(secs(30)));
        assert_eq!(route.stops[1].info.waiting_time, Some(secs(0)));
        assert_eq!(route.info.total_setup_time, Some(secs(30)));
    }

    #[test]
    fn test_rest_absorbs_setup() {
        let mut problem = create_line_problem(1, 1);
        let mut builder = MissionBuilder::new("m1");
        builder.set_activity(
            Activity::new(Some(create_point(1)), secs(300)).with_setup_duration(secs(30)),
        );
        problem.missions_mut()[0] = builder.build();
        let rest = Rest::new("lunch", secs(600), vec![]);

        let route = Route::new(
            "v0",
            vec![
                timed(Stop::depot(&create_point(0)), None, 0, 0),
                timed(Stop::rest(&rest), None, 150, 750),
                timed(mission_stop(&problem, "m1"), Some(120), 750, 1050),
            ],
        );
        let router = AsTheCrowFliesRouter::default();

        let route = reconstruct_route(route, &context(&problem, &router), ReconstructOptions::default())
            .unwrap();

        assert_eq!(route.stops[1].info.waiting_time, Some(secs(0)));
        assert_eq!(route.stops[1].info.setup_time, Some(secs(30)));
        assert_eq!(route.stops[2].info.waiting_time, Some(secs(0)));
        assert_eq!(route.stops[2].info.setup_time, Some(secs(0)));
        assert_eq!(route.info.total_waiting_time, Some(secs(0)));
    }

    fn problem_without_distance(geometry: Vec<GeometryKind>) -> Problem {
        let time_only = create_line_matrix(3);
        let rows: Vec<Vec<f64>> = (0..3)
            .map(|i| (0..3).map(|j| time_only.get(Dimension::Time, i, j).unwrap()).collect())
            .collect();
        let mut line = create_line_problem(2, 1);
        let mut builder = ProblemBuilder::default();
        builder
            .set_missions(line.missions_mut().drain(..).collect())
            .add_vehicle(create_vehicle("v0", &[]))
            .add_matrix(TravelMatrix::new("m1", Some(rows), None, None));
        let mut problem = builder.build();
        problem.configuration_mut().restitution.geometry = geometry;
        problem
    }

    #[test]
    fn test_router_distances_in_kilometres() {
        let problem = problem_without_distance(vec![GeometryKind::Polylines]);
        let route = Route::new(
            "v0",
            vec![
                Stop::depot(&create_point(0)),
                mission_stop(&problem, "m1"),
                mission_stop(&problem, "m2"),
            ],
        );
        let router = AsTheCrowFliesRouter::default();

        let route = reconstruct_route(
            route,
            &context(&problem, &router),
            ReconstructOptions {
                compute_dimensions: true,
            },
        )
        .unwrap();

        let expected = round_to(
            create_point(0)
                .location()
                .unwrap()
                .haversine_distance(create_point(1).location().unwrap())
                / 1000.0,
            4,
        );
        assert_eq!(route.stops[1].info.travel_distance, Some(expected));
        assert!(route.info.total_distance.unwrap() > expected);
        let geometry = route.geometry.unwrap();
        assert_eq!(geometry.len(), 2);
        assert!(matches!(geometry[0], LegGeometry::Feature(_)));
    }

    #[test]
    fn test_router_failure_is_propagated() {
        let problem = problem_without_distance(vec![]);
        let route = Route::new(
            "v0",
            vec![Stop::depot(&create_point(0)), mission_stop(&problem, "m1")],
        );

        let result = reconstruct_route(
            route,
            &context(&problem, &FailingRouter),
            ReconstructOptions::default(),
        );
        assert!(matches!(result, Err(RouterError::NoRoute)));
    }

    #[test]
    fn test_schedule_labels() {
        let mut builder = ProblemBuilder::default();
        let mut vehicle = VehicleBuilder::new("v0");
        vehicle
            .set_start_point(Point::new("p0", Some(0), None))
            .set_global_day_index(9);
        builder
            .add_vehicle(vehicle.build())
            .add_matrix(create_line_matrix(1));
        let mut problem = builder.build();
        problem.configuration_mut().schedule = Some(Schedule {
            start_index: 0,
            end_index: 100,
        });

        let route = Route::new("v0", vec![Stop::depot(&Point::new("p0", Some(0), None))]);
        let router = AsTheCrowFliesRouter::default();
        let route = reconstruct_route(route, &context(&problem, &router), ReconstructOptions::default())
            .unwrap();

        assert_eq!(route.stops[0].info.day_week_num.as_deref(), Some("2_02"));
        assert_eq!(route.stops[0].info.day_week.as_deref(), Some("wed_02"));
    }

    #[test]
    fn test_reconstruct_solution_keeps_route_order() {
        let problem = create_line_problem(2, 2);
        let solution = Solution {
            routes: vec![
                Route::new("v0", vec![Stop::depot(&create_point(0)), mission_stop(&problem, "m1")]),
                Route::new("v1", vec![Stop::depot(&create_point(0)), mission_stop(&problem, "m2")]),
            ],
            ..Default::default()
        };
        let router = AsTheCrowFliesRouter::default();

        let solution = reconstruct_solution(
            solution,
            &context(&problem, &router),
            ReconstructOptions {
                compute_dimensions: true,
            },
        )
        .unwrap();

        assert_eq!(solution.routes[0].vehicle_id, "v0");
        assert_eq!(solution.routes[1].info.total_travel_time, Some(secs(120)));
    }
}
