use fxhash::{FxHashMap, FxHashSet};
use hermes_router::Router;
use jiff::SignedDuration;
use tracing::{debug, info};

use crate::{
    error::OrchestratorError,
    problem::{
        matrix::Dimension,
        mission::{Mission, MissionIdx},
        problem::{Problem, ProblemOverrides},
    },
    reconstruct::{ReconstructOptions, ReconstructionContext, reconstruct_solution},
    solution::{Solution, route::Route, stop::Stop},
    solver::{Solver, SolverError},
    utils::time::timed,
};

/// Groups of nearby missions solved as a single synthetic mission
#[derive(Debug, Clone)]
pub struct ZipClusters {
    pub clusters: Vec<Vec<MissionIdx>>,
    pub original_missions: Vec<Mission>,
    cluster_of: FxHashMap<String, usize>,
}

impl ZipClusters {
    fn new(clusters: Vec<Vec<MissionIdx>>, original_missions: Vec<Mission>) -> Self {
        let cluster_of = clusters
            .iter()
            .enumerate()
            .flat_map(|(cluster_index, members)| {
                members
                    .iter()
                    .map(move |&member| (member, cluster_index))
            })
            .map(|(member, cluster_index)| (original_missions[member].id().to_owned(), cluster_index))
            .collect();

        ZipClusters {
            clusters,
            original_missions,
            cluster_of,
        }
    }

    /// Members of the cluster represented by `mission_id`, only when it gathers several missions
    pub fn members_of(&self, mission_id: &str) -> Option<&[MissionIdx]> {
        self.cluster_of
            .get(mission_id)
            .map(|&cluster_index| self.clusters[cluster_index].as_slice())
            .filter(|members| members.len() > 1)
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

pub fn is_zip_cluster_candidate(problem: &Problem, threshold: Option<f64>) -> bool {
    threshold.is_some()
        && problem.matrices().iter().any(|matrix| !matrix.is_empty())
        && problem
            .missions()
            .iter()
            .all(|mission| mission.activity().is_some())
        && !problem.has_rests()
        && problem.configuration().schedule.is_none()
        && problem
            .relations()
            .iter()
            .all(|relation| relation.relation_type().survives_zip_cluster())
        && problem
            .missions()
            .iter()
            .all(|mission| !mission.has_time_windows())
}

/// Pairwise mission distances, infinite where two missions may never share a cluster
fn mission_distances(problem: &Problem) -> Vec<Vec<f64>> {
    let missions = problem.missions();
    let dimension = problem
        .vehicles()
        .first()
        .map(|vehicle| Dimension::from(vehicle.router_dimension()))
        .unwrap_or(Dimension::Time);
    let matrix = problem.matrices().first();

    let used_units: FxHashSet<&str> = missions
        .iter()
        .flat_map(|mission| mission.quantities())
        .filter(|quantity| quantity.value() != 0.0)
        .map(|quantity| quantity.unit_id())
        .collect();
    let useful_capacities = problem.vehicles().iter().any(|vehicle| {
        vehicle
            .capacities()
            .iter()
            .any(|capacity| capacity.limit().is_some() && used_units.contains(capacity.unit_id()))
    });

    let travel = |from: &Mission, to: &Mission| -> Option<f64> {
        let from = from.activity()?.matrix_index()?;
        let to = to.activity()?.matrix_index()?;
        matrix?.get(dimension, from, to)
    };

    let mut distances = vec![vec![0.0; missions.len()]; missions.len()];
    for (i, a) in missions.iter().enumerate() {
        for (j, b) in missions.iter().enumerate().skip(i + 1) {
            let compatible = a.skills() == b.skills()
                && (!useful_capacities || (!a.has_nonzero_quantity() && !b.has_nonzero_quantity()));
            let distance = if compatible {
                match (travel(a, b), travel(b, a)) {
                    (Some(there), Some(back)) => there.max(back),
                    _ => f64::INFINITY,
                }
            } else {
                f64::INFINITY
            };
            distances[i][j] = distance;
            distances[j][i] = distance;
        }
    }

    distances
}

/// Agglomerative clustering where the distance between two clusters is their farthest pair
fn complete_linkage(mut distances: Vec<Vec<f64>>, threshold: f64) -> Vec<Vec<usize>> {
    let size = distances.len();
    let mut clusters: Vec<Option<Vec<usize>>> = (0..size).map(|index| Some(vec![index])).collect();

    loop {
        let mut closest: Option<(usize, usize, f64)> = None;
        for a in 0..size {
            if clusters[a].is_none() {
                continue;
            }
            for b in (a + 1)..size {
                if clusters[b].is_none() {
                    continue;
                }
                if closest.is_none_or(|(_, _, best)| distances[a][b] < best) {
                    closest = Some((a, b, distances[a][b]));
                }
            }
        }

        let Some((a, b, distance)) = closest else {
            break;
        };
        if !distance.is_finite() || distance > threshold {
            break;
        }

        if let Some(absorbed) = clusters[b].take()
            && let Some(cluster) = clusters[a].as_mut()
        {
            cluster.extend(absorbed);
        }
        for k in 0..size {
            let merged = distances[a][k].max(distances[b][k]);
            distances[a][k] = merged;
            distances[k][a] = merged;
        }
    }

    clusters
        .into_iter()
        .flatten()
        .map(|mut cluster| {
            cluster.sort_unstable();
            cluster
        })
        .collect()
}

/// Replaces the missions of `problem` by one synthetic mission per cluster.
/// Returns `None` when there is nothing to cluster.
pub fn zip_cluster(
    problem: &mut Problem,
    threshold: f64,
) -> Result<Option<ZipClusters>, OrchestratorError> {
    if problem.missions().is_empty() {
        return Ok(None);
    }
    if problem
        .missions()
        .iter()
        .any(|mission| !mission.activities().is_empty())
    {
        return Err(OrchestratorError::unsupported(
            "Threshold is not supported yet if one mission has several activities",
        ));
    }

    let clusters = timed("complete linkage clustering", || {
        complete_linkage(mission_distances(problem), threshold)
    });

    let original_missions = problem.missions().to_vec();
    let mut synthetic_missions = Vec::with_capacity(clusters.len());
    for members in &clusters {
        let mut representative = original_missions[members[0]].clone();
        let duration = members
            .iter()
            .filter_map(|&member| original_missions[member].activity())
            .fold(SignedDuration::ZERO, |total, activity| total + activity.duration());
        if let Some(activity) = representative.activity_mut() {
            activity.set_duration(duration);
        }
        if let Some(priority) = members
            .iter()
            .map(|&member| original_missions[member].priority())
            .min()
        {
            representative.set_priority(priority);
        }

        if members.len() > 1 {
            let member_ids: FxHashSet<&str> = members
                .iter()
                .map(|&member| original_missions[member].id())
                .collect();
            rewrite_initial_routes(problem, &member_ids, representative.id());
        }

        synthetic_missions.push(representative);
    }

    info!(
        missions = original_missions.len(),
        clusters = clusters.len(),
        threshold,
        "Zip clustering reduced the problem"
    );

    *problem.missions_mut() = synthetic_missions;

    Ok(Some(ZipClusters::new(
        clusters
            .into_iter()
            .map(|members| members.into_iter().map(MissionIdx::new).collect())
            .collect(),
        original_missions,
    )))
}

/// The first route referencing a member keeps a single anchor renamed to the synthetic id
fn rewrite_initial_routes(problem: &mut Problem, member_ids: &FxHashSet<&str>, synthetic_id: &str) {
    let Some((route_index, anchor_id)) = problem.routes().iter().enumerate().find_map(|(index, route)| {
        route
            .mission_ids
            .iter()
            .find(|id| member_ids.contains(id.as_str()))
            .map(|id| (index, id.clone()))
    }) else {
        return;
    };

    for route in problem.routes_mut().iter_mut() {
        route
            .mission_ids
            .retain(|id| *id == anchor_id || !member_ids.contains(id.as_str()));
    }
    for id in problem.routes_mut()[route_index].mission_ids.iter_mut() {
        if *id == anchor_id {
            *id = synthetic_id.to_owned();
        }
    }
}

/// Expands every synthetic stop back into its members, sequenced by `solver`.
/// `context.problem` is the problem before clustering.
pub fn unzip_cluster(
    solution: Solution,
    clusters: &ZipClusters,
    solver: &dyn Solver,
    context: &ReconstructionContext,
) -> Result<Solution, OrchestratorError> {
    let original = context.problem;
    let mut unassigned: Vec<Stop> = Vec::with_capacity(solution.unassigned.len());
    let mut routes = Vec::with_capacity(solution.routes.len());

    for mut route in solution.routes {
        let mut stops = Vec::with_capacity(route.stops.len());
        let mut previous_located: Option<Stop> = None;

        for index in 0..route.stops.len() {
            let stop = route.stops[index].clone();
            let Some(members) = stop.mission_id().and_then(|id| clusters.members_of(id)) else {
                if stop.activity.point().is_some() {
                    previous_located = Some(stop.clone());
                }
                stops.push(stop);
                continue;
            };

            let vehicle = original.vehicle(&route.vehicle_id).ok_or_else(|| {
                OrchestratorError::DiscordantProblem(format!(
                    "Route refers to unknown vehicle {}",
                    route.vehicle_id
                ))
            })?;
            let next_located = route.stops[index + 1..]
                .iter()
                .find(|stop| stop.activity.point().is_some());

            let sequencing = original.sub_problem_with_overrides(ProblemOverrides {
                missions: Some(
                    members
                        .iter()
                        .map(|&member| clusters.original_missions[member].clone())
                        .collect(),
                ),
                vehicles: Some(vec![vehicle.anchored(
                    previous_located
                        .as_ref()
                        .and_then(|stop| stop.activity.point().cloned()),
                    next_located.and_then(|stop| stop.activity.point().cloned()),
                    previous_located
                        .as_ref()
                        .map(|stop| stop.info.end_time.unwrap_or(stop.info.begin_time)),
                )]),
                relations: Some(Vec::new()),
                routes: Some(Vec::new()),
                cluster_threshold: Some(None),
                ..Default::default()
            });

            let mut sequenced = solver.solve(&sequencing)?;
            let sequenced_route = sequenced
                .routes
                .pop()
                .ok_or(SolverError::NoSolution(solver.kind()))?;
            unassigned.append(&mut sequenced.unassigned);

            let subtour_travel = sequenced_route
                .stops
                .iter()
                .filter_map(|stop| stop.info.travel_time)
                .fold(SignedDuration::ZERO, |total, travel| total + travel);
            let member_stops: Vec<Stop> = sequenced_route
                .stops
                .into_iter()
                .filter(|stop| stop.mission_id().is_some())
                .collect();

            let shift = subtour_travel
                - stop.info.travel_time.unwrap_or(SignedDuration::ZERO)
                - next_located
                    .and_then(|stop| stop.info.travel_time)
                    .unwrap_or(SignedDuration::ZERO);
            if index + 1 < route.stops.len() {
                route.shift_route_times(shift, index + 1);
            }

            debug!(
                vehicle = %route.vehicle_id,
                members = member_stops.len(),
                shift = ?shift,
                "Cluster expanded"
            );

            if let Some(last) = member_stops.last() {
                previous_located = Some(last.clone());
            }
            stops.extend(member_stops);
        }

        for stop in stops.iter_mut() {
            stop.info.clear_travel();
        }
        routes.push(Route::new(route.vehicle_id, stops));
    }

    for stop in solution.unassigned {
        match stop.mission_id().and_then(|id| clusters.members_of(id)) {
            Some(members) => unassigned.extend(members.iter().map(|&member| {
                Stop::unassigned(&clusters.original_missions[member], stop.reason.as_deref())
            })),
            None => unassigned.push(stop),
        }
    }

    let expanded = Solution {
        routes,
        unassigned,
        ..solution
    };

    Ok(reconstruct_solution(
        expanded,
        context,
        ReconstructOptions {
            compute_dimensions: true,
        },
    )?)
}

/// Solves `problem` through `solve`, reduced by zip clustering when it qualifies
pub fn clique_cluster<F>(
    problem: &Problem,
    solver: &dyn Solver,
    router: &dyn Router,
    router_url: &str,
    solve: F,
) -> Result<Solution, OrchestratorError>
where
    F: FnOnce(&Problem) -> Result<Solution, OrchestratorError>,
{
    let threshold = problem.configuration().preprocessing.cluster_threshold;
    let Some(threshold) = threshold.filter(|_| is_zip_cluster_candidate(problem, threshold)) else {
        return solve(problem);
    };

    let mut reduced = problem.clone();
    let Some(clusters) = zip_cluster(&mut reduced, threshold)? else {
        return solve(problem);
    };

    let solution = solve(&reduced)?;
    let context = ReconstructionContext {
        problem,
        router,
        router_url,
    };
    unzip_cluster(solution, &clusters, solver, &context)
}
