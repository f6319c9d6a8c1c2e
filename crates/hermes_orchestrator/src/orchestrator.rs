use std::sync::Arc;

use fxhash::FxHashSet;
use hermes_router::Router;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{Level, debug, info, instrument, warn};

use crate::{
    config::{OrchestratorConfig, Profile},
    error::OrchestratorError,
    jobs::{JobId, JobManager, JobPayload, JobQueue, JobState, ResultCache},
    partition::{filtered_solver_priority, split_independent_problem},
    problem::{problem::Problem, relation::Relation, relation::RelationType, skill::Skill},
    reconstruct::{ReconstructOptions, ReconstructionContext, reconstruct_solution},
    solution::{NO_VEHICLE_REASON, Solution},
    solver::{Solver, SolverError, SolverKind, SolverRegistry},
    verifier::check_consistency,
    zip_cluster::clique_cluster,
};

/// Pre-processing applied to every problem before decomposition
pub trait ProblemFilter: Send + Sync {
    fn filter(&self, problem: &mut Problem);
}

/// A sub-problem bound to the solver chosen for it
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SubProblem {
    pub solver: SolverKind,
    pub problem: Problem,
    pub dicho_level: usize,
    pub split_level: usize,
}

#[derive(Debug)]
pub enum SolveOutcome {
    Solved(Solution),
    Queued(JobId),
}

#[derive(Debug, Clone, Copy)]
enum SolveStage {
    Decomposed,
    SolverSelected,
    Dispatched,
    Queued,
    Reconstructed,
    Verified,
    Delivered,
    Rejected,
}

pub struct Orchestrator {
    config: OrchestratorConfig,
    solvers: SolverRegistry,
    router: Arc<dyn Router>,
    job_queue: Arc<dyn JobQueue>,
    result_cache: Arc<dyn ResultCache>,
    filters: Vec<Box<dyn ProblemFilter>>,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        solvers: SolverRegistry,
        router: Arc<dyn Router>,
        job_queue: Arc<dyn JobQueue>,
        result_cache: Arc<dyn ResultCache>,
    ) -> Self {
        Orchestrator {
            config,
            solvers,
            router,
            job_queue,
            result_cache,
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: Box<dyn ProblemFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn jobs(&self) -> JobManager {
        JobManager::new(Arc::clone(&self.job_queue), Arc::clone(&self.result_cache))
    }

    /// Decomposes the problem, then solves it in process or hands it to a worker queue
    #[instrument(skip_all, level = Level::INFO, fields(api_key = %api_key))]
    pub fn solve(
        &self,
        api_key: &str,
        profile: &Profile,
        mut problem: Problem,
        checksum: Option<&str>,
        job_id: Option<&str>,
    ) -> Result<SolveOutcome, OrchestratorError> {
        validate_relations(&problem)?;
        apply_zones(&mut problem);
        adjust_vehicle_durations(&mut problem);
        for filter in &self.filters {
            filter.filter(&mut problem);
        }

        let repetition = resolved_repetition(&problem, self.config.default_repetition);
        problem.configuration_mut().resolution.repetition = Some(repetition);
        let priority = filtered_solver_priority(&problem, profile);
        let cluster_threshold = problem.configuration().preprocessing.cluster_threshold;

        let sub_problems = split_independent_problem(problem);
        info!(
            stage = ?SolveStage::Decomposed,
            sub_problems = sub_problems.len(),
            "Problem decomposed"
        );

        let mut batch = Vec::with_capacity(sub_problems.len());
        let mut reasons = Vec::new();
        for sub_problem in sub_problems {
            match self.solvers.select(&sub_problem, &priority) {
                Ok(solver) => batch.push(SubProblem {
                    solver,
                    problem: sub_problem,
                    dicho_level: 0,
                    split_level: 0,
                }),
                Err(inapplicable) => {
                    warn!(reasons = ?inapplicable, "No applicable solver");
                    reasons.push(inapplicable);
                }
            }
        }
        if !reasons.is_empty() {
            info!(stage = ?SolveStage::Rejected, "Problem rejected");
            return Err(OrchestratorError::UnsupportedProblem {
                message: String::from("Cannot apply any of the solver services"),
                reasons,
            });
        }
        info!(
            stage = ?SolveStage::SolverSelected,
            solvers = ?batch.iter().map(|sub_problem| sub_problem.solver).collect::<Vec<_>>(),
            "Solvers selected"
        );

        let cheap = match batch.as_slice() {
            [single] if cluster_threshold.is_none() => self
                .solvers
                .get(single.solver)?
                .solve_synchronously(&single.problem),
            _ => false,
        };

        if self.config.solve_synchronously || profile.force_synchronous || cheap {
            info!(stage = ?SolveStage::Dispatched, "Solving synchronously");
            let solution = self.run_batch(batch, job_id)?;
            info!(stage = ?SolveStage::Delivered, "Solution delivered");
            return Ok(SolveOutcome::Solved(solution));
        }

        let payload = JobPayload {
            api_key: api_key.to_owned(),
            checksum: checksum.map(String::from),
            batch: serde_json::to_string(&batch)?,
        };
        let job_id = self.job_queue.enqueue(&profile.queue, payload)?;
        self.result_cache.add(api_key, &job_id);
        info!(stage = ?SolveStage::Queued, %job_id, queue = %profile.queue, "Job queued");

        Ok(SolveOutcome::Queued(job_id))
    }

    /// Worker entry point for a dequeued job
    #[instrument(skip_all, level = Level::INFO, fields(job_id = %job_id))]
    pub fn run_payload(&self, job_id: &str, payload: &JobPayload) -> Result<Solution, OrchestratorError> {
        let batch: Vec<SubProblem> = serde_json::from_str(&payload.batch)?;
        self.run_batch(batch, Some(job_id))
    }

    /// Solves every sub-problem in parallel and merges the results
    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn run_batch(
        &self,
        batch: Vec<SubProblem>,
        job_id: Option<&str>,
    ) -> Result<Solution, OrchestratorError> {
        let expected: usize = batch
            .iter()
            .map(|sub_problem| sub_problem.problem.visits())
            .sum();

        let solutions = batch
            .par_iter()
            .map(|sub_problem| self.solve_sub_problem(sub_problem, job_id))
            .collect::<Result<Vec<_>, _>>()?;

        let solution = solutions
            .into_iter()
            .reduce(Solution::merge)
            .unwrap_or_default();
        check_consistency(expected, std::slice::from_ref(&solution), self.config.production)?;

        info!(
            stage = ?SolveStage::Verified,
            expected,
            unassigned = solution.count_unassigned_missions(),
            routes = solution.count_used_routes(),
            "Batch solved"
        );

        Ok(solution)
    }

    fn is_killed(&self, job_id: Option<&str>) -> bool {
        job_id
            .and_then(|job_id| self.job_queue.status(job_id))
            .is_some_and(|status| status.state == JobState::Killed)
    }

    /// Keeps the repetition with the fewest unassigned missions
    fn solve_sub_problem(
        &self,
        sub_problem: &SubProblem,
        job_id: Option<&str>,
    ) -> Result<Solution, OrchestratorError> {
        let solver = self.solvers.get(sub_problem.solver)?;
        let repetitions = sub_problem
            .problem
            .configuration()
            .resolution
            .repetition
            .unwrap_or(1)
            .max(1);

        let mut best: Option<Solution> = None;
        for repetition in 0..repetitions {
            if self.is_killed(job_id) {
                return Err(SolverError::Killed.into());
            }

            let solution = self.solve_once(solver.as_ref(), &sub_problem.problem)?;
            let unassigned = solution.count_unassigned_missions();
            debug!(
                repetition = repetition + 1,
                repetitions, unassigned, "Repetition solved"
            );

            if best
                .as_ref()
                .is_none_or(|best| unassigned < best.count_unassigned_missions())
            {
                best = Some(solution);
            }
            if unassigned == 0 {
                break;
            }
        }

        best.ok_or(OrchestratorError::Solver(SolverError::NoSolution(
            sub_problem.solver,
        )))
    }

    fn solve_once(&self, solver: &dyn Solver, problem: &Problem) -> Result<Solution, OrchestratorError> {
        if problem.vehicles().is_empty() || problem.missions().is_empty() {
            return Ok(Solution::empty(solver.kind(), problem, Some(NO_VEHICLE_REASON)));
        }

        let router = self.router.as_ref();
        let router_url = self.config.router_url.as_str();
        let solution = clique_cluster(problem, solver, router, router_url, |candidate| {
            let solution = solver.solve(candidate)?;
            let context = ReconstructionContext {
                problem: candidate,
                router,
                router_url,
            };
            Ok(reconstruct_solution(solution, &context, ReconstructOptions::default())?)
        })?;
        debug!(stage = ?SolveStage::Reconstructed, solver = %solver.kind(), "Solution reconstructed");

        check_consistency(
            problem.visits(),
            std::slice::from_ref(&solution),
            self.config.production,
        )?;

        Ok(solution)
    }
}

/// Repetitions requested, or the configured default for partitioned periodic problems
pub fn resolved_repetition(problem: &Problem, default_repetition: usize) -> usize {
    let configuration = problem.configuration();
    match configuration.resolution.repetition {
        Some(repetition) => repetition,
        None if !configuration.preprocessing.partitions.is_empty()
            && configuration.preprocessing.uses_periodic_heuristic() =>
        {
            default_repetition
        }
        None => 1,
    }
}

pub fn validate_relations(problem: &Problem) -> Result<(), OrchestratorError> {
    let mission_ids: FxHashSet<&str> = problem.missions().iter().map(|mission| mission.id()).collect();
    let vehicle_ids: FxHashSet<&str> = problem.vehicles().iter().map(|vehicle| vehicle.id()).collect();

    for relation in problem.relations() {
        let relation_type = relation.relation_type();
        if let Some(unknown) = relation
            .linked_ids()
            .iter()
            .find(|id| !mission_ids.contains(id.as_str()))
        {
            return Err(OrchestratorError::DiscordantProblem(format!(
                "Relation {relation_type} links unknown mission {unknown}"
            )));
        }
        if let Some(unknown) = relation
            .linked_vehicle_ids()
            .iter()
            .find(|id| !vehicle_ids.contains(id.as_str()))
        {
            return Err(OrchestratorError::DiscordantProblem(format!(
                "Relation {relation_type} links unknown vehicle {unknown}"
            )));
        }
        if relation_type.binds_vehicles() && relation.linked_vehicle_ids().is_empty() {
            return Err(OrchestratorError::DiscordantProblem(format!(
                "Relation {relation_type} requires linked vehicles"
            )));
        }
        if relation.lapse().is_some_and(|lapse| lapse < 0) {
            return Err(OrchestratorError::DiscordantProblem(format!(
                "Relation {relation_type} has a negative lapse"
            )));
        }
    }

    if !problem.is_periodic()
        && problem
            .missions()
            .iter()
            .any(|mission| mission.time_window_day_indices().next().is_some())
    {
        return Err(OrchestratorError::DiscordantProblem(String::from(
            "Time windows with day indices require a schedule",
        )));
    }

    Ok(())
}

/// Turns zones into skills: allocated vehicles and inside missions share the zone id
pub fn apply_zones(problem: &mut Problem) {
    let zones = problem.zones().to_vec();

    for zone in &zones {
        let allocated: Vec<&str> = match zone.allocations() {
            [] => continue,
            [single] => single.iter().map(String::as_str).collect(),
            several => several
                .iter()
                .filter_map(|allocation| allocation.first())
                .map(String::as_str)
                .collect(),
        };

        let skill = Skill::new(zone.id());
        for vehicle in problem.vehicles_mut().iter_mut() {
            if allocated.contains(&vehicle.id()) {
                vehicle.add_skill_to_alternatives(&skill);
            }
        }
    }

    if !problem.all_points_located() {
        return;
    }

    for zone in &zones {
        let skill = Skill::new(zone.id());
        let mut inside_ids = Vec::new();
        for mission in problem.missions_mut().iter_mut() {
            let inside = mission
                .main_activity()
                .and_then(|activity| activity.point())
                .and_then(|point| point.location())
                .is_some_and(|location| zone.contains(location));
            if inside {
                mission.add_skill(skill.clone());
                inside_ids.push(mission.id().to_owned());
            }
        }

        if zone.allocations().len() > 1 && inside_ids.len() > 1 {
            debug!(zone = zone.id(), missions = inside_ids.len(), "Zone missions kept on the same route");
            problem
                .relations_mut()
                .push(Relation::new(RelationType::SameRoute, inside_ids));
        }
    }
}

/// Rests are served within the working duration
pub fn adjust_vehicle_durations(problem: &mut Problem) {
    for vehicle in problem.vehicles_mut().iter_mut() {
        let Some(duration) = vehicle.duration() else {
            continue;
        };
        if vehicle.rests().is_empty() {
            continue;
        }

        let rests = vehicle
            .rests()
            .iter()
            .fold(jiff::SignedDuration::ZERO, |total, rest| total + rest.duration());
        vehicle.set_duration(duration + rests);
    }
}
