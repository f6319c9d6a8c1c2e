use tracing::{debug, info};

use crate::{
    config::Profile,
    problem::{
        mission::MissionIdx,
        problem::{Problem, ProblemOverrides},
        skill::SkillSet,
        vehicle::VehicleIdx,
    },
    solver::SolverKind,
    utils::dsu::Dsu,
};

/// Rows are the distinct mission skill sets, columns the distinct vehicle skill alternatives.
/// A cell is set when one alternative of the column covers the row.
pub struct CompatibilityTable {
    mission_skills: Vec<SkillSet>,
    vehicle_columns: Vec<usize>,
    cells: Vec<Vec<bool>>,
}

impl CompatibilityTable {
    pub fn new(problem: &Problem) -> Self {
        let mut mission_skills: Vec<SkillSet> = Vec::new();
        for mission in problem.missions() {
            if !mission_skills.contains(mission.skills()) {
                mission_skills.push(mission.skills().clone());
            }
        }

        let mut vehicle_skills: Vec<&[SkillSet]> = Vec::new();
        let vehicle_columns = problem
            .vehicles()
            .iter()
            .map(|vehicle| {
                match vehicle_skills
                    .iter()
                    .position(|skills| *skills == vehicle.skills())
                {
                    Some(column) => column,
                    None => {
                        vehicle_skills.push(vehicle.skills());
                        vehicle_skills.len() - 1
                    }
                }
            })
            .collect();

        let cells = mission_skills
            .iter()
            .map(|required| {
                vehicle_skills
                    .iter()
                    .map(|alternatives| {
                        alternatives
                            .iter()
                            .any(|alternative| required.is_satisfied_by(alternative))
                    })
                    .collect()
            })
            .collect();

        let mut table = CompatibilityTable {
            mission_skills,
            vehicle_columns,
            cells,
        };
        table.propagate_vehicle_relations(problem);
        table
    }

    /// Vehicles bound by a relation must stay together: every row served by one of them
    /// becomes served by all of them.
    fn propagate_vehicle_relations(&mut self, problem: &Problem) {
        for relation in problem
            .relations()
            .iter()
            .filter(|relation| relation.relation_type().binds_vehicles())
        {
            let columns: Vec<usize> = relation
                .linked_vehicle_ids()
                .iter()
                .filter_map(|id| {
                    problem
                        .vehicles()
                        .iter()
                        .position(|vehicle| vehicle.id() == id)
                        .map(|index| self.vehicle_columns[index])
                })
                .collect();

            let rows: Vec<usize> = (0..self.cells.len())
                .filter(|&row| columns.iter().any(|&column| self.cells[row][column]))
                .collect();

            for &row in &rows {
                for &column in &columns {
                    self.cells[row][column] = true;
                }
            }
        }
    }

    pub fn row_of(&self, skills: &SkillSet) -> Option<usize> {
        self.mission_skills.iter().position(|row| row == skills)
    }

    pub fn is_compatible(&self, row: usize, vehicle: VehicleIdx) -> bool {
        self.cells[row][self.vehicle_columns[vehicle.get()]]
    }

    fn rows_share_column(&self, a: usize, b: usize) -> bool {
        self.cells[a]
            .iter()
            .zip(self.cells[b].iter())
            .any(|(left, right)| *left && *right)
    }

    /// Row indices grouped so that no two groups are compatible with a common vehicle
    pub fn independent_rows(&self) -> Vec<Vec<usize>> {
        let mut dsu = Dsu::new(self.mission_skills.len());
        for a in 0..self.mission_skills.len() {
            for b in (a + 1)..self.mission_skills.len() {
                if self.rows_share_column(a, b) {
                    dsu.union(a, b);
                }
            }
        }
        dsu.groups()
    }
}

pub fn compute_independent_skill_sets(problem: &Problem) -> Vec<Vec<SkillSet>> {
    let table = CompatibilityTable::new(problem);
    table
        .independent_rows()
        .into_iter()
        .map(|rows| {
            rows.into_iter()
                .map(|row| table.mission_skills[row].clone())
                .collect()
        })
        .collect()
}

/// Requested solvers restricted to the allowed ones, in requested order
pub fn filtered_solver_priority(problem: &Problem, profile: &Profile) -> Vec<SolverKind> {
    let requested = &problem.configuration().resolution.solver_priority;
    if requested.is_empty() {
        return profile.allowed_solvers.clone();
    }

    requested
        .iter()
        .filter(|kind| profile.allowed_solvers.contains(kind))
        .copied()
        .collect()
}

/// Splits the problem into sub-problems sharing no vehicle.
/// Vehicles compatible with no mission are gathered in a last mission-less sub-problem.
pub fn split_independent_problem(problem: Problem) -> Vec<Problem> {
    if problem.vehicles().len() <= 1
        || problem.missions().is_empty()
        || problem.missions().iter().any(|mission| mission.skills().is_empty())
    {
        return vec![problem];
    }

    let table = CompatibilityTable::new(&problem);
    let groups = table.independent_rows();
    if groups.len() <= 1 {
        return vec![problem];
    }

    let mut used_vehicles = vec![false; problem.vehicles().len()];
    let mut sub_problems: Vec<Problem> = groups
        .iter()
        .map(|rows| {
            let mission_indices: Vec<MissionIdx> = problem
                .missions()
                .iter()
                .enumerate()
                .filter(|(_, mission)| {
                    table
                        .row_of(mission.skills())
                        .is_some_and(|row| rows.contains(&row))
                })
                .map(|(index, _)| MissionIdx::new(index))
                .collect();
            let vehicle_indices: Vec<VehicleIdx> = (0..problem.vehicles().len())
                .map(VehicleIdx::new)
                .filter(|&vehicle| rows.iter().any(|&row| table.is_compatible(row, vehicle)))
                .collect();

            for vehicle in &vehicle_indices {
                used_vehicles[vehicle.get()] = true;
            }

            problem.sub_problem_from_mission_subset(&mission_indices, &vehicle_indices)
        })
        .collect();

    if let Some(duration) = problem.configuration().resolution.duration {
        let size = |sub_problem: &Problem| {
            sub_problem.missions().len() * sub_problem.vehicles().len().min(1)
        };
        let total_size: usize = sub_problems.iter().map(size).sum();
        if total_size > 0 {
            sub_problems = sub_problems
                .into_iter()
                .map(|sub_problem| {
                    let share = duration.mul_f64(size(&sub_problem) as f64 / total_size as f64);
                    sub_problem.sub_problem_with_overrides(ProblemOverrides {
                        resolution_duration: Some(Some(share)),
                        ..Default::default()
                    })
                })
                .collect();
        }
    }

    let unused_vehicles: Vec<VehicleIdx> = used_vehicles
        .iter()
        .enumerate()
        .filter(|(_, used)| !**used)
        .map(|(index, _)| VehicleIdx::new(index))
        .collect();
    if !unused_vehicles.is_empty() {
        debug!(
            vehicles = unused_vehicles.len(),
            "Gathering vehicles compatible with no mission"
        );
        sub_problems.push(problem.sub_problem_from_mission_subset(&[], &unused_vehicles));
    }

    info!(
        sub_problems = sub_problems.len(),
        missions = problem.missions().len(),
        vehicles = problem.vehicles().len(),
        "Split into independent problems"
    );

    sub_problems
}

#[cfg(test)]
mod tests {
    use fxhash::FxHashSet;
    use jiff::SignedDuration;

    use super::*;
    use crate::{
        problem::{
            configuration::Configuration,
            problem::ProblemBuilder,
            relation::{Relation, RelationType},
            vehicle::{Vehicle, VehicleBuilder},
        },
        test_utils::{create_line_matrix, create_line_problem, create_mission, create_vehicle},
    };

    fn build_problem(
        missions: &[(usize, &[&str])],
        vehicles: Vec<Vehicle>,
        relations: Vec<Relation>,
    ) -> Problem {
        let mut builder = ProblemBuilder::default();
        builder
            .set_missions(
                missions
                    .iter()
                    .map(|(index, skills)| create_mission(*index, skills))
                    .collect(),
            )
            .set_vehicles(vehicles)
            .add_matrix(create_line_matrix(10));
        for relation in relations {
            builder.add_relation(relation);
        }
        builder.build()
    }

    fn assert_partition_is_independent(problem: &Problem, sub_problems: &[Problem]) {
        let mut mission_ids = FxHashSet::default();
        let mut vehicle_ids = FxHashSet::default();
        for sub_problem in sub_problems {
            for mission in sub_problem.missions() {
                assert!(mission_ids.insert(mission.id().to_owned()));
            }
            for vehicle in sub_problem.vehicles() {
                assert!(vehicle_ids.insert(vehicle.id().to_owned()), "vehicle shared");
            }
        }
        assert_eq!(mission_ids.len(), problem.missions().len());
        assert_eq!(vehicle_ids.len(), problem.vehicles().len());
    }

    #[test]
    fn test_independent_skill_sets() {
        let problem = build_problem(
            &[(1, &["a"]), (2, &["b"]), (3, &["c"]), (4, &["a", "b"])],
            vec![
                create_vehicle("v0", &["a", "b"]),
                create_vehicle("v1", &["c"]),
            ],
            vec![],
        );

        let groups = compute_independent_skill_sets(&problem);
        assert_eq!(
            groups,
            vec![
                vec![
                    SkillSet::new(["a"]),
                    SkillSet::new(["b"]),
                    SkillSet::new(["a", "b"])
                ],
                vec![SkillSet::new(["c"])],
            ]
        );
    }

    #[test]
    fn test_empty_problem_yields_empty_partition() {
        let problem = ProblemBuilder::default().build();
        assert!(compute_independent_skill_sets(&problem).is_empty());
    }

    #[test]
    fn test_strict_subset_goes_with_its_only_vehicle() {
        let problem = build_problem(
            &[(1, &["a"]), (2, &["c"]), (3, &["d"])],
            vec![
                create_vehicle("v0", &["a", "b"]),
                create_vehicle("v1", &["c"]),
                create_vehicle("v2", &["d"]),
            ],
            vec![],
        );

        let sub_problems = split_independent_problem(problem.clone());
        assert_eq!(sub_problems.len(), 3);
        assert_partition_is_independent(&problem, &sub_problems);

        let owner = sub_problems
            .iter()
            .find(|sub_problem| sub_problem.mission("m1").is_some())
            .unwrap();
        let vehicle_ids: Vec<_> = owner.vehicles().iter().map(|vehicle| vehicle.id()).collect();
        assert_eq!(vehicle_ids, vec!["v0"]);
    }

    #[test]
    fn test_alternative_skills_join_groups() {
        let mut vehicle = VehicleBuilder::new("v0");
        vehicle
            .add_skills(SkillSet::new(["a"]))
            .add_skills(SkillSet::new(["b"]));
        let problem = build_problem(
            &[(1, &["a"]), (2, &["b"])],
            vec![vehicle.build(), create_vehicle("v1", &["b"])],
            vec![],
        );

        assert_eq!(compute_independent_skill_sets(&problem).len(), 1);
        assert_eq!(split_independent_problem(problem).len(), 1);
    }

    #[test]
    fn test_vehicle_relation_propagation() {
        let missions: &[(usize, &[&str])] = &[(1, &["a"]), (2, &["b"])];
        let vehicles = || vec![create_vehicle("v0", &["a"]), create_vehicle("v1", &["b"])];

        let unrelated = build_problem(missions, vehicles(), vec![]);
        assert_eq!(compute_independent_skill_sets(&unrelated).len(), 2);

        let related = build_problem(
            missions,
            vehicles(),
            vec![Relation::on_vehicles(
                RelationType::VehicleGroupNumber,
                vec![String::from("v0"), String::from("v1")],
            )
            .with_lapse(1)],
        );
        assert_eq!(compute_independent_skill_sets(&related).len(), 1);
        assert_eq!(split_independent_problem(related).len(), 1);
    }

    #[test]
    fn test_unused_vehicles_and_duration_split() {
        let mut problem = build_problem(
            &[(1, &["a"]), (2, &["a"]), (3, &["a"]), (4, &["b"])],
            vec![
                create_vehicle("v0", &["a"]),
                create_vehicle("v1", &["b"]),
                create_vehicle("v2", &["z"]),
            ],
            vec![],
        );
        problem.configuration_mut().resolution.duration = Some(SignedDuration::from_secs(100));

        let sub_problems = split_independent_problem(problem.clone());
        assert_eq!(sub_problems.len(), 3);
        assert_partition_is_independent(&problem, &sub_problems);

        let durations: Vec<_> = sub_problems
            .iter()
            .map(|sub_problem| sub_problem.configuration().resolution.duration)
            .collect();
        assert_eq!(
            durations,
            vec![
                Some(SignedDuration::from_secs(75)),
                Some(SignedDuration::from_secs(25)),
                Some(SignedDuration::from_secs(100)),
            ]
        );
        assert!(sub_problems[2].missions().is_empty());
        assert_eq!(sub_problems[2].vehicles()[0].id(), "v2");
    }

    #[test]
    fn test_guards_keep_single_problem() {
        let single_vehicle = create_line_problem(3, 1);
        assert_eq!(split_independent_problem(single_vehicle).len(), 1);

        let no_skills = create_line_problem(3, 2);
        assert_eq!(split_independent_problem(no_skills).len(), 1);
    }

    #[test]
    fn test_filtered_solver_priority() {
        let profile = Profile {
            allowed_solvers: vec![SolverKind::Ortools, SolverKind::Vroom, SolverKind::Pyvrp],
            ..Profile::default()
        };
        let with_priority = |priority: Vec<SolverKind>| {
            let mut builder = ProblemBuilder::default();
            let mut configuration = Configuration::default();
            configuration.resolution.solver_priority = priority;
            builder.set_configuration(configuration);
            builder.build()
        };

        assert_eq!(
            filtered_solver_priority(&with_priority(vec![]), &profile),
            vec![SolverKind::Ortools, SolverKind::Vroom, SolverKind::Pyvrp]
        );
        assert_eq!(
            filtered_solver_priority(
                &with_priority(vec![SolverKind::Pyvrp, SolverKind::Ortools]),
                &profile
            ),
            vec![SolverKind::Pyvrp, SolverKind::Ortools]
        );
        assert_eq!(
            filtered_solver_priority(
                &with_priority(vec![SolverKind::Vroom, SolverKind::Demo]),
                &profile
            ),
            vec![SolverKind::Vroom]
        );
        assert!(
            filtered_solver_priority(&with_priority(vec![SolverKind::Demo]), &profile).is_empty()
        );
    }
}
