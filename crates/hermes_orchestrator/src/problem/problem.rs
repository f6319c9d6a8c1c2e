use fxhash::FxHashSet;
use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use super::{
    configuration::Configuration,
    location::Point,
    matrix::TravelMatrix,
    mission::{Mission, MissionIdx},
    relation::Relation,
    vehicle::{Vehicle, VehicleIdx},
    zone::Zone,
};

/// A route imposed before solving, as an ordered list of mission ids
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct InitialRoute {
    pub vehicle_id: String,
    pub mission_ids: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Problem {
    name: Option<String>,
    missions: Vec<Mission>,
    vehicles: Vec<Vehicle>,
    matrices: Vec<TravelMatrix>,
    relations: Vec<Relation>,
    zones: Vec<Zone>,
    routes: Vec<InitialRoute>,
    configuration: Configuration,
}

/// Fields replaced when deriving a sub-problem, everything else is copied
#[derive(Default)]
pub struct ProblemOverrides {
    pub missions: Option<Vec<Mission>>,
    pub vehicles: Option<Vec<Vehicle>>,
    pub relations: Option<Vec<Relation>>,
    pub routes: Option<Vec<InitialRoute>>,
    pub resolution_duration: Option<Option<SignedDuration>>,
    pub cluster_threshold: Option<Option<f64>>,
    pub repetition: Option<Option<usize>>,
}

impl Problem {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    pub fn missions_mut(&mut self) -> &mut Vec<Mission> {
        &mut self.missions
    }

    pub fn mission(&self, id: &str) -> Option<&Mission> {
        self.missions.iter().find(|mission| mission.id() == id)
    }

    /// Number of visits a complete solution accounts for
    pub fn visits(&self) -> usize {
        self.missions.len()
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicles_mut(&mut self) -> &mut Vec<Vehicle> {
        &mut self.vehicles
    }

    pub fn vehicle(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|vehicle| vehicle.id() == id)
    }

    pub fn matrices(&self) -> &[TravelMatrix] {
        &self.matrices
    }

    /// The matrix a vehicle routes with, falling back to the first one
    pub fn matrix_for(&self, vehicle: &Vehicle) -> Option<&TravelMatrix> {
        self.matrices
            .iter()
            .find(|matrix| matrix.id() == vehicle.matrix_id())
            .or_else(|| self.matrices.first())
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn relations_mut(&mut self) -> &mut Vec<Relation> {
        &mut self.relations
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn routes(&self) -> &[InitialRoute] {
        &self.routes
    }

    pub fn routes_mut(&mut self) -> &mut Vec<InitialRoute> {
        &mut self.routes
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn configuration_mut(&mut self) -> &mut Configuration {
        &mut self.configuration
    }

    pub fn is_periodic(&self) -> bool {
        self.configuration.schedule.is_some()
    }

    pub fn has_rests(&self) -> bool {
        self.vehicles.iter().any(|vehicle| !vehicle.rests().is_empty())
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.missions
            .iter()
            .flat_map(|mission| mission.activity().into_iter().chain(mission.activities()))
            .filter_map(|activity| activity.point())
            .chain(
                self.vehicles
                    .iter()
                    .flat_map(|vehicle| vehicle.start_point().into_iter().chain(vehicle.end_point())),
            )
    }

    pub fn all_points_located(&self) -> bool {
        self.points().all(|point| point.location().is_some())
    }

    /// Copies the problem restricted to the given missions and vehicles.
    /// Relations and initial routes are filtered down to what remains.
    pub fn sub_problem_from_mission_subset(
        &self,
        mission_indices: &[MissionIdx],
        vehicle_indices: &[VehicleIdx],
    ) -> Problem {
        let missions: Vec<Mission> = mission_indices
            .iter()
            .map(|&index| self.missions[index].clone())
            .collect();
        let vehicles: Vec<Vehicle> = vehicle_indices
            .iter()
            .map(|&index| self.vehicles[index].clone())
            .collect();

        let mission_ids: FxHashSet<&str> = missions.iter().map(|mission| mission.id()).collect();
        let vehicle_ids: FxHashSet<&str> = vehicles.iter().map(|vehicle| vehicle.id()).collect();

        let relations = self
            .relations
            .iter()
            .filter_map(|relation| {
                let linked_ids: Vec<String> = relation
                    .linked_ids()
                    .iter()
                    .filter(|id| mission_ids.contains(id.as_str()))
                    .cloned()
                    .collect();
                let linked_vehicle_ids: Vec<String> = relation
                    .linked_vehicle_ids()
                    .iter()
                    .filter(|id| vehicle_ids.contains(id.as_str()))
                    .cloned()
                    .collect();

                let missions_lost = !relation.linked_ids().is_empty() && linked_ids.is_empty();
                let vehicles_lost =
                    !relation.linked_vehicle_ids().is_empty() && linked_vehicle_ids.is_empty();
                if missions_lost || vehicles_lost {
                    return None;
                }

                let mut sub_relation = Relation::new(relation.relation_type(), linked_ids)
                    .with_linked_vehicle_ids(linked_vehicle_ids);
                if let Some(lapse) = relation.lapse() {
                    sub_relation = sub_relation.with_lapse(lapse);
                }
                Some(sub_relation)
            })
            .collect();

        let routes = self
            .routes
            .iter()
            .filter(|route| vehicle_ids.contains(route.vehicle_id.as_str()))
            .map(|route| InitialRoute {
                vehicle_id: route.vehicle_id.clone(),
                mission_ids: route
                    .mission_ids
                    .iter()
                    .filter(|id| mission_ids.contains(id.as_str()))
                    .cloned()
                    .collect(),
            })
            .collect();

        Problem {
            name: self.name.clone(),
            missions,
            vehicles,
            matrices: self.matrices.clone(),
            relations,
            zones: self.zones.clone(),
            routes,
            configuration: self.configuration.clone(),
        }
    }

    pub fn sub_problem_with_overrides(&self, overrides: ProblemOverrides) -> Problem {
        let mut configuration = self.configuration.clone();
        if let Some(duration) = overrides.resolution_duration {
            configuration.resolution.duration = duration;
        }
        if let Some(threshold) = overrides.cluster_threshold {
            configuration.preprocessing.cluster_threshold = threshold;
        }
        if let Some(repetition) = overrides.repetition {
            configuration.resolution.repetition = repetition;
        }

        Problem {
            name: self.name.clone(),
            missions: overrides.missions.unwrap_or_else(|| self.missions.clone()),
            vehicles: overrides.vehicles.unwrap_or_else(|| self.vehicles.clone()),
            matrices: self.matrices.clone(),
            relations: overrides.relations.unwrap_or_else(|| self.relations.clone()),
            zones: self.zones.clone(),
            routes: overrides.routes.unwrap_or_else(|| self.routes.clone()),
            configuration,
        }
    }
}

#[derive(Default)]
pub struct ProblemBuilder {
    name: Option<String>,
    missions: Vec<Mission>,
    vehicles: Vec<Vehicle>,
    matrices: Vec<TravelMatrix>,
    relations: Vec<Relation>,
    zones: Vec<Zone>,
    routes: Vec<InitialRoute>,
    configuration: Configuration,
}

impl ProblemBuilder {
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut ProblemBuilder {
        self.name = Some(name.into());
        self
    }

    pub fn set_missions(&mut self, missions: Vec<Mission>) -> &mut ProblemBuilder {
        self.missions = missions;
        self
    }

    pub fn add_mission(&mut self, mission: Mission) -> &mut ProblemBuilder {
        self.missions.push(mission);
        self
    }

    pub fn set_vehicles(&mut self, vehicles: Vec<Vehicle>) -> &mut ProblemBuilder {
        self.vehicles = vehicles;
        self
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> &mut ProblemBuilder {
        self.vehicles.push(vehicle);
        self
    }

    pub fn add_matrix(&mut self, matrix: TravelMatrix) -> &mut ProblemBuilder {
        self.matrices.push(matrix);
        self
    }

    pub fn add_relation(&mut self, relation: Relation) -> &mut ProblemBuilder {
        self.relations.push(relation);
        self
    }

    pub fn add_zone(&mut self, zone: Zone) -> &mut ProblemBuilder {
        self.zones.push(zone);
        self
    }

    pub fn add_route(&mut self, route: InitialRoute) -> &mut ProblemBuilder {
        self.routes.push(route);
        self
    }

    pub fn set_configuration(&mut self, configuration: Configuration) -> &mut ProblemBuilder {
        self.configuration = configuration;
        self
    }

    pub fn build(self) -> Problem {
        Problem {
            name: self.name,
            missions: self.missions,
            vehicles: self.vehicles,
            matrices: self.matrices,
            relations: self.relations,
            zones: self.zones,
            routes: self.routes,
            configuration: self.configuration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        problem::relation::RelationType,
        test_utils::{create_line_problem, create_mission, create_vehicle},
    };

    #[test]
    fn test_sub_problem_filters_relations_and_routes() {
        let mut builder = ProblemBuilder::default();
        builder
            .set_missions((0..4).map(|i| create_mission(i, &[])).collect())
            .set_vehicles(vec![create_vehicle("v0", &[]), create_vehicle("v1", &[])])
            .add_relation(Relation::new(
                RelationType::SameRoute,
                vec![String::from("m0"), String::from("m3")],
            ))
            .add_relation(Relation::new(
                RelationType::Sequence,
                vec![String::from("m2"), String::from("m3")],
            ))
            .add_relation(Relation::on_vehicles(
                RelationType::VehicleTrips,
                vec![String::from("v1")],
            ))
            .add_route(InitialRoute {
                vehicle_id: String::from("v0"),
                mission_ids: vec![String::from("m0"), String::from("m2")],
            });
        let problem = builder.build();

        let sub_problem = problem.sub_problem_from_mission_subset(
            &[MissionIdx::new(0), MissionIdx::new(1)],
            &[VehicleIdx::new(0)],
        );

        assert_eq!(sub_problem.missions().len(), 2);
        assert_eq!(sub_problem.vehicles().len(), 1);
        assert_eq!(sub_problem.relations().len(), 1);
        assert_eq!(sub_problem.relations()[0].linked_ids(), &[String::from("m0")]);
        assert_eq!(sub_problem.routes()[0].mission_ids, vec![String::from("m0")]);
    }

    #[test]
    fn test_overrides() {
        let problem = create_line_problem(3, 1);
        let sub_problem = problem.sub_problem_with_overrides(ProblemOverrides {
            missions: Some(vec![]),
            resolution_duration: Some(Some(SignedDuration::from_secs(10))),
            ..Default::default()
        });

        assert!(sub_problem.missions().is_empty());
        assert_eq!(sub_problem.vehicles().len(), 1);
        assert_eq!(
            sub_problem.configuration().resolution.duration,
            Some(SignedDuration::from_secs(10))
        );
        assert_eq!(problem.missions().len(), 3);
    }
}
