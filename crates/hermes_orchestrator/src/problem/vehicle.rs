use hermes_router::{RouterDimension, RouterOptions};
use jiff::SignedDuration;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::define_index_newtype;

use super::{
    activity::Activity,
    location::Point,
    skill::{Skill, SkillSet},
    time_window::TimeWindow,
};

define_index_newtype!(VehicleIdx, Vehicle);

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Capacity {
    unit_id: String,
    limit: Option<f64>,
}

impl Capacity {
    pub fn new(unit_id: impl Into<String>, limit: Option<f64>) -> Self {
        Capacity {
            unit_id: unit_id.into(),
            limit,
        }
    }

    pub fn unit_id(&self) -> &str {
        &self.unit_id
    }

    pub fn limit(&self) -> Option<f64> {
        self.limit
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Rest {
    id: String,
    duration: SignedDuration,
    time_windows: Vec<TimeWindow>,
}

impl Rest {
    pub fn new(id: impl Into<String>, duration: SignedDuration, time_windows: Vec<TimeWindow>) -> Self {
        Rest {
            id: id.into(),
            duration,
            time_windows,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn duration(&self) -> SignedDuration {
        self.duration
    }

    pub fn time_windows(&self) -> &[TimeWindow] {
        &self.time_windows
    }

    pub fn activity(&self) -> Activity {
        self.time_windows.iter().fold(
            Activity::new(None, self.duration),
            |activity, time_window| activity.with_time_window(time_window.clone()),
        )
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Vehicle {
    id: String,
    /// Alternatives, any one of them may serve a mission
    skills: SmallVec<[SkillSet; 1]>,
    capacities: Vec<Capacity>,
    rests: Vec<Rest>,
    duration: Option<SignedDuration>,
    start_point: Option<Point>,
    end_point: Option<Point>,
    matrix_id: String,
    router_mode: String,
    router_dimension: RouterDimension,
    router_options: RouterOptions,
    time_window: Option<TimeWindow>,
    global_day_index: Option<i64>,
    coef_service: f64,
    additional_service: SignedDuration,
    coef_setup: f64,
    additional_setup: SignedDuration,
}

impl Vehicle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn skills(&self) -> &[SkillSet] {
        &self.skills
    }

    pub fn add_skill_to_alternatives(&mut self, skill: &Skill) {
        for alternative in self.skills.iter_mut() {
            alternative.insert(skill.clone());
        }
    }

    pub fn can_serve(&self, required: &SkillSet) -> bool {
        self.skills
            .iter()
            .any(|alternative| required.is_satisfied_by(alternative))
    }

    pub fn capacities(&self) -> &[Capacity] {
        &self.capacities
    }

    pub fn rests(&self) -> &[Rest] {
        &self.rests
    }

    pub fn duration(&self) -> Option<SignedDuration> {
        self.duration
    }

    pub fn set_duration(&mut self, duration: SignedDuration) {
        self.duration = Some(duration);
    }

    pub fn start_point(&self) -> Option<&Point> {
        self.start_point.as_ref()
    }

    pub fn end_point(&self) -> Option<&Point> {
        self.end_point.as_ref()
    }

    pub fn matrix_id(&self) -> &str {
        &self.matrix_id
    }

    pub fn router_mode(&self) -> &str {
        &self.router_mode
    }

    pub fn router_dimension(&self) -> RouterDimension {
        self.router_dimension
    }

    pub fn router_options(&self) -> &RouterOptions {
        &self.router_options
    }

    pub fn time_window(&self) -> Option<&TimeWindow> {
        self.time_window.as_ref()
    }

    pub fn global_day_index(&self) -> Option<i64> {
        self.global_day_index
    }

    /// A copy travelling between two anchors from `begin`, free of rests, capacities and budget
    pub fn anchored(
        &self,
        start_point: Option<Point>,
        end_point: Option<Point>,
        begin: Option<SignedDuration>,
    ) -> Vehicle {
        Vehicle {
            start_point,
            end_point,
            time_window: begin.map(|begin| TimeWindow::new(begin, None)),
            rests: Vec::new(),
            capacities: Vec::new(),
            duration: None,
            ..self.clone()
        }
    }

    pub fn duration_on(&self, activity: &Activity) -> SignedDuration {
        activity.duration().mul_f64(self.coef_service) + self.additional_service
    }

    pub fn setup_duration_on(&self, activity: &Activity) -> SignedDuration {
        if activity.setup_duration().is_positive() {
            activity.setup_duration().mul_f64(self.coef_setup) + self.additional_setup
        } else {
            SignedDuration::ZERO
        }
    }
}

pub struct VehicleBuilder {
    id: String,
    skills: SmallVec<[SkillSet; 1]>,
    capacities: Vec<Capacity>,
    rests: Vec<Rest>,
    duration: Option<SignedDuration>,
    start_point: Option<Point>,
    end_point: Option<Point>,
    matrix_id: Option<String>,
    router_mode: Option<String>,
    router_dimension: RouterDimension,
    router_options: RouterOptions,
    time_window: Option<TimeWindow>,
    global_day_index: Option<i64>,
    coef_service: f64,
    additional_service: SignedDuration,
    coef_setup: f64,
    additional_setup: SignedDuration,
}

impl VehicleBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        VehicleBuilder {
            id: id.into(),
            skills: SmallVec::new(),
            capacities: Vec::new(),
            rests: Vec::new(),
            duration: None,
            start_point: None,
            end_point: None,
            matrix_id: None,
            router_mode: None,
            router_dimension: RouterDimension::Time,
            router_options: RouterOptions::default(),
            time_window: None,
            global_day_index: None,
            coef_service: 1.0,
            additional_service: SignedDuration::ZERO,
            coef_setup: 1.0,
            additional_setup: SignedDuration::ZERO,
        }
    }

    pub fn add_skills(&mut self, skills: SkillSet) -> &mut VehicleBuilder {
        self.skills.push(skills);
        self
    }

    pub fn add_capacity(&mut self, capacity: Capacity) -> &mut VehicleBuilder {
        self.capacities.push(capacity);
        self
    }

    pub fn add_rest(&mut self, rest: Rest) -> &mut VehicleBuilder {
        self.rests.push(rest);
        self
    }

    pub fn set_duration(&mut self, duration: SignedDuration) -> &mut VehicleBuilder {
        self.duration = Some(duration);
        self
    }

    pub fn set_start_point(&mut self, point: Point) -> &mut VehicleBuilder {
        self.start_point = Some(point);
        self
    }

    pub fn set_end_point(&mut self, point: Point) -> &mut VehicleBuilder {
        self.end_point = Some(point);
        self
    }

    pub fn set_matrix_id(&mut self, matrix_id: impl Into<String>) -> &mut VehicleBuilder {
        self.matrix_id = Some(matrix_id.into());
        self
    }

    pub fn set_router_mode(&mut self, router_mode: impl Into<String>) -> &mut VehicleBuilder {
        self.router_mode = Some(router_mode.into());
        self
    }

    pub fn set_router_dimension(&mut self, dimension: RouterDimension) -> &mut VehicleBuilder {
        self.router_dimension = dimension;
        self
    }

    pub fn set_router_options(&mut self, options: RouterOptions) -> &mut VehicleBuilder {
        self.router_options = options;
        self
    }

    pub fn set_time_window(&mut self, time_window: TimeWindow) -> &mut VehicleBuilder {
        self.time_window = Some(time_window);
        self
    }

    pub fn set_global_day_index(&mut self, global_day_index: i64) -> &mut VehicleBuilder {
        self.global_day_index = Some(global_day_index);
        self
    }

    pub fn set_service_modifiers(&mut self, coef: f64, additional: SignedDuration) -> &mut VehicleBuilder {
        self.coef_service = coef;
        self.additional_service = additional;
        self
    }

    pub fn set_setup_modifiers(&mut self, coef: f64, additional: SignedDuration) -> &mut VehicleBuilder {
        self.coef_setup = coef;
        self.additional_setup = additional;
        self
    }

    pub fn build(self) -> Vehicle {
        let skills = if self.skills.is_empty() {
            smallvec![SkillSet::default()]
        } else {
            self.skills
        };

        Vehicle {
            id: self.id,
            skills,
            capacities: self.capacities,
            rests: self.rests,
            duration: self.duration,
            start_point: self.start_point,
            end_point: self.end_point,
            matrix_id: self.matrix_id.unwrap_or_else(|| String::from("m1")),
            router_mode: self.router_mode.unwrap_or_else(|| String::from("car")),
            router_dimension: self.router_dimension,
            router_options: self.router_options,
            time_window: self.time_window,
            global_day_index: self.global_day_index,
            coef_service: self.coef_service,
            additional_service: self.additional_service,
            coef_setup: self.coef_setup,
            additional_setup: self.additional_setup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_without_skills_serves_plain_missions() {
        let vehicle = VehicleBuilder::new("v1").build();

        assert_eq!(vehicle.skills().len(), 1);
        assert!(vehicle.can_serve(&SkillSet::default()));
        assert!(!vehicle.can_serve(&SkillSet::new(["frozen"])));
    }

    #[test]
    fn test_builder_keeps_global_day_index() {
        let mut builder = VehicleBuilder::new("v1");
        builder.set_global_day_index(9);

        assert_eq!(builder.build().global_day_index(), Some(9));
        assert_eq!(VehicleBuilder::new("v2").build().global_day_index(), None);
    }

    #[test]
    fn test_alternative_skills() {
        let mut builder = VehicleBuilder::new("v1");
        builder
            .add_skills(SkillSet::new(["frozen"]))
            .add_skills(SkillSet::new(["heavy", "tail_lift"]));
        let mut vehicle = builder.build();

        assert!(vehicle.can_serve(&SkillSet::new(["heavy"])));
        assert!(!vehicle.can_serve(&SkillSet::new(["heavy", "frozen"])));

        vehicle.add_skill_to_alternatives(&Skill::new("zone_a"));
        assert!(vehicle.can_serve(&SkillSet::new(["frozen", "zone_a"])));
        assert!(vehicle.can_serve(&SkillSet::new(["heavy", "zone_a"])));
    }

    #[test]
    fn test_duration_modifiers() {
        let mut builder = VehicleBuilder::new("v1");
        builder
            .set_service_modifiers(2.0, SignedDuration::from_secs(10))
            .set_setup_modifiers(0.5, SignedDuration::from_secs(5));
        let vehicle = builder.build();

        let activity = Activity::new(None, SignedDuration::from_secs(60))
            .with_setup_duration(SignedDuration::from_secs(20));
        assert_eq!(vehicle.duration_on(&activity), SignedDuration::from_secs(130));
        assert_eq!(vehicle.setup_duration_on(&activity), SignedDuration::from_secs(15));

        let no_setup = Activity::new(None, SignedDuration::ZERO);
        assert_eq!(vehicle.setup_duration_on(&no_setup), SignedDuration::ZERO);
    }
}
