use serde::{Deserialize, Serialize};

use crate::define_index_newtype;

use super::{
    activity::Activity,
    skill::{Skill, SkillSet},
};

define_index_newtype!(MissionIdx, Mission);

pub const DEFAULT_PRIORITY: u8 = 4;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Quantity {
    unit_id: String,
    value: f64,
}

impl Quantity {
    pub fn new(unit_id: impl Into<String>, value: f64) -> Self {
        Quantity {
            unit_id: unit_id.into(),
            value,
        }
    }

    pub fn unit_id(&self) -> &str {
        &self.unit_id
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Mission {
    id: String,
    activity: Option<Activity>,
    /// Alternative activities, one of which is performed
    activities: Vec<Activity>,
    quantities: Vec<Quantity>,
    skills: SkillSet,
    priority: u8,
}

impl Mission {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn activity(&self) -> Option<&Activity> {
        self.activity.as_ref()
    }

    pub fn activity_mut(&mut self) -> Option<&mut Activity> {
        self.activity.as_mut()
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// The fixed activity, or the first alternative
    pub fn main_activity(&self) -> Option<&Activity> {
        self.activity.as_ref().or_else(|| self.activities.first())
    }

    pub fn quantities(&self) -> &[Quantity] {
        &self.quantities
    }

    pub fn has_nonzero_quantity(&self) -> bool {
        self.quantities.iter().any(|quantity| quantity.value != 0.0)
    }

    pub fn skills(&self) -> &SkillSet {
        &self.skills
    }

    pub fn add_skill(&mut self, skill: Skill) {
        self.skills.insert(skill);
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: u8) {
        self.priority = priority;
    }

    pub fn has_time_windows(&self) -> bool {
        self.activity
            .iter()
            .chain(self.activities.iter())
            .any(|activity| !activity.time_windows().is_empty())
    }

    pub fn time_window_day_indices(&self) -> impl Iterator<Item = i64> + '_ {
        self.activity
            .iter()
            .chain(self.activities.iter())
            .flat_map(|activity| activity.time_windows())
            .filter_map(|time_window| time_window.day_index())
    }
}

pub struct MissionBuilder {
    id: String,
    activity: Option<Activity>,
    activities: Vec<Activity>,
    quantities: Vec<Quantity>,
    skills: SkillSet,
    priority: Option<u8>,
}

impl MissionBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        MissionBuilder {
            id: id.into(),
            activity: None,
            activities: Vec::new(),
            quantities: Vec::new(),
            skills: SkillSet::default(),
            priority: None,
        }
    }

    pub fn set_activity(&mut self, activity: Activity) -> &mut MissionBuilder {
        self.activity = Some(activity);
        self
    }

    pub fn add_alternative_activity(&mut self, activity: Activity) -> &mut MissionBuilder {
        self.activities.push(activity);
        self
    }

    pub fn add_quantity(&mut self, quantity: Quantity) -> &mut MissionBuilder {
        self.quantities.push(quantity);
        self
    }

    pub fn set_skills(&mut self, skills: SkillSet) -> &mut MissionBuilder {
        self.skills = skills;
        self
    }

    pub fn set_priority(&mut self, priority: u8) -> &mut MissionBuilder {
        self.priority = Some(priority);
        self
    }

    pub fn build(self) -> Mission {
        Mission {
            id: self.id,
            activity: self.activity,
            activities: self.activities,
            quantities: self.quantities,
            skills: self.skills,
            priority: self.priority.unwrap_or(DEFAULT_PRIORITY),
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use super::*;
    use crate::problem::time_window::TimeWindow;

    #[test]
    fn test_builder_defaults() {
        let mission = MissionBuilder::new("m1").build();

        assert_eq!(mission.id(), "m1");
        assert_eq!(mission.priority(), DEFAULT_PRIORITY);
        assert!(mission.skills().is_empty());
        assert!(mission.main_activity().is_none());
    }

    #[test]
    fn test_has_time_windows() {
        let mut builder = MissionBuilder::new("m1");
        builder.add_alternative_activity(
            Activity::new(None, SignedDuration::ZERO)
                .with_time_window(TimeWindow::new(SignedDuration::ZERO, None)),
        );
        let mission = builder.build();

        assert!(mission.has_time_windows());
        assert!(mission.activity().is_none());
        assert!(mission.main_activity().is_some());
    }
}
