use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::{
    problem::{
        activity::Activity, location::Point, matrix::Dimension, mission::Mission, vehicle::Rest,
    },
    utils::time::seconds,
};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StopKind {
    Mission { mission_id: String },
    Rest { rest_id: String },
    Depot,
}

/// Figures attached to a stop, travel figures describe the leg reaching it
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct StopInfo {
    pub travel_time: Option<SignedDuration>,
    pub travel_distance: Option<f64>,
    pub travel_value: Option<f64>,
    pub setup_time: Option<SignedDuration>,
    pub waiting_time: Option<SignedDuration>,
    pub begin_time: SignedDuration,
    pub end_time: Option<SignedDuration>,
    pub departure_time: SignedDuration,
    pub current_distance: f64,
    pub day_week_num: Option<String>,
    pub day_week: Option<String>,
}

impl StopInfo {
    /// Travel time is expressed in seconds
    pub fn travel(&self, dimension: Dimension) -> Option<f64> {
        match dimension {
            Dimension::Time => self.travel_time.map(|time| time.as_secs_f64()),
            Dimension::Distance => self.travel_distance,
            Dimension::Value => self.travel_value,
        }
    }

    pub fn set_travel(&mut self, dimension: Dimension, value: f64) {
        match dimension {
            Dimension::Time => self.travel_time = Some(seconds(value)),
            Dimension::Distance => self.travel_distance = Some(value),
            Dimension::Value => self.travel_value = Some(value),
        }
    }

    pub fn clear_travel(&mut self) {
        self.travel_time = None;
        self.travel_distance = None;
        self.travel_value = None;
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Stop {
    pub kind: StopKind,
    pub activity: Activity,
    pub reason: Option<String>,
    pub info: StopInfo,
}

impl Stop {
    pub fn mission(mission: &Mission) -> Self {
        Stop {
            kind: StopKind::Mission {
                mission_id: mission.id().to_owned(),
            },
            activity: mission.main_activity().cloned().unwrap_or_default(),
            reason: None,
            info: StopInfo::default(),
        }
    }

    pub fn unassigned(mission: &Mission, reason: Option<&str>) -> Self {
        Stop {
            reason: reason.map(String::from),
            ..Stop::mission(mission)
        }
    }

    pub fn rest(rest: &Rest) -> Self {
        Stop {
            kind: StopKind::Rest {
                rest_id: rest.id().to_owned(),
            },
            activity: rest.activity(),
            reason: None,
            info: StopInfo::default(),
        }
    }

    pub fn depot(point: &Point) -> Self {
        Stop {
            kind: StopKind::Depot,
            activity: Activity::new(Some(point.clone()), SignedDuration::ZERO),
            reason: None,
            info: StopInfo::default(),
        }
    }

    pub fn with_info(mut self, info: StopInfo) -> Self {
        self.info = info;
        self
    }

    pub fn mission_id(&self) -> Option<&str> {
        match &self.kind {
            StopKind::Mission { mission_id } => Some(mission_id),
            _ => None,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self.kind, StopKind::Rest { .. })
    }

    pub fn point_id(&self) -> Option<&str> {
        self.activity.point_id()
    }

    pub fn has_location(&self) -> bool {
        self.activity
            .point()
            .is_some_and(|point| point.location().is_some())
    }
}
