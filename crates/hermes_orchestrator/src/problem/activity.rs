use jiff::SignedDuration;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{location::Point, time_window::TimeWindow};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Activity {
    point: Option<Point>,
    duration: SignedDuration,
    setup_duration: SignedDuration,
    time_windows: SmallVec<[TimeWindow; 1]>,
}

impl Activity {
    pub fn new(point: Option<Point>, duration: SignedDuration) -> Self {
        Activity {
            point,
            duration,
            ..Default::default()
        }
    }

    pub fn with_setup_duration(mut self, setup_duration: SignedDuration) -> Self {
        self.setup_duration = setup_duration;
        self
    }

    pub fn with_time_window(mut self, time_window: TimeWindow) -> Self {
        self.time_windows.push(time_window);
        self
    }

    pub fn point(&self) -> Option<&Point> {
        self.point.as_ref()
    }

    pub fn point_id(&self) -> Option<&str> {
        self.point.as_ref().map(|point| point.id())
    }

    pub fn matrix_index(&self) -> Option<usize> {
        self.point.as_ref().and_then(|point| point.matrix_index())
    }

    pub fn duration(&self) -> SignedDuration {
        self.duration
    }

    pub fn set_duration(&mut self, duration: SignedDuration) {
        self.duration = duration;
    }

    pub fn setup_duration(&self) -> SignedDuration {
        self.setup_duration
    }

    pub fn time_windows(&self) -> &[TimeWindow] {
        &self.time_windows
    }
}
