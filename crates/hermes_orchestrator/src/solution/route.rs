use hermes_router::LegGeometry;
use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::problem::vehicle::Vehicle;

use super::stop::Stop;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct RouteInfo {
    pub start_time: Option<SignedDuration>,
    pub end_time: Option<SignedDuration>,
    pub total_time: Option<SignedDuration>,
    pub total_travel_time: Option<SignedDuration>,
    /// Meters from the matrix, kilometres when the router filled the legs
    pub total_distance: Option<f64>,
    pub total_travel_value: Option<f64>,
    pub total_waiting_time: Option<SignedDuration>,
    pub total_setup_time: Option<SignedDuration>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Route {
    pub vehicle_id: String,
    pub stops: Vec<Stop>,
    pub info: RouteInfo,
    pub geometry: Option<Vec<LegGeometry>>,
}

impl Route {
    pub fn new(vehicle_id: impl Into<String>, stops: Vec<Stop>) -> Self {
        Route {
            vehicle_id: vehicle_id.into(),
            stops,
            info: RouteInfo::default(),
            geometry: None,
        }
    }

    /// Depot stops only
    pub fn empty(vehicle: &Vehicle) -> Self {
        let stops = vehicle
            .start_point()
            .into_iter()
            .chain(vehicle.end_point())
            .map(Stop::depot)
            .collect();

        Route::new(vehicle.id(), stops)
    }

    pub fn count_missions(&self) -> usize {
        self.stops
            .iter()
            .filter(|stop| stop.mission_id().is_some())
            .count()
    }

    /// Delays every stop from `from_index` on. Waiting time absorbs a delay before it propagates.
    pub fn shift_route_times(&mut self, shift: SignedDuration, from_index: usize) {
        if shift.is_zero() {
            return;
        }

        let mut current_shift = shift;
        if from_index == 0 {
            self.info.start_time = self.info.start_time.map(|start| start + shift);
        }

        for stop in self.stops.iter_mut().skip(from_index) {
            if current_shift.is_positive()
                && let Some(waiting_time) = stop.info.waiting_time
                && waiting_time.is_positive()
            {
                let absorbed = waiting_time.min(current_shift);
                stop.info.waiting_time = Some(waiting_time - absorbed);
                current_shift -= absorbed;
            }

            stop.info.begin_time += current_shift;
            stop.info.end_time = stop.info.end_time.map(|end| end + current_shift);
            stop.info.departure_time += current_shift;
        }

        self.info.end_time = self.info.end_time.map(|end| end + current_shift);
    }
}
