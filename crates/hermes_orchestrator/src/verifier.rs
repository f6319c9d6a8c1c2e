use jiff::SignedDuration;
use thiserror::Error;
use tracing::warn;

use crate::solution::{Solution, route::Route};

#[derive(Debug, Error, PartialEq)]
pub enum ConsistencyError {
    #[error("Negative waiting time on vehicle {vehicle_id}")]
    NegativeWaitingTime { vehicle_id: String },

    #[error("Wrong number of visits returned in result: expected {expected}, got {assigned} assigned and {unassigned} unassigned")]
    WrongVisitCount {
        expected: usize,
        assigned: usize,
        unassigned: usize,
    },
}

/// Sum of travel, waiting, setup and service on a route
fn recomputed_total_time(route: &Route) -> SignedDuration {
    route.stops.iter().fold(SignedDuration::ZERO, |total, stop| {
        total
            + stop.info.travel_time.unwrap_or(SignedDuration::ZERO)
            + stop.info.waiting_time.unwrap_or(SignedDuration::ZERO)
            + stop.info.setup_time.unwrap_or(SignedDuration::ZERO)
            + (stop.info.departure_time - stop.info.begin_time)
    })
}

/// Checks the solutions of one request, `expected` missions must all come back.
/// Outside production a negative waiting time is an error, total time mismatches only warn.
pub fn check_consistency(
    expected: usize,
    solutions: &[Solution],
    production: bool,
) -> Result<(), ConsistencyError> {
    for route in solutions.iter().flat_map(|solution| solution.routes.iter()) {
        if route
            .stops
            .iter()
            .any(|stop| stop.info.waiting_time.is_some_and(|waiting| waiting.is_negative()))
        {
            warn!(vehicle = %route.vehicle_id, "Negative waiting time");
            if !production {
                return Err(ConsistencyError::NegativeWaitingTime {
                    vehicle_id: route.vehicle_id.clone(),
                });
            }
        }

        if let Some(total_time) = route.info.total_time
            && route.count_missions() > 0
        {
            let recomputed = recomputed_total_time(route);
            if recomputed != total_time {
                warn!(
                    vehicle = %route.vehicle_id,
                    total_time = ?total_time,
                    recomputed = ?recomputed,
                    "Route total time does not match its components"
                );
            }
        }
    }

    let assigned: usize = solutions.iter().map(Solution::count_assigned_missions).sum();
    let unassigned: usize = solutions.iter().map(Solution::count_unassigned_missions).sum();
    if assigned + unassigned != expected {
        warn!(expected, assigned, unassigned, "Wrong number of visits returned in result");
        return Err(ConsistencyError::WrongVisitCount {
            expected,
            assigned,
            unassigned,
        });
    }

    Ok(())
}
