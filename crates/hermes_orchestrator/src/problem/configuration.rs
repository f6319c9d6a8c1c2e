use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::solver::SolverKind;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Configuration {
    pub preprocessing: Preprocessing,
    pub resolution: Resolution,
    pub restitution: Restitution,
    /// Present only for periodic problems
    pub schedule: Option<Schedule>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PartitionEntity {
    Vehicle,
    WorkDay,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Partition {
    pub entity: PartitionEntity,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Preprocessing {
    /// Maximum distance between two missions merged by zip clustering
    pub cluster_threshold: Option<f64>,
    pub partitions: Vec<Partition>,
    pub first_solution_strategy: Vec<String>,
}

impl Preprocessing {
    pub fn uses_periodic_heuristic(&self) -> bool {
        self.first_solution_strategy
            .iter()
            .any(|strategy| strategy == "periodic")
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Resolution {
    pub solver_priority: Vec<SolverKind>,
    pub repetition: Option<usize>,
    pub duration: Option<SignedDuration>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    Polylines,
    EncodedPolylines,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Restitution {
    pub geometry: Vec<GeometryKind>,
}

impl Restitution {
    pub fn wants_polylines(&self) -> bool {
        !self.geometry.is_empty()
    }

    pub fn wants_encoded_polylines(&self) -> bool {
        self.geometry.contains(&GeometryKind::EncodedPolylines)
    }
}

/// Inclusive day indices covered by a periodic problem
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub start_index: i64,
    pub end_index: i64,
}
