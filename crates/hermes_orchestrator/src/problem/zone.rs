use geo::Contains;
use serde::{Deserialize, Serialize};

use super::location::Location;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Zone {
    id: String,
    polygon: geo::Polygon,
    /// Each allocation is a set of vehicles expected to serve the zone together
    allocations: Vec<Vec<String>>,
}

impl Zone {
    pub fn new(id: impl Into<String>, polygon: geo::Polygon, allocations: Vec<Vec<String>>) -> Self {
        Zone {
            id: id.into(),
            polygon,
            allocations,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn allocations(&self) -> &[Vec<String>] {
        &self.allocations
    }

    pub fn allocated_vehicle_ids(&self) -> impl Iterator<Item = &String> {
        self.allocations.iter().flatten()
    }

    pub fn contains(&self, location: &Location) -> bool {
        self.polygon.contains(&geo::Point::from(location))
    }
}
