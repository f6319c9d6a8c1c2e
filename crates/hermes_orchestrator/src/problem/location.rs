use geo::{Distance, Haversine};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Location {
    point: geo::Point,
}

impl Location {
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self {
            point: geo::Point::new(lon, lat),
        }
    }

    pub fn lon(&self) -> f64 {
        self.point.x()
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    pub fn haversine_distance(&self, to: &Location) -> f64 {
        Haversine.distance(self.point, to.point)
    }
}

impl From<&Location> for geo::Point<f64> {
    fn from(location: &Location) -> Self {
        location.point
    }
}

impl From<Location> for geo::Point<f64> {
    fn from(location: Location) -> Self {
        location.point
    }
}

/// A place referenced by activities and vehicle depots
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Point {
    id: String,
    matrix_index: Option<usize>,
    location: Option<Location>,
}

impl Point {
    pub fn new(id: impl Into<String>, matrix_index: Option<usize>, location: Option<Location>) -> Self {
        Point {
            id: id.into(),
            matrix_index,
            location,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn matrix_index(&self) -> Option<usize> {
        self.matrix_index
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }
}
