use hermes_router::RouterDimension;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Time,
    Distance,
    Value,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Time, Dimension::Distance, Dimension::Value];
}

impl From<RouterDimension> for Dimension {
    fn from(dimension: RouterDimension) -> Self {
        match dimension {
            RouterDimension::Time => Dimension::Time,
            RouterDimension::Distance => Dimension::Distance,
        }
    }
}

/// Square travel matrices stored as flat vectors.
/// Times are seconds, distances meters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TravelMatrix {
    id: String,
    size: usize,
    time: Option<Vec<f64>>,
    distance: Option<Vec<f64>>,
    value: Option<Vec<f64>>,
}

impl TravelMatrix {
    pub fn new(
        id: impl Into<String>,
        time: Option<Vec<Vec<f64>>>,
        distance: Option<Vec<Vec<f64>>>,
        value: Option<Vec<Vec<f64>>>,
    ) -> Self {
        let size = time
            .as_ref()
            .or(distance.as_ref())
            .or(value.as_ref())
            .map_or(0, |rows| rows.len());

        TravelMatrix {
            id: id.into(),
            size,
            time: time.map(|rows| rows.into_iter().flatten().collect()),
            distance: distance.map(|rows| rows.into_iter().flatten().collect()),
            value: value.map(|rows| rows.into_iter().flatten().collect()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn values(&self, dimension: Dimension) -> Option<&Vec<f64>> {
        match dimension {
            Dimension::Time => self.time.as_ref(),
            Dimension::Distance => self.distance.as_ref(),
            Dimension::Value => self.value.as_ref(),
        }
    }

    pub fn has(&self, dimension: Dimension) -> bool {
        self.values(dimension).is_some_and(|values| !values.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        Dimension::ALL.iter().all(|dimension| !self.has(*dimension))
    }

    pub fn get(&self, dimension: Dimension, from: usize, to: usize) -> Option<f64> {
        if from >= self.size || to >= self.size {
            return None;
        }
        self.values(dimension)
            .and_then(|values| values.get(from * self.size + to))
            .copied()
    }
}
