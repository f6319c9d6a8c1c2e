use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouterDimension {
    #[default]
    Time,
    Distance,
}

impl Display for RouterDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RouterDimension::Time => "time",
                RouterDimension::Distance => "distance",
            }
        )
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct RouterOptions {
    pub speed_multiplier: Option<f64>,
    pub traffic: Option<bool>,
    pub toll: Option<bool>,
}

/// A leg between two locations, points are (lon, lat)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: geo_types::Point,
    pub to: geo_types::Point,
}

impl Segment {
    pub fn from_lat_lon(from_lat: f64, from_lon: f64, to_lat: f64, to_lon: f64) -> Self {
        Segment {
            from: geo_types::Point::new(from_lon, from_lat),
            to: geo_types::Point::new(to_lon, to_lat),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LegGeometry {
    Encoded(String),
    Feature(geojson::Feature),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RouteLeg {
    /// Distance in meters, routers returning kilometres must convert
    pub distance: Option<f64>,
    pub geometry: Option<LegGeometry>,
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Route info cannot be received")]
    NoRoute,

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid route geometry: {0}")]
    Geometry(String),

    #[error("Router answered with code {code}: {message}")]
    Api { code: String, message: String },
}

pub trait Router: Send + Sync {
    /// One leg per segment, in order
    fn compute_batch(
        &self,
        url: &str,
        mode: &str,
        dimension: RouterDimension,
        segments: &[Segment],
        encoded_polyline: bool,
        options: &RouterOptions,
    ) -> Result<Vec<RouteLeg>, RouterError>;
}
