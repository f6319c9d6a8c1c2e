use geo_types::LineString;
use geojson::{Feature, Geometry};

use crate::router::{LegGeometry, RouterError};

/// Digits kept by the Google polyline encoding
pub const POLYLINE_PRECISION: u32 = 5;

impl LegGeometry {
    pub fn feature(line: &LineString) -> Self {
        LegGeometry::Feature(Feature {
            geometry: Some(Geometry::from(line)),
            ..Default::default()
        })
    }

    pub fn encoded(line: &LineString) -> Result<Self, RouterError> {
        polyline::encode_coordinates(line.coords().copied(), POLYLINE_PRECISION)
            .map(LegGeometry::Encoded)
            .map_err(|error| RouterError::Geometry(error.to_string()))
    }

    /// Keeps the router's polyline as is, or expands it into a GeoJSON feature
    pub fn from_polyline(encoded: String, keep_encoded: bool) -> Result<Self, RouterError> {
        if keep_encoded {
            return Ok(LegGeometry::Encoded(encoded));
        }

        let line = polyline::decode_polyline(&encoded, POLYLINE_PRECISION)
            .map_err(|error| RouterError::Geometry(error.to_string()))?;
        Ok(LegGeometry::feature(&line))
    }
}
