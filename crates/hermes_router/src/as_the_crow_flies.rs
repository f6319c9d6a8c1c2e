use geo::{Distance, Haversine};
use geo_types::LineString;
use tracing::debug;

use crate::router::{LegGeometry, RouteLeg, Router, RouterDimension, RouterError, RouterOptions, Segment};

/// Offline router answering straight lines between the segment ends
pub struct AsTheCrowFliesRouter {
    detour_factor: f64,
}

impl Default for AsTheCrowFliesRouter {
    fn default() -> Self {
        Self { detour_factor: 1.0 }
    }
}

impl AsTheCrowFliesRouter {
    pub fn new(detour_factor: f64) -> Self {
        Self { detour_factor }
    }
}

impl Router for AsTheCrowFliesRouter {
    fn compute_batch(
        &self,
        _url: &str,
        mode: &str,
        _dimension: RouterDimension,
        segments: &[Segment],
        encoded_polyline: bool,
        _options: &RouterOptions,
    ) -> Result<Vec<RouteLeg>, RouterError> {
        debug!(mode, segments = segments.len(), "Computing crow flies legs");

        segments
            .iter()
            .map(|segment| {
                let line = LineString::from(vec![segment.from, segment.to]);
                let geometry = if encoded_polyline {
                    LegGeometry::encoded(&line)?
                } else {
                    LegGeometry::feature(&line)
                };

                Ok(RouteLeg {
                    distance: Some(Haversine.distance(segment.from, segment.to) * self.detour_factor),
                    geometry: Some(geometry),
                })
            })
            .collect()
    }
}
