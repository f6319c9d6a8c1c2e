use serde::Deserialize;
use tracing::{debug, warn};

use crate::router::{LegGeometry, RouteLeg, Router, RouterDimension, RouterError, RouterOptions, Segment};

pub const OSRM_ROUTE_API_PATH: &str = "/route/v1/";

#[derive(Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    /// Meters
    distance: f64,
    geometry: Option<String>,
}

/// Queries an OSRM compatible `/route` service, one request per segment
pub struct OsrmRouter {
    client: reqwest::blocking::Client,
}

impl Default for OsrmRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl OsrmRouter {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }

    fn route_url(url: &str, mode: &str, segment: &Segment) -> String {
        let mut route_url = url.trim_end_matches('/').to_owned();
        route_url.push_str(OSRM_ROUTE_API_PATH);
        route_url.push_str(mode);
        route_url.push_str(&format!(
            "/{},{};{},{}",
            segment.from.x(),
            segment.from.y(),
            segment.to.x(),
            segment.to.y()
        ));
        route_url
    }

    fn fetch_leg(
        &self,
        url: &str,
        mode: &str,
        segment: &Segment,
        encoded_polyline: bool,
    ) -> Result<RouteLeg, RouterError> {
        let response: OsrmRouteResponse = self
            .client
            .get(Self::route_url(url, mode, segment))
            .query(&[("overview", "full"), ("geometries", "polyline")])
            .send()?
            .json()?;

        if response.code != "Ok" {
            return Err(RouterError::Api {
                code: response.code,
                message: response.message.unwrap_or_default(),
            });
        }

        let route = response.routes.into_iter().next().ok_or(RouterError::NoRoute)?;
        let geometry = route
            .geometry
            .map(|encoded| LegGeometry::from_polyline(encoded, encoded_polyline))
            .transpose()?;

        Ok(RouteLeg {
            distance: Some(route.distance),
            geometry,
        })
    }
}

impl Router for OsrmRouter {
    fn compute_batch(
        &self,
        url: &str,
        mode: &str,
        dimension: RouterDimension,
        segments: &[Segment],
        encoded_polyline: bool,
        options: &RouterOptions,
    ) -> Result<Vec<RouteLeg>, RouterError> {
        if options.speed_multiplier.is_some() || options.traffic.is_some() {
            warn!("OSRM router ignores speed multiplier and traffic options");
        }
        debug!(
            mode,
            %dimension,
            segments = segments.len(),
            "Fetching OSRM route legs"
        );

        segments
            .iter()
            .map(|segment| self.fetch_leg(url, mode, segment, encoded_polyline))
            .collect()
    }
}
