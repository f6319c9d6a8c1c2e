pub mod as_the_crow_flies;
mod geometry;
pub mod osrm;
pub mod router;

pub use geometry::POLYLINE_PRECISION;
pub use router::{
    LegGeometry, RouteLeg, Router, RouterDimension, RouterError, RouterOptions, Segment,
};
