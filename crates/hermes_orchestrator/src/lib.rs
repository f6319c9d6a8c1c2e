pub mod config;
pub mod error;
pub mod jobs;
pub mod orchestrator;
pub mod partition;
pub mod problem;
pub mod reconstruct;
pub mod solution;
pub mod solver;
mod utils;
pub mod verifier;
pub mod zip_cluster;

#[cfg(test)]
pub(crate) mod test_utils;
