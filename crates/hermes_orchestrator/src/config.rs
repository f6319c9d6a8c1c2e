use serde::{Deserialize, Serialize};

use crate::solver::SolverKind;

pub const DEFAULT_QUEUE: &str = "DEFAULT";

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Forces every solve to run in-process
    pub solve_synchronously: bool,
    /// Repetitions used by partitioned periodic problems when none is requested
    pub default_repetition: usize,
    pub router_url: String,
    /// Production tolerates inconsistent waiting times instead of failing
    pub production: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            solve_synchronously: false,
            default_repetition: 1,
            router_url: String::from("http://localhost:5000"),
            production: false,
        }
    }
}

impl OrchestratorConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let solve_synchronously = match std::env::var("HERMES_SOLVE_SYNCHRONOUSLY") {
            Ok(value) => parse_bool(&value)?,
            Err(_) => defaults.solve_synchronously,
        };
        let default_repetition = match std::env::var("HERMES_DEFAULT_REPETITION") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.default_repetition,
        };
        let router_url = std::env::var("HERMES_ROUTER_URL").unwrap_or(defaults.router_url);
        let production = std::env::var("APP_ENV").is_ok_and(|env| env == "production");

        Ok(Self {
            solve_synchronously,
            default_repetition,
            router_url,
            production,
        })
    }
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(anyhow::anyhow!("Invalid boolean value: {other}")),
    }
}

/// What an api key is allowed to use
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Profile {
    pub queue: String,
    pub allowed_solvers: Vec<SolverKind>,
    pub force_synchronous: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            queue: String::from(DEFAULT_QUEUE),
            allowed_solvers: vec![SolverKind::Demo],
            force_synchronous: false,
        }
    }
}
