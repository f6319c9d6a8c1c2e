mod backend;
pub mod demo;
mod registry;

pub use backend::{Solver, SolverError, SolverKind};
pub use registry::SolverRegistry;
