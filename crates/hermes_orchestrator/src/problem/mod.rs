pub mod activity;
pub mod configuration;
pub mod location;
pub mod matrix;
pub mod mission;
pub mod problem;
pub mod relation;
pub mod skill;
pub mod time_window;
pub mod vehicle;
pub mod zone;
