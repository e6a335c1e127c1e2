//! gosh: launch a shell with an environment composed from named profiles.

pub mod cli;
pub mod constants;
pub mod core;
pub mod exit;
pub mod logging;
pub mod models;
pub mod system;
pub mod version;
