// src/core/mod.rs

pub mod arg_expansion;
pub mod commons;
pub mod config_loader;
pub mod paths;
pub mod profile_loader;
pub mod selection;
