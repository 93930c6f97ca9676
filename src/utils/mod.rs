//! Paths, logging and the input debouncer

pub mod app_paths;
pub mod debouncer;
pub mod dual_logging;
pub mod logging;
