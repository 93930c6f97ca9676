//! Configuration file handling

pub mod config;
