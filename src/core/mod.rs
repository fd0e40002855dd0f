//! Core infrastructure: errors, configuration, shared batch accounting.

pub mod config;
pub mod errors;
pub mod outcome;
