//! Startup-entry registry manager: scan, classify, disable.

pub mod mutator;
pub mod policy;
pub mod roots;
pub mod scanner;
