#![forbid(unsafe_code)]

//! Windows Maintenance Helper (wmh) — inspects and mutates three categories
//! of live OS state on a Windows host:
//!
//! 1. **Startup manager** — autostart registrations across registry hives:
//!    scan, classify against a criticality policy, disable with per-root
//!    outcomes
//! 2. **Process manager** — ranked process snapshots and polite batch
//!    termination
//! 3. **Temp sweeper** — enumerate-then-delete of temp-file artifacts
//!
//! All three share one failure-accounting pattern: per-target outcomes,
//! never a batch-aborting error.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use windows_maintenance_helper::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use windows_maintenance_helper::core::config::Config;
//! use windows_maintenance_helper::startup::scanner::scan;
//! ```

pub mod prelude;

pub mod core;
pub mod inventory;
pub mod logger;
pub mod net;
pub mod platform;
pub mod procs;
pub mod startup;
pub mod sweeper;
pub mod system;
pub mod tasks;
