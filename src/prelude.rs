//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use windows_maintenance_helper::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{Result, WmhError};
pub use crate::core::outcome::{BatchSummary, FailureKind, Outcome};

// Platform boundaries
pub use crate::platform::procs::{MockProcessTable, ProcessProvider, SysinfoProcesses};
pub use crate::platform::registry::{Hive, MockRegistry, RegistryProvider, RootRef, detect_registry};

// Startup manager
pub use crate::startup::mutator::{DisableReport, StartupMutator};
pub use crate::startup::policy::CriticalityPolicy;
pub use crate::startup::roots::{autostart_roots, writable_roots};
pub use crate::startup::scanner::{AutostartEntry, ScanReport, scan};

// Process manager
pub use crate::procs::ProcessSnapshot;

// Temp sweeper
pub use crate::sweeper::deletion::{SweepReport, TempSweeper};
pub use crate::sweeper::walker::TempWalker;

// External collaborators
pub use crate::inventory::{InventoryAdapter, SoftwareEntry};
pub use crate::net::{ConnectionEntry, NetAdapter};

// Logging
pub use crate::logger::{DiagEvent, DiagLoggerHandle};
