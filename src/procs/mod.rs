//! Process lifecycle manager: snapshot, rank, terminate.

pub mod snapshot;
pub mod terminate;

pub use crate::platform::procs::ProcessSnapshot;
