//! Temp sweeper: enumerate candidate files, then delete an explicit list.

pub mod deletion;
pub mod walker;
