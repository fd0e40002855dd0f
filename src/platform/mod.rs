//! OS boundaries behind narrow traits, each with a live and a mock backend.

pub mod procs;
pub mod registry;
