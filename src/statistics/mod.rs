//! Transfer statistics for the slice helpers and the benchmark grid.
//!
//! This module counts buffers probed and transfers issued per width, so that a
//! run can tell how much of its traffic actually went through wide vectors.

mod stats;
pub use stats::*;
