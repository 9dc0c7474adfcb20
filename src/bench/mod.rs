//! Simulated lane grid used to exercise and measure the transfer primitives.
//!
//! A buffer region is split into one contiguous chunk per lane, lanes are run
//! on OS threads, and every lane probes its own chunk before dispatching to the
//! matching width, the way a device kernel would.

mod grid;

pub use grid::*;
