//! Runtime selection of the vector width.
//!
//! Kernels call the probe once per buffer, then statically dispatch to the
//! transfer instantiation for the returned [`VecWidth`].

mod alignment_probe;

pub use alignment_probe::{AlignmentProbe, Granularity, VecWidth, max_safe_width, max_safe_width_of};
