#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod bench;
pub mod fs;
pub mod numerics;
pub mod probe;
pub mod statistics;
pub mod transfer;
