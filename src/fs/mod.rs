//! File system I/O for benchmark inputs and probe configuration.
//!
//! Source buffers are read from NumPy `.npy` files, probe settings from JSON.

mod config_load;
mod error;
mod source_load;

pub use config_load::*;
pub use error::LoadError;
pub use source_load::*;
