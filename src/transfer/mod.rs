//! Vector copy and zero-fill primitives.
//!
//! A run of `N` elements is reinterpreted as one hardware vector (see
//! [`VecType`]) and moved with a single load and store. Runs wider than
//! [`MAX_TRANSFER_BITS`] are tiled by maximum-width sub-transfers.
//!
//! The primitives never check bounds or alignment. The [`dispatch`] helpers
//! wrap them behind safe slice functions that probe each buffer once.

pub mod dispatch;
mod vec_type;
mod vector_transfer;

pub use dispatch::{
    Transferable, copy_slice, copy_slice_with, copy_with_width, zero_slice, zero_slice_with,
    zero_with_width,
};
pub use vec_type::{MAX_TRANSFER_BITS, Scalar, VecType, Vector16, Vector32, Vector64, Vector128};
pub use vector_transfer::{VectorTransfer, copy_vector, copy_zero_vector};
