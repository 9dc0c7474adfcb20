//! Element types and aligned storage for vector transfers.
//!
//! This module defines the scalar [`Element`] trait the transfer primitives are
//! generic over, and an [`AlignedBuffer`] whose base address satisfies the
//! widest alignment the probe can ask for.

mod aligned_buffer;
mod element;

pub use aligned_buffer::{AlignedBuffer, BUFFER_ALIGNMENT};
pub use element::Element;
