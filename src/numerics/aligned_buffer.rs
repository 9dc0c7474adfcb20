use std::marker::PhantomData;

use crate::numerics::Element;

/// Base alignment of every [`AlignedBuffer`], in bytes. Large enough for the
/// widest probe rung of any element up to 64 bits, in both granularities.
pub const BUFFER_ALIGNMENT: usize = 128;

#[repr(C, align(128))]
#[derive(Debug, Clone, Copy)]
struct Slab([u8; BUFFER_ALIGNMENT]);

/// Owned, zero-initialised storage for `len` elements of `T`, whose first
/// element sits on a [`BUFFER_ALIGNMENT`] boundary.
///
/// The allocation is rounded up to whole slabs, the padding past `len` is
/// never exposed.
#[derive(Debug, Clone)]
pub struct AlignedBuffer<T: Element> {
    slabs: Vec<Slab>,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Element> AlignedBuffer<T> {
    /// Allocates `len` elements, all equal to `T::ZERO`.
    pub fn zeroed(len: usize) -> Self {
        const {
            assert!(align_of::<T>() <= BUFFER_ALIGNMENT);
        }
        let num_slabs = (len * size_of::<T>()).div_ceil(BUFFER_ALIGNMENT);
        AlignedBuffer {
            slabs: vec![Slab([0u8; BUFFER_ALIGNMENT]); num_slabs],
            len,
            _marker: PhantomData,
        }
    }

    /// Allocates a buffer holding a copy of `data`.
    pub fn from_slice(data: &[T]) -> Self {
        let mut returned = Self::zeroed(data.len());
        returned.as_mut_slice().copy_from_slice(data);
        returned
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the slabs cover at least `len * size_of::<T>()` initialised bytes,
        // the base is aligned for `T`, and `Element` accepts every bit pattern.
        unsafe { std::slice::from_raw_parts(self.slabs.as_ptr().cast::<T>(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, and `&mut self` guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.slabs.as_mut_ptr().cast::<T>(), self.len) }
    }
}
