use crate::numerics::Element;

/// Moves `N` contiguous elements as one hardware vector transfer.
///
/// Implemented for every `(T, N)` pair in the vector type table. Pairs that fit
/// a single hardware vector perform one load and one store; wider pairs are
/// tiled by maximum-width sub-transfers.
pub trait VectorTransfer<const N: usize>: Element {
    /// # Safety
    ///
    /// `dst` and `src` must be valid for `N` elements, must not partially
    /// overlap, and must both be aligned for the width `N` vector type.
    unsafe fn copy_vector(dst: *mut Self, src: *const Self);

    /// # Safety
    ///
    /// `dst` must be valid for `N` elements and aligned for the width `N`
    /// vector type.
    unsafe fn zero_vector(dst: *mut Self);
}

/// Copies `N` elements from `src` to `dst` in a single vector transfer.
///
/// No bounds or alignment checks are performed. Pick `N` with
/// [`max_safe_width`](crate::probe::max_safe_width) beforehand.
///
/// # Safety
///
/// See [`VectorTransfer::copy_vector`]. `dst == src` is allowed.
#[inline(always)]
pub unsafe fn copy_vector<T: VectorTransfer<N>, const N: usize>(dst: *mut T, src: *const T) {
    unsafe { T::copy_vector(dst, src) }
}

/// Writes `N` zero elements at `dst` in a single vector transfer.
///
/// # Safety
///
/// See [`VectorTransfer::zero_vector`].
#[inline(always)]
pub unsafe fn copy_zero_vector<T: VectorTransfer<N>, const N: usize>(dst: *mut T) {
    unsafe { T::zero_vector(dst) }
}
