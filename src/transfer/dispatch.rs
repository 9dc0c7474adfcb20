use crate::{
    numerics::Element,
    probe::{AlignmentProbe, VecWidth},
    statistics::TransferStats,
    transfer::{VectorTransfer, copy_vector, copy_zero_vector},
};

/// Elements with a transfer instantiation for every width the probe can return.
pub trait Transferable: Element + VectorTransfer<1> + VectorTransfer<2> + VectorTransfer<4> {}

impl<T> Transferable for T where T: Element + VectorTransfer<1> + VectorTransfer<2> + VectorTransfer<4> {}

/// Runs the width-`width` instantiation of [`copy_vector`].
///
/// # Safety
///
/// Same contract as [`copy_vector`] for `N = width.get()`.
#[inline(always)]
pub unsafe fn copy_with_width<T: Transferable>(width: VecWidth, dst: *mut T, src: *const T) {
    unsafe {
        match width {
            VecWidth::One => copy_vector::<T, 1>(dst, src),
            VecWidth::Two => copy_vector::<T, 2>(dst, src),
            VecWidth::Four => copy_vector::<T, 4>(dst, src),
        }
    }
}

/// Runs the width-`width` instantiation of [`copy_zero_vector`].
///
/// # Safety
///
/// Same contract as [`copy_zero_vector`] for `N = width.get()`.
#[inline(always)]
pub unsafe fn zero_with_width<T: Transferable>(width: VecWidth, dst: *mut T) {
    unsafe {
        match width {
            VecWidth::One => copy_zero_vector::<T, 1>(dst),
            VecWidth::Two => copy_zero_vector::<T, 2>(dst),
            VecWidth::Four => copy_zero_vector::<T, 4>(dst),
        }
    }
}

/// Copies `src` into `dst` with the widest width both buffers allow under the
/// default probe. See [`copy_slice_with`].
pub fn copy_slice<T: Transferable>(dst: &mut [T], src: &[T], stats: &mut TransferStats) -> VecWidth {
    copy_slice_with(&AlignmentProbe::default(), dst, src, stats)
}

/// Copies `src` into `dst`.
///
/// Both buffers are probed once; the narrower of the two widths is used for
/// the body, and the residual elements are moved with width-1 transfers.
/// Returns the width used for the body.
///
/// # Panics
///
/// Panics if the two slices have different lengths.
pub fn copy_slice_with<T: Transferable>(
    probe: &AlignmentProbe,
    dst: &mut [T],
    src: &[T],
    stats: &mut TransferStats,
) -> VecWidth {
    assert_eq!(dst.len(), src.len());

    let width = probe.probe(dst.as_ptr()).min(probe.probe(src.as_ptr()));
    stats.bump_buffers_probed(2);
    tracing::trace!(len = dst.len(), width = width.get(), "copy_slice");

    let (blocks, tail) = match width {
        VecWidth::One => copy_blocks::<T, 1>(dst, src),
        VecWidth::Two => copy_blocks::<T, 2>(dst, src),
        VecWidth::Four => copy_blocks::<T, 4>(dst, src),
    };
    stats.bump_copies(width, blocks);
    stats.bump_copies(VecWidth::One, tail);
    stats.bump_tail(tail);
    width
}

/// Zero-fills `dst` with the widest width it allows under the default probe.
/// See [`zero_slice_with`].
pub fn zero_slice<T: Transferable>(dst: &mut [T], stats: &mut TransferStats) -> VecWidth {
    zero_slice_with(&AlignmentProbe::default(), dst, stats)
}

/// Zero-fills `dst`, wide blocks first and the residual elements one by one.
/// Nothing outside `dst` is written. Returns the width used for the body.
pub fn zero_slice_with<T: Transferable>(
    probe: &AlignmentProbe,
    dst: &mut [T],
    stats: &mut TransferStats,
) -> VecWidth {
    let width = probe.probe(dst.as_ptr());
    stats.bump_buffers_probed(1);
    tracing::trace!(len = dst.len(), width = width.get(), "zero_slice");

    let (blocks, tail) = match width {
        VecWidth::One => zero_blocks::<T, 1>(dst),
        VecWidth::Two => zero_blocks::<T, 2>(dst),
        VecWidth::Four => zero_blocks::<T, 4>(dst),
    };
    stats.bump_zero_fills(width, blocks);
    stats.bump_zero_fills(VecWidth::One, tail);
    stats.bump_tail(tail);
    width
}

/// Returns (number of width-`N` blocks, number of tail elements).
#[inline(always)]
fn copy_blocks<T, const N: usize>(dst: &mut [T], src: &[T]) -> (usize, usize)
where
    T: VectorTransfer<N> + VectorTransfer<1>,
{
    let (dst_blocks, dst_tail) = dst.as_chunks_mut::<N>();
    let (src_blocks, src_tail) = src.as_chunks::<N>();

    for (d, s) in dst_blocks.iter_mut().zip(src_blocks) {
        // SAFETY: both bases were probed for width N and every block starts a
        // multiple of N elements past its base. `&mut` rules out overlap.
        unsafe { copy_vector::<T, N>(d.as_mut_ptr(), s.as_ptr()) }
    }
    for (d, s) in dst_tail.iter_mut().zip(src_tail) {
        // SAFETY: single elements only need the alignment of `T`.
        unsafe { copy_vector::<T, 1>(d, s) }
    }

    (dst_blocks.len(), dst_tail.len())
}

#[inline(always)]
fn zero_blocks<T, const N: usize>(dst: &mut [T]) -> (usize, usize)
where
    T: VectorTransfer<N> + VectorTransfer<1>,
{
    let (dst_blocks, dst_tail) = dst.as_chunks_mut::<N>();

    for d in dst_blocks.iter_mut() {
        // SAFETY: see `copy_blocks`.
        unsafe { copy_zero_vector::<T, N>(d.as_mut_ptr()) }
    }
    for d in dst_tail.iter_mut() {
        // SAFETY: single elements only need the alignment of `T`.
        unsafe { copy_zero_vector::<T, 1>(d) }
    }

    (dst_blocks.len(), dst_tail.len())
}
