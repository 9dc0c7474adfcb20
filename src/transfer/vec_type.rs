use half::{bf16, f16};

use crate::numerics::Element;
use crate::transfer::VectorTransfer;

/// Widest transfer the hardware performs as a single instruction, in bits.
pub const MAX_TRANSFER_BITS: u32 = 128;
const MAX_TRANSFER_BYTES: usize = (MAX_TRANSFER_BITS / 8) as usize;

/// Maps an element type and a width `N` to the hardware vector type that moves
/// `N` contiguous elements at once.
///
/// # Safety
///
/// `Type` must be a plain reinterpretation of `[Self; N]`: same size, no
/// padding, and `ZERO` must be its all-zero value. For native entries wider
/// than one element the alignment of `Type` equals its size.
pub unsafe trait VecType<const N: usize>: Element {
    type Type: Copy;
    const ZERO: Self::Type;
}

/// Single element. Only requires the element's own alignment.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scalar<A>(pub A);

macro_rules! aligned_vector {
    ($($name:ident => $align:literal),* $(,)?) => {
        $(
            #[doc = concat!("A ", stringify!($align), "-byte vector, aligned on its size.")]
            #[repr(C, align($align))]
            #[derive(Debug, Clone, Copy, PartialEq)]
            pub struct $name<A>(pub A);
        )*
    };
}

aligned_vector!(
    Vector16 => 2,
    Vector32 => 4,
    Vector64 => 8,
    Vector128 => 16,
);

/// Entries covered by a single hardware vector: one load, one store.
macro_rules! native {
    ($t:ty; $($n:literal => $wrapper:ident),* $(,)?) => {
        $(
            unsafe impl VecType<$n> for $t {
                type Type = $wrapper<[$t; $n]>;
                const ZERO: Self::Type = $wrapper([<$t as Element>::ZERO; $n]);
            }

            const _: () = {
                type V = <$t as VecType<$n>>::Type;
                assert!(size_of::<V>() == $n * size_of::<$t>());
                assert!(size_of::<V>() <= MAX_TRANSFER_BYTES);
                assert!($n == 1 || align_of::<V>() == size_of::<V>());
            };

            impl VectorTransfer<$n> for $t {
                #[inline(always)]
                unsafe fn copy_vector(dst: *mut Self, src: *const Self) {
                    type V = <$t as VecType<$n>>::Type;
                    // SAFETY: the caller guarantees both pointers are valid for `N`
                    // elements and aligned for `V`.
                    unsafe { dst.cast::<V>().write(src.cast::<V>().read()) }
                }

                #[inline(always)]
                unsafe fn zero_vector(dst: *mut Self) {
                    type V = <$t as VecType<$n>>::Type;
                    // SAFETY: as in `copy_vector`.
                    unsafe { dst.cast::<V>().write(<$t as VecType<$n>>::ZERO) }
                }
            }
        )*
    };
}

/// Entries wider than the maximum transfer: tiled by `N / SUB` consecutive
/// maximum-width sub-transfers.
macro_rules! composite {
    ($t:ty; $($n:literal = $sub:literal),* $(,)?) => {
        $(
            unsafe impl VecType<$n> for $t {
                type Type = [<$t as VecType<$sub>>::Type; $n / $sub];
                const ZERO: Self::Type = [<$t as VecType<$sub>>::ZERO; $n / $sub];
            }

            const _: () = {
                assert!($sub * size_of::<$t>() == MAX_TRANSFER_BYTES);
                assert!($n % $sub == 0);
                assert!(size_of::<<$t as VecType<$n>>::Type>() == $n * size_of::<$t>());
            };

            impl VectorTransfer<$n> for $t {
                #[inline(always)]
                unsafe fn copy_vector(dst: *mut Self, src: *const Self) {
                    for i in 0..$n / $sub {
                        // SAFETY: sub-block `i` starts `i` maximum transfers past an
                        // aligned base, so it is aligned for the width `SUB` vector.
                        unsafe {
                            <$t as VectorTransfer<$sub>>::copy_vector(
                                dst.add(i * $sub),
                                src.add(i * $sub),
                            )
                        }
                    }
                }

                #[inline(always)]
                unsafe fn zero_vector(dst: *mut Self) {
                    for i in 0..$n / $sub {
                        // SAFETY: as in `copy_vector`.
                        unsafe { <$t as VectorTransfer<$sub>>::zero_vector(dst.add(i * $sub)) }
                    }
                }
            }
        )*
    };
}

macro_rules! bits8 {
    ($($t:ty),*) => {
        $(
            native!($t; 1 => Scalar, 2 => Vector16, 4 => Vector32, 8 => Vector64, 16 => Vector128);
        )*
    };
}

macro_rules! bits16 {
    ($($t:ty),*) => {
        $(
            native!($t; 1 => Scalar, 2 => Vector32, 4 => Vector64, 8 => Vector128);
            composite!($t; 16 = 8);
        )*
    };
}

macro_rules! bits32 {
    ($($t:ty),*) => {
        $(
            native!($t; 1 => Scalar, 2 => Vector64, 4 => Vector128);
            composite!($t; 8 = 4);
        )*
    };
}

macro_rules! bits64 {
    ($($t:ty),*) => {
        $(
            native!($t; 1 => Scalar, 2 => Vector128);
            composite!($t; 4 = 2);
        )*
    };
}

bits8!(u8, i8);
bits16!(u16, i16, f16, bf16);
bits32!(u32, i32, f32);
bits64!(u64, i64, f64);
