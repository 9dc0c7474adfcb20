use std::fmt::Debug;

use half::{bf16, f16};

/// A scalar element that can be moved by the vector transfer primitives.
///
/// # Safety
///
/// Implementors must be plain numeric types for which every bit pattern,
/// including all-zero, is a valid value, and whose size is a power of two.
/// The aligned buffer and the vector reinterpretations rely on this.
pub unsafe trait Element: Copy + PartialEq + Debug + Send + Sync + 'static {
    /// Width of one element in bits.
    const BITS: u32 = (size_of::<Self>() * 8) as u32;

    /// The numeric zero of the type. Its bit pattern is all zeros.
    const ZERO: Self;

    /// Short name used in reports, e.g. `"f32"`.
    const NAME: &'static str;

    /// Lossy conversion used to build synthetic and `.npy` sources.
    fn from_f32(value: f32) -> Self;
}

macro_rules! impl_element_primitive {
    ($($t:ident => $zero:expr),* $(,)?) => {
        $(
            unsafe impl Element for $t {
                const ZERO: Self = $zero;
                const NAME: &'static str = stringify!($t);

                #[inline]
                fn from_f32(value: f32) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_element_primitive!(
    u8 => 0,
    i8 => 0,
    u16 => 0,
    i16 => 0,
    u32 => 0,
    i32 => 0,
    u64 => 0,
    i64 => 0,
    f32 => 0.0,
    f64 => 0.0,
);

unsafe impl Element for f16 {
    const ZERO: Self = f16::ZERO;
    const NAME: &'static str = "f16";

    #[inline]
    fn from_f32(value: f32) -> Self {
        f16::from_f32(value)
    }
}

unsafe impl Element for bf16 {
    const ZERO: Self = bf16::ZERO;
    const NAME: &'static str = "bf16";

    #[inline]
    fn from_f32(value: f32) -> Self {
        bf16::from_f32(value)
    }
}
