use serde::{Deserialize, Serialize};

use crate::numerics::Element;
use crate::transfer::MAX_TRANSFER_BITS;

/// A vector width the probe may hand out.
///
/// The ladder stops at four elements. A width-8 rung is reserved until its
/// performance has been profiled, and is deliberately not probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VecWidth {
    One,
    Two,
    Four,
}

impl VecWidth {
    /// Number of elements moved per transfer.
    pub const fn get(self) -> usize {
        match self {
            VecWidth::One => 1,
            VecWidth::Two => 2,
            VecWidth::Four => 4,
        }
    }

    fn from_lanes(lanes: usize) -> Self {
        match lanes {
            0 | 1 => VecWidth::One,
            2 | 3 => VecWidth::Two,
            _ => VecWidth::Four,
        }
    }
}

/// Unit in which the alignment modulus of the probe is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Modulus is `width * element_bits`. Asks for eight times the alignment
    /// the hardware needs, never hands out an unsafe width.
    #[default]
    Bits,
    /// Modulus is `width * element_bytes`, the exact hardware requirement.
    Bytes,
}

/// Computes the widest safe vector width for a buffer address.
///
/// Stateless apart from its two knobs, so one value can be shared by every
/// lane of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentProbe {
    pub max_transfer_bits: u32,
    pub granularity: Granularity,
}

impl Default for AlignmentProbe {
    fn default() -> Self {
        AlignmentProbe {
            max_transfer_bits: MAX_TRANSFER_BITS,
            granularity: Granularity::Bits,
        }
    }
}

impl AlignmentProbe {
    pub fn new(max_transfer_bits: u32, granularity: Granularity) -> Self {
        AlignmentProbe {
            max_transfer_bits,
            granularity,
        }
    }

    /// Largest width `w` in {1, 2, 4} with `address` aligned for `w` elements
    /// of `element_bits` bits and `w * element_bits <= max_transfer_bits`.
    ///
    /// Falls back to 1 when no wider alignment holds, and also when a single
    /// element is already wider than the maximum transfer.
    ///
    /// # Panics
    ///
    /// Panics if `element_bits == 0`.
    pub fn max_safe_width(&self, address: usize, element_bits: u32) -> VecWidth {
        assert!(element_bits > 0, "element bit width must be positive");

        // widest width the hardware can move in one go, as a power of two
        let theoretical = (self.max_transfer_bits / element_bits).max(1) as usize;
        let max_width = 1usize << theoretical.ilog2();

        let unit = match self.granularity {
            Granularity::Bits => element_bits as usize,
            Granularity::Bytes => (element_bits as usize).div_ceil(8),
        };

        let width = if address.is_multiple_of(unit * 4) {
            max_width.min(4)
        } else if address.is_multiple_of(unit * 2) {
            max_width.min(2)
        } else {
            1
        };

        VecWidth::from_lanes(width)
    }

    /// [`Self::max_safe_width`] for a typed pointer.
    #[inline]
    pub fn probe<T: Element>(&self, ptr: *const T) -> VecWidth {
        self.max_safe_width(ptr.addr(), T::BITS)
    }
}

/// [`AlignmentProbe::max_safe_width`] with the default probe: a 128-bit
/// ceiling and the modulus expressed in element bits.
pub fn max_safe_width(address: usize, element_bits: u32) -> VecWidth {
    AlignmentProbe::default().max_safe_width(address, element_bits)
}

/// [`max_safe_width`] for a typed pointer.
pub fn max_safe_width_of<T: Element>(ptr: *const T) -> VecWidth {
    AlignmentProbe::default().probe(ptr)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::numerics::AlignedBuffer;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    fn vec_width_values() {
        assert_eq!(VecWidth::One.get(), 1);
        assert_eq!(VecWidth::Two.get(), 2);
        assert_eq!(VecWidth::Four.get(), 4);
        assert!(VecWidth::One < VecWidth::Two && VecWidth::Two < VecWidth::Four);
    }

    #[test]
    fn f32_ladder_in_bits() {
        // modulus 128 for width 4, 64 for width 2
        assert_eq!(max_safe_width(0, 32), VecWidth::Four);
        assert_eq!(max_safe_width(128, 32), VecWidth::Four);
        assert_eq!(max_safe_width(4096, 32), VecWidth::Four);
        assert_eq!(max_safe_width(64, 32), VecWidth::Two);
        assert_eq!(max_safe_width(192, 32), VecWidth::Two);
        assert_eq!(max_safe_width(32, 32), VecWidth::One);
        assert_eq!(max_safe_width(16, 32), VecWidth::One);
        assert_eq!(max_safe_width(3, 32), VecWidth::One);
    }

    #[test]
    fn ladder_properties_hold_for_random_addresses() {
        let mut rng = StdRng::seed_from_u64(42);
        for bits in [8u32, 16, 32, 64] {
            let max_width = (MAX_TRANSFER_BITS / bits) as usize;
            for _ in 0..1000 {
                let address: usize = rng.random_range(0..1 << 40);
                let width = max_safe_width(address, bits).get();
                let unit = bits as usize;
                if address % (unit * 4) == 0 {
                    assert_eq!(width, 4.min(max_width));
                } else if address % (unit * 2) == 0 {
                    assert_eq!(width, 2.min(max_width));
                } else {
                    assert_eq!(width, 1);
                }
                assert!(width * bits as usize <= MAX_TRANSFER_BITS as usize);
            }
        }
    }

    #[test]
    fn f64_is_capped_at_two() {
        assert_eq!(max_safe_width(0, 64), VecWidth::Two);
        assert_eq!(max_safe_width(256, 64), VecWidth::Two);
        assert_eq!(max_safe_width(128, 64), VecWidth::Two);
        assert_eq!(max_safe_width(64, 64), VecWidth::One);
    }

    #[test]
    fn byte_granularity_scenario() {
        let probe = AlignmentProbe::new(128, Granularity::Bytes);
        let a = 0x7f00_0000usize;
        assert_eq!(a % 128, 0);
        assert_eq!(probe.max_safe_width(a, 32), VecWidth::Four);
        assert_eq!(probe.max_safe_width(a + 4 * 4, 32), VecWidth::Four);
        assert_eq!(probe.max_safe_width(a + 8, 32), VecWidth::Two);
        assert_eq!(probe.max_safe_width(a + 4, 32), VecWidth::One);
    }

    #[test]
    fn bits_never_wider_than_bytes() {
        let bits = AlignmentProbe::new(128, Granularity::Bits);
        let bytes = AlignmentProbe::new(128, Granularity::Bytes);
        for address in 0..2048usize {
            for element_bits in [8, 16, 32, 64] {
                assert!(
                    bits.max_safe_width(address, element_bits)
                        <= bytes.max_safe_width(address, element_bits)
                );
            }
        }
    }

    #[test]
    fn oversized_elements_fall_back_to_one() {
        assert_eq!(max_safe_width(0, 256), VecWidth::One);
        assert_eq!(max_safe_width(0, 128), VecWidth::One);
        let narrow = AlignmentProbe::new(32, Granularity::Bits);
        assert_eq!(narrow.max_safe_width(0, 64), VecWidth::One);
        assert_eq!(narrow.max_safe_width(0, 16), VecWidth::Two);
    }

    #[test]
    fn non_power_of_two_ceiling_rounds_down() {
        // 96 / 16 = 6 elements, the usable power of two is 4
        let probe = AlignmentProbe::new(96, Granularity::Bytes);
        assert_eq!(probe.max_safe_width(0, 16), VecWidth::Four);
        // 96 / 32 = 3 elements, rounds to 2
        assert_eq!(probe.max_safe_width(0, 32), VecWidth::Two);
    }

    #[test]
    #[should_panic]
    fn zero_bit_elements_panic() {
        max_safe_width(0, 0);
    }

    #[test]
    fn typed_pointer_probe() {
        let buf = AlignedBuffer::<f32>::zeroed(64);
        let base = buf.as_slice().as_ptr();
        assert_eq!(max_safe_width_of(base), VecWidth::Four);
        assert_eq!(max_safe_width_of(base.wrapping_add(16)), VecWidth::Two);
        assert_eq!(max_safe_width_of(base.wrapping_add(1)), VecWidth::One);

        let bytes = AlignmentProbe::new(128, Granularity::Bytes);
        assert_eq!(bytes.probe(base.wrapping_add(4)), VecWidth::Four);
        assert_eq!(bytes.probe(base.wrapping_add(2)), VecWidth::Two);
    }

    #[test]
    fn probe_is_safe_from_many_threads() {
        let probe = AlignmentProbe::default();
        let results: Vec<VecWidth> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| probe.max_safe_width(1024, 32)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(results.iter().all(|&w| w == VecWidth::Four));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let probe: AlignmentProbe = serde_json::from_str(r#"{"granularity": "bytes"}"#).unwrap();
        assert_eq!(probe, AlignmentProbe::new(128, Granularity::Bytes));

        let probe: AlignmentProbe = serde_json::from_str(r#"{"max_transfer_bits": 64}"#).unwrap();
        assert_eq!(probe, AlignmentProbe::new(64, Granularity::Bits));
    }
}
