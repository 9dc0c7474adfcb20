use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::probe::VecWidth;

/// Counters describing the transfers issued by the slice helpers.
///
/// One instance per thread, merged once the threads are joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStats {
    buffers_probed: usize,
    /// width -> number of copy transfers of that width
    copies: HashMap<usize, usize>,
    /// width -> number of zero-fill transfers of that width
    zero_fills: HashMap<usize, usize>,
    elements: usize,
    tail_elements: usize,
}

impl TransferStats {
    pub fn new() -> Self {
        TransferStats {
            buffers_probed: 0,
            copies: HashMap::new(),
            zero_fills: HashMap::new(),
            elements: 0,
            tail_elements: 0,
        }
    }

    /// Record that `amount` buffers went through the alignment probe
    pub fn bump_buffers_probed(&mut self, amount: usize) {
        self.buffers_probed += amount
    }

    /// Record `count` copy transfers of the given width
    pub fn bump_copies(&mut self, width: VecWidth, count: usize) {
        if count > 0 {
            *self.copies.entry(width.get()).or_insert(0) += count;
            self.elements += count * width.get();
        }
    }

    /// Record `count` zero-fill transfers of the given width
    pub fn bump_zero_fills(&mut self, width: VecWidth, count: usize) {
        if count > 0 {
            *self.zero_fills.entry(width.get()).or_insert(0) += count;
            self.elements += count * width.get();
        }
    }

    /// Record that `amount` of the elements above were residuals moved one at a time
    /// after the wide blocks. They must also have been counted as width-1 transfers.
    pub fn bump_tail(&mut self, amount: usize) {
        self.tail_elements += amount
    }

    pub fn get_buffers_probed(&self) -> usize {
        self.buffers_probed
    }

    pub fn get_copies(&self, width: VecWidth) -> usize {
        self.copies.get(&width.get()).copied().unwrap_or(0)
    }

    pub fn get_zero_fills(&self, width: VecWidth) -> usize {
        self.zero_fills.get(&width.get()).copied().unwrap_or(0)
    }

    /// Total number of transfer instructions, copies and zero-fills alike
    pub fn get_transfers(&self) -> usize {
        self.copies.values().sum::<usize>() + self.zero_fills.values().sum::<usize>()
    }

    pub fn get_elements(&self) -> usize {
        self.elements
    }

    pub fn get_tail_elements(&self) -> usize {
        self.tail_elements
    }

    pub fn merge(mut self, other: &TransferStats) -> Self {
        self.buffers_probed += other.buffers_probed;
        for (&width, &count) in other.copies.iter() {
            *self.copies.entry(width).or_insert(0) += count;
        }
        for (&width, &count) in other.zero_fills.iter() {
            *self.zero_fills.entry(width).or_insert(0) += count;
        }
        self.elements += other.elements;
        self.tail_elements += other.tail_elements;
        self
    }

    /// Log the contents of the stats object
    pub fn dump(&self) {
        tracing::info!(
            buffers_probed = self.buffers_probed,
            elements = self.elements,
            tail_elements = self.tail_elements,
            transfers = self.get_transfers(),
            "transfer stats"
        );
        let mut widths: Vec<_> = self.copies.keys().chain(self.zero_fills.keys()).collect();
        widths.sort();
        widths.dedup();
        for width in widths {
            tracing::info!(
                width,
                copies = self.copies.get(width).copied().unwrap_or(0),
                zero_fills = self.zero_fills.get(width).copied().unwrap_or(0),
                "transfers by width"
            );
        }
    }
}

impl Default for TransferStats {
    fn default() -> Self {
        TransferStats::new()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats_initialized_to_zero() {
        let stats = TransferStats::new();
        assert_eq!(stats.get_buffers_probed(), 0);
        assert_eq!(stats.get_transfers(), 0);
        assert_eq!(stats.get_elements(), 0);
        assert_eq!(stats.get_tail_elements(), 0);
        assert_eq!(stats, TransferStats::default());
    }

    #[test]
    fn test_bump_copies_counts_transfers_and_elements() {
        let mut stats = TransferStats::new();
        stats.bump_copies(VecWidth::Four, 3);
        stats.bump_copies(VecWidth::One, 2);
        assert_eq!(stats.get_copies(VecWidth::Four), 3);
        assert_eq!(stats.get_copies(VecWidth::One), 2);
        assert_eq!(stats.get_copies(VecWidth::Two), 0);
        assert_eq!(stats.get_transfers(), 5);
        assert_eq!(stats.get_elements(), 14);
    }

    #[test]
    fn test_bump_zero_fills_kept_apart_from_copies() {
        let mut stats = TransferStats::new();
        stats.bump_zero_fills(VecWidth::Two, 4);
        assert_eq!(stats.get_zero_fills(VecWidth::Two), 4);
        assert_eq!(stats.get_copies(VecWidth::Two), 0);
        assert_eq!(stats.get_elements(), 8);
    }

    #[test]
    fn test_bump_with_zero_count_leaves_no_entry() {
        let mut stats = TransferStats::new();
        stats.bump_copies(VecWidth::Four, 0);
        stats.bump_zero_fills(VecWidth::One, 0);
        assert_eq!(stats, TransferStats::new());
    }

    #[test]
    fn test_merge_is_additive() {
        let mut a = TransferStats::new();
        a.bump_buffers_probed(2);
        a.bump_copies(VecWidth::Four, 10);
        a.bump_tail(1);
        a.bump_copies(VecWidth::One, 1);

        let mut b = TransferStats::new();
        b.bump_buffers_probed(1);
        b.bump_copies(VecWidth::Four, 5);
        b.bump_zero_fills(VecWidth::Two, 3);

        let merged = a.merge(&b);
        assert_eq!(merged.get_buffers_probed(), 3);
        assert_eq!(merged.get_copies(VecWidth::Four), 15);
        assert_eq!(merged.get_copies(VecWidth::One), 1);
        assert_eq!(merged.get_zero_fills(VecWidth::Two), 3);
        assert_eq!(merged.get_elements(), 40 + 1 + 20 + 6);
        assert_eq!(merged.get_tail_elements(), 1);
    }

    #[test]
    fn test_serializes_to_json() {
        let mut stats = TransferStats::new();
        stats.bump_copies(VecWidth::Four, 2);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["elements"], 8);
        assert_eq!(json["copies"]["4"], 2);
    }

    #[test]
    fn test_dump_does_not_panic() {
        let mut stats = TransferStats::new();
        stats.bump_copies(VecWidth::Two, 42);
        stats.bump_zero_fills(VecWidth::Four, 1);
        stats.dump();
    }
}
