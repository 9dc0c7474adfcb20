use std::time::Instant;

use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::{
    numerics::{AlignedBuffer, Element},
    probe::AlignmentProbe,
    statistics::TransferStats,
    transfer::{Transferable, copy_slice_with, zero_slice_with},
};

/// Shape of a simulated grid: `lanes` contiguous chunks of `lane_len`
/// elements, starting `offset` elements past an aligned base, spread over
/// `threads` OS threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridParams {
    pub lanes: usize,
    pub lane_len: usize,
    pub offset: usize,
    pub threads: usize,
}

impl GridParams {
    /// Number of elements covered by all lanes together, `None` on overflow
    pub fn region_len(&self) -> Option<usize> {
        self.lanes.checked_mul(self.lane_len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Copy,
    Zero,
}

/// Outcome of one grid run.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub kind: JobKind,
    pub element: &'static str,
    pub params: GridParams,
    pub probe: AlignmentProbe,
    pub elapsed_secs: f64,
    pub bytes_moved: usize,
    pub gib_per_sec: f64,
    /// destination matched the expected contents, padding included
    pub verified: bool,
    pub stats: TransferStats,
}

/// Deterministic pseudo-random source data, standard normal scaled by 64 so
/// integer elements are not mostly zero.
pub fn random_source<T: Element>(len: usize, seed: u64) -> Vec<T> {
    StdRng::seed_from_u64(seed)
        .sample_iter(StandardNormal)
        .take(len)
        .map(|x: f32| T::from_f32(x * 64.0))
        .collect()
}

/// Copies `source[..region_len]` lane by lane into a fresh destination buffer.
///
/// # Panics
///
/// Panics if `source` is shorter than the grid region, if `lane_len` or
/// `threads` is zero, or if `offset + lanes * lane_len` overflows `usize`.
pub fn run_copy_job<T: Transferable>(
    probe: &AlignmentProbe,
    source: &[T],
    params: &GridParams,
) -> JobReport {
    let region_len = check_params(source.len(), params);
    let region = params.offset..params.offset + region_len;

    let mut src_buf = AlignedBuffer::<T>::zeroed(region.end);
    src_buf.as_mut_slice()[region.clone()].copy_from_slice(&source[..region_len]);
    let mut dst_buf = AlignedBuffer::<T>::zeroed(region.end);
    tracing::debug!(element = T::NAME, ?params, "starting copy job");

    let start_time = Instant::now();
    let lanes: Vec<_> = dst_buf.as_mut_slice()[region.clone()]
        .chunks_mut(params.lane_len)
        .zip(src_buf.as_slice()[region.clone()].chunks(params.lane_len))
        .collect();
    let stats = run_lanes(lanes, params.threads, |(dst, src), stats| {
        copy_slice_with(probe, dst, src, stats);
    });
    let elapsed = start_time.elapsed().as_secs_f64();

    let dst = dst_buf.as_slice();
    let verified = dst[region.clone()] == src_buf.as_slice()[region.clone()]
        && dst[..region.start].iter().all(|&x| x == T::ZERO);

    report::<T>(JobKind::Copy, probe, params, region_len, elapsed, verified, stats)
}

/// Zero-fills the grid region of a buffer pre-filled with `source`, lane by
/// lane. The leading padding is filled with ones to catch stray writes.
///
/// # Panics
///
/// Same as [`run_copy_job`].
pub fn run_zero_job<T: Transferable>(
    probe: &AlignmentProbe,
    source: &[T],
    params: &GridParams,
) -> JobReport {
    let region_len = check_params(source.len(), params);
    let region = params.offset..params.offset + region_len;
    let marker = T::from_f32(1.0);

    let mut dst_buf = AlignedBuffer::<T>::zeroed(region.end);
    dst_buf.as_mut_slice()[..region.start].fill(marker);
    dst_buf.as_mut_slice()[region.clone()].copy_from_slice(&source[..region_len]);
    tracing::debug!(element = T::NAME, ?params, "starting zero job");

    let start_time = Instant::now();
    let lanes: Vec<_> = dst_buf.as_mut_slice()[region.clone()]
        .chunks_mut(params.lane_len)
        .collect();
    let stats = run_lanes(lanes, params.threads, |dst, stats| {
        zero_slice_with(probe, dst, stats);
    });
    let elapsed = start_time.elapsed().as_secs_f64();

    let dst = dst_buf.as_slice();
    let verified = dst[region.clone()].iter().all(|&x| x == T::ZERO)
        && dst[..region.start].iter().all(|&x| x == marker);

    report::<T>(JobKind::Zero, probe, params, region_len, elapsed, verified, stats)
}

/// Returns the region length once the grid is known to fit in memory and in `source`.
fn check_params(source_len: usize, params: &GridParams) -> usize {
    assert!(params.lane_len > 0, "lane_len must be positive");
    assert!(params.threads > 0, "threads must be positive");
    let region_len = params
        .region_len()
        .filter(|len| len.checked_add(params.offset).is_some())
        .unwrap_or_else(|| panic!("grid {params:?} overflows the address space"));
    assert!(
        source_len >= region_len,
        "source has {} elements, grid needs {}",
        source_len,
        region_len
    );
    region_len
}

/// Hands the lanes out in contiguous groups, one group per thread, and merges
/// the per-thread stats once every thread is joined.
fn run_lanes<L, F>(lanes: Vec<L>, num_threads: usize, lane_fn: F) -> TransferStats
where
    L: Send,
    F: Fn(L, &mut TransferStats) + Sync,
{
    let per_thread = lanes.len().div_ceil(num_threads).max(1);
    let mut lanes = lanes.into_iter();
    let lane_fn = &lane_fn;

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..num_threads)
            .map(|_| {
                let group: Vec<L> = lanes.by_ref().take(per_thread).collect();
                s.spawn(move || {
                    let mut local_stats = TransferStats::new();
                    for lane in group {
                        lane_fn(lane, &mut local_stats);
                    }
                    local_stats
                })
            })
            .collect();

        let mut combined_stats = TransferStats::new();
        for handle in handles {
            let local_stats = handle.join().expect("Thread panicked");
            combined_stats = combined_stats.merge(&local_stats)
        }
        combined_stats
    })
}

fn report<T: Element>(
    kind: JobKind,
    probe: &AlignmentProbe,
    params: &GridParams,
    region_len: usize,
    elapsed_secs: f64,
    verified: bool,
    stats: TransferStats,
) -> JobReport {
    let bytes_moved = region_len.saturating_mul(size_of::<T>());
    let gib_per_sec = if elapsed_secs > 0.0 {
        bytes_moved as f64 / elapsed_secs / (1u64 << 30) as f64
    } else {
        0.0
    };
    tracing::info!(
        element = T::NAME,
        ?kind,
        elapsed_secs,
        gib_per_sec,
        verified,
        "job finished"
    );

    JobReport {
        kind,
        element: T::NAME,
        params: *params,
        probe: *probe,
        elapsed_secs,
        bytes_moved,
        gib_per_sec,
        verified,
        stats,
    }
}
