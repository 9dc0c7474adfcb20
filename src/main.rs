use clap::{Parser, ValueEnum};
use half::{bf16, f16};
use std::{error::Error, fs::File, io::BufWriter, path::PathBuf};
use tqdm::tqdm;
use tracing_subscriber::EnvFilter;
use vecxfer::{
    bench::{GridParams, JobKind, JobReport, random_source, run_copy_job, run_zero_job},
    fs::{LoadError, load_npy, load_probe_config},
    probe::{AlignmentProbe, Granularity, VecWidth},
    transfer::Transferable,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ElementKind {
    U8,
    F16,
    Bf16,
    F32,
    I32,
    F64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Copy,
    Zero,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GranularityArg {
    Bits,
    Bytes,
}

/// Alignment-probed vector transfers over a simulated lane grid
#[derive(Parser, Debug)]
#[command(name = "vecxfer")]
#[command(about = "Benchmarks alignment-probed vector copies over a simulated lane grid", long_about = None)]
struct Args {
    /// Element type moved by every lane
    #[arg(short, long, value_enum, default_value_t = ElementKind::F32)]
    element: ElementKind,

    /// Copy a source into a fresh buffer, or zero-fill a pre-filled one
    #[arg(short, long, value_enum, default_value_t = Mode::Copy)]
    mode: Mode,

    /// Number of lanes in the grid. Ignored when --input is given
    #[arg(short, long, default_value_t = 4096)]
    lanes: usize,

    /// Elements per lane (comma-separated list, e.g., "13,32,1024")
    #[arg(long, value_delimiter = ',', default_value = "1024")]
    lane_len: Vec<usize>,

    /// Number of threads running the lanes (comma-separated list, e.g., "1,2,4,8")
    #[arg(short, long, value_delimiter = ',', default_value = "1")]
    threads: Vec<usize>,

    /// Elements between the aligned base and the first lane
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Runs per (threads, lane_len) pair
    #[arg(short, long, default_value_t = 1)]
    repeats: usize,

    /// Overrides the probe granularity
    #[arg(long, value_enum)]
    granularity: Option<GranularityArg>,

    /// JSON file holding the probe configuration
    #[arg(long)]
    probe_config: Option<PathBuf>,

    /// Source data as a numpy file of f32 values. Random data otherwise
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Seed for the random source
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Write every job report to this file as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

fn print_report(report: &JobReport) {
    let stats = &report.stats;
    println!(
        "  {:?} {}: {} bytes in {:.4}s ({:.2} GiB/s), verified={}",
        report.kind,
        report.element,
        report.bytes_moved,
        report.elapsed_secs,
        report.gib_per_sec,
        report.verified
    );
    println!(
        "  transfers by width: 1={} 2={} 4={} (tail elements: {})",
        stats.get_copies(VecWidth::One) + stats.get_zero_fills(VecWidth::One),
        stats.get_copies(VecWidth::Two) + stats.get_zero_fills(VecWidth::Two),
        stats.get_copies(VecWidth::Four) + stats.get_zero_fills(VecWidth::Four),
        stats.get_tail_elements()
    );
}

fn run_sweep<T: Transferable>(args: &Args, probe: &AlignmentProbe) -> Result<Vec<JobReport>, LoadError> {
    let source: Vec<T> = match &args.input {
        Some(path) => load_npy(path)?,
        None => {
            let longest = args.lane_len.iter().copied().max().unwrap_or(0);
            random_source(args.lanes * longest, args.seed)
        }
    };
    println!("Source buffer holds {} elements", source.len());

    let kind = match args.mode {
        Mode::Copy => JobKind::Copy,
        Mode::Zero => JobKind::Zero,
    };

    let mut reports = Vec::new();
    // Run cartesian product of threads and lane_len
    for &num_threads in &args.threads {
        for &lane_len in &args.lane_len {
            if num_threads == 0 || lane_len == 0 {
                tracing::warn!(num_threads, lane_len, "skipping empty grid");
                continue;
            }
            let lanes = if args.input.is_some() {
                source.len() / lane_len
            } else {
                args.lanes
            };
            let params = GridParams {
                lanes,
                lane_len,
                offset: args.offset,
                threads: num_threads,
            };

            println!("\n==========");
            println!(
                "Running with threads={}, lanes={}, lane_len={}",
                num_threads, lanes, lane_len
            );
            println!("==========");

            for _ in tqdm(0..args.repeats) {
                let report = match kind {
                    JobKind::Copy => run_copy_job::<T>(probe, &source, &params),
                    JobKind::Zero => run_zero_job::<T>(probe, &source, &params),
                };
                if !report.verified {
                    tracing::error!(?params, "destination does not match the expected contents");
                }
                report.stats.dump();
                print_report(&report);
                reports.push(report);
            }
        }
    }

    Ok(reports)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let mut probe = match &args.probe_config {
        Some(path) => load_probe_config(path)?,
        None => AlignmentProbe::default(),
    };
    if let Some(granularity) = args.granularity {
        probe.granularity = match granularity {
            GranularityArg::Bits => Granularity::Bits,
            GranularityArg::Bytes => Granularity::Bytes,
        };
    }
    tracing::info!(?probe, "probe configured");

    println!("\nStarting cartesian product sweep:");
    println!("  Threads: {:?}", args.threads);
    println!("  Lane lengths: {:?}", args.lane_len);
    println!(
        "  Total jobs: {}",
        args.threads.len() * args.lane_len.len() * args.repeats
    );

    let reports = match args.element {
        ElementKind::U8 => run_sweep::<u8>(&args, &probe)?,
        ElementKind::F16 => run_sweep::<f16>(&args, &probe)?,
        ElementKind::Bf16 => run_sweep::<bf16>(&args, &probe)?,
        ElementKind::F32 => run_sweep::<f32>(&args, &probe)?,
        ElementKind::I32 => run_sweep::<i32>(&args, &probe)?,
        ElementKind::F64 => run_sweep::<f64>(&args, &probe)?,
    };

    if let Some(path) = &args.json {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &reports)?;
        println!("\nReports written to {}", path.display());
    }

    let failed = reports.iter().filter(|r| !r.verified).count();
    println!("\n==========");
    println!("All jobs completed! ({failed} failed verification)");
    println!("==========");
    Ok(())
}
