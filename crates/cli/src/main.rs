//! velgrid CLI - grid seismic velocity picks into 3D volumes

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use velgrid_algorithms::interpolation::{index_points, interpolate, NearestNeighborParams};
use velgrid_core::io::{
    read_survey, read_velocity_picks, write_combined, write_volume, SegySurvey,
};
use velgrid_core::{
    build_lattice, join_coverage, join_on_trace, CombinedRecord, LatticeSpec, Sample,
};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "velgrid")]
#[command(author, version, about = "Nearest-neighbour gridding of seismic velocity picks", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show trace count and coordinate extent of a SEG-Y file
    SegyInfo {
        /// Input SEG-Y file
        input: PathBuf,
    },
    /// Join velocity picks with SEG-Y trace coordinates
    Combine {
        #[command(flatten)]
        inputs: InputArgs,
        /// Output table (default: <picks>_combined.dat)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Interpolate velocity picks onto a regular X/Y/TWT lattice
    Interpolate {
        #[command(flatten)]
        inputs: InputArgs,
        #[command(flatten)]
        lattice: LatticeArgs,
        /// Output volume (default: <picks>_interpolated.dat)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write the combined pick table to this file
        #[arg(long)]
        combined: Option<PathBuf>,
        /// Refuse lattices with more nodes than this
        #[arg(long)]
        max_nodes: Option<usize>,
        /// Worker threads (default: all cores)
        #[arg(short = 'j', long)]
        threads: Option<usize>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// SEG-Y file providing trace SourceX/SourceY
    #[arg(long)]
    segy: PathBuf,
    /// Velocity pick table (Trace TWT VNMO, one header line)
    #[arg(long)]
    picks: PathBuf,
}

#[derive(Args)]
struct LatticeArgs {
    /// JSON lattice specification (replaces the bound/step flags)
    #[arg(
        long,
        value_name = "JSON",
        conflicts_with_all = [
            "step_xy", "step_twt", "x_min", "x_max", "y_min", "y_max", "twt_min", "twt_max"
        ]
    )]
    lattice: Option<PathBuf>,
    /// Grid resolution in X and Y (m)
    #[arg(long)]
    step_xy: Option<f64>,
    /// Grid resolution in TWT (ms)
    #[arg(long)]
    step_twt: Option<f64>,
    /// Minimum X coordinate (m)
    #[arg(long, allow_negative_numbers = true)]
    x_min: Option<f64>,
    /// Maximum X coordinate (m)
    #[arg(long, allow_negative_numbers = true)]
    x_max: Option<f64>,
    /// Minimum Y coordinate (m)
    #[arg(long, allow_negative_numbers = true)]
    y_min: Option<f64>,
    /// Maximum Y coordinate (m)
    #[arg(long, allow_negative_numbers = true)]
    y_max: Option<f64>,
    /// First TWT (ms)
    #[arg(long, allow_negative_numbers = true)]
    twt_min: Option<f64>,
    /// Last TWT (ms)
    #[arg(long, allow_negative_numbers = true)]
    twt_max: Option<f64>,
}

impl LatticeArgs {
    fn resolve(&self) -> Result<LatticeSpec> {
        if let Some(path) = &self.lattice {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read lattice file {}", path.display()))?;
            let spec: LatticeSpec = serde_json::from_str(&text)
                .with_context(|| format!("Invalid lattice file {}", path.display()))?;
            return Ok(spec);
        }

        let flags = [
            ("--step-xy", self.step_xy),
            ("--step-twt", self.step_twt),
            ("--x-min", self.x_min),
            ("--x-max", self.x_max),
            ("--y-min", self.y_min),
            ("--y-max", self.y_max),
            ("--twt-min", self.twt_min),
            ("--twt-max", self.twt_max),
        ];
        let missing: Vec<&str> = flags
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            anyhow::bail!(
                "Missing lattice parameters: {} (or pass --lattice <JSON>)",
                missing.join(", ")
            );
        }

        let [step_xy, step_twt, x_min, x_max, y_min, y_max, twt_min, twt_max] =
            flags.map(|(_, v)| v.unwrap_or_default());

        Ok(LatticeSpec {
            x_min,
            x_max,
            x_step: step_xy,
            y_min,
            y_max,
            y_step: step_xy,
            t_min: twt_min,
            t_max: twt_max,
            t_step: step_twt,
        })
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// `--threads 0` is an error rather than rayon's "pick for me"
fn thread_count(threads: Option<usize>) -> velgrid_core::Result<Option<usize>> {
    if threads == Some(0) {
        return Err(velgrid_core::Error::InvalidParameter {
            name: "threads",
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(threads)
}

/// `<stem><suffix>` in the working directory, from the picks file name
fn default_output(picks: &Path, suffix: &str) -> PathBuf {
    let stem = picks
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "velocities".to_string());
    PathBuf::from(format!("{}{}", stem, suffix))
}

fn read_segy(path: &Path) -> Result<SegySurvey> {
    let pb = spinner("Reading SEG-Y trace headers...");
    let survey = read_survey(path)
        .with_context(|| format!("Failed to read SEG-Y {}", path.display()))?;
    pb.finish_and_clear();
    info!("SEG-Y: {} traces", survey.trace_count());
    Ok(survey)
}

fn read_combined(inputs: &InputArgs) -> Result<Vec<CombinedRecord>> {
    let survey = read_segy(&inputs.segy)?;

    let picks = read_velocity_picks(&inputs.picks)
        .with_context(|| format!("Failed to read picks {}", inputs.picks.display()))?;
    info!("Picks: {}", picks.len());

    let records = join_on_trace(&survey.positions, &picks);
    let coverage = join_coverage(&survey.positions, &picks);
    if coverage.unmatched_picks > 0 {
        warn!(
            "{} picks reference traces not present in the SEG-Y",
            coverage.unmatched_picks
        );
    }
    if coverage.traces_without_picks > 0 {
        info!("{} SEG-Y traces have no picks", coverage.traces_without_picks);
    }
    info!("Combined: {} located picks", records.len());
    for r in records.iter().take(5) {
        debug!(
            "  trace {} x={} y={} twt={} vnmo={}",
            r.trace, r.x, r.y, r.twt, r.vnmo
        );
    }

    Ok(records)
}

fn save_combined(records: &[CombinedRecord], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_combined(records, file).context("Failed to write combined table")?;
    info!("Combined data saved to {}", path.display());
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::SegyInfo { input } => {
            let survey = read_segy(&input)?;
            let header = &survey.header;

            println!("File: {}", input.display());
            println!("Traces: {}", survey.trace_count());
            println!("Byte order: {:?}", header.byte_order);
            println!("Sample format code: {}", header.format_code);
            println!("Samples per trace: {}", header.samples_per_trace);
            println!("Extended textual headers: {}", header.extended_headers);
            if let Some((min_x, min_y, max_x, max_y)) = survey.extent() {
                println!("X: {} - {}", min_x, max_x);
                println!("Y: {} - {}", min_y, max_y);
            }
        }

        Commands::Combine { inputs, output } => {
            let output = output.unwrap_or_else(|| default_output(&inputs.picks, "_combined.dat"));
            let records = read_combined(&inputs)?;
            save_combined(&records, &output)?;
        }

        Commands::Interpolate {
            inputs,
            lattice,
            output,
            combined,
            max_nodes,
            threads,
        } => {
            if let Some(threads) = thread_count(threads)? {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build_global()
                    .context("Failed to configure thread pool")?;
            }

            let params = NearestNeighborParams { max_nodes };
            params.validate()?;

            let spec = lattice.resolve()?;
            let axes = build_lattice(&spec).context("Invalid lattice")?;
            info!(
                "Lattice: {} x {} x {} (X x Y x TWT)",
                axes.nx(),
                axes.ny(),
                axes.nt()
            );

            let output =
                output.unwrap_or_else(|| default_output(&inputs.picks, "_interpolated.dat"));
            let records = read_combined(&inputs)?;
            if let Some(path) = &combined {
                save_combined(&records, path)?;
            }
            let samples: Vec<Sample> = records.iter().map(CombinedRecord::to_sample).collect();

            let start = Instant::now();
            let pb = spinner("Interpolating...");
            let index = index_points(&samples).context("Failed to index picks")?;
            let volume = interpolate(&index, &axes, &params).context("Failed to interpolate")?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            let pb = spinner("Writing output...");
            let file = File::create(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?;
            let rows = write_volume(&volume, file).context("Failed to write output")?;
            pb.finish_and_clear();

            let stats = volume.statistics();
            info!("Rows written: {}", rows);
            if let (Some(min), Some(max), Some(mean)) = (stats.min, stats.max, stats.mean) {
                info!("VNMO: min {:.1}, max {:.1}, mean {:.1} m/s", min, max, mean);
            }
            done("Interpolated volume", &output, elapsed);
        }
    }

    Ok(())
}
