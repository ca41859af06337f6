mod config;
mod render;

use anyhow::{anyhow, bail, Result};
use beatmark_lib::{
    io::{dose, features as features_io, text as text_io, traces as traces_io},
    landmarks::{annotate_pair, AnnotationBundle},
    plot::{figure_from_bundle, PlotBackend},
    signal::{Series, SeriesPair},
};
use clap::{Parser, Subcommand};
use config::WindowArgs;
use env_logger::Env;
use log::info;
use render::PngBackend;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "beatmark",
    version,
    about = "Beatmark: beat landmark annotation for tissue motion traces"
)]
struct Cli {
    /// Logging verbosity (e.g., debug, info, warn)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate landmarks on newline-delimited displacement and velocity samples
    Landmarks {
        /// Displacement-like samples
        #[arg(long)]
        primary: PathBuf,
        /// Velocity-like samples (shorter than the primary by the pair offset)
        #[arg(long)]
        secondary: PathBuf,
        /// Primary time base; a uniform grid of --dt is used when omitted
        #[arg(long)]
        time: Option<PathBuf>,
        /// Sample spacing in ms when --time is omitted (must be positive)
        #[arg(long, default_value_t = 1.0)]
        dt: f64,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Annotate one well of an averaged-trace table and optionally render it
    Annotate {
        #[arg(long)]
        traces: PathBuf,
        /// Zero-based row position in the table
        #[arg(long, conflicts_with_all = ["well", "drug"])]
        row: Option<usize>,
        #[arg(long)]
        well: Option<String>,
        #[arg(long)]
        drug: Option<String>,
        #[command(flatten)]
        window: WindowArgs,
        /// Write the annotated two-panel figure to this PNG
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, default_value_t = 1200)]
        width: u32,
        #[arg(long, default_value_t = 600)]
        height: u32,
    },
    /// Print the cleaned feature table as JSON lines
    Features {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        drug: Option<String>,
        #[arg(long)]
        well: Option<String>,
    },
    /// Convert a dose label (e.g. 300nM, 3uM, baseline) to molar concentration
    Dose { value: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level)).init();
    match cli.command {
        Commands::Landmarks {
            primary,
            secondary,
            time,
            dt,
            window,
        } => cmd_landmarks(&primary, &secondary, time.as_deref(), dt, &window)?,
        Commands::Annotate {
            traces,
            row,
            well,
            drug,
            window,
            out,
            width,
            height,
        } => cmd_annotate(
            &traces,
            row,
            well.as_deref(),
            drug.as_deref(),
            &window,
            out.as_deref(),
            (width, height),
        )?,
        Commands::Features { input, drug, well } => {
            cmd_features(&input, drug.as_deref(), well.as_deref())?
        }
        Commands::Dose { value } => cmd_dose(&value)?,
    }
    Ok(())
}

fn print_bundle(bundle: &AnnotationBundle) -> Result<()> {
    println!("{}", serde_json::to_string(bundle)?);
    Ok(())
}

fn cmd_landmarks(
    primary: &Path,
    secondary: &Path,
    time: Option<&Path>,
    dt: f64,
    window: &WindowArgs,
) -> Result<()> {
    let u = text_io::read_f64_series(primary)?;
    let v = text_io::read_f64_series(secondary)?;
    // The landmark pipeline derives the secondary time base from the primary one,
    // so the secondary only needs a placeholder grid.
    let (primary, secondary) = match time {
        Some(path) => (
            Series::new(text_io::read_f64_series(path)?, u)?,
            Series::uniform(v, 1.0)?,
        ),
        None => {
            if !(dt.is_finite() && dt > 0.0) {
                bail!("--dt must be a positive sample spacing, got {}", dt);
            }
            (Series::uniform(u, dt)?, Series::uniform(v, dt)?)
        }
    };
    let pair = SeriesPair::new(primary, secondary)?;
    let config = window.resolve()?;
    let bundle = annotate_pair(&pair, &config)?;
    print_bundle(&bundle)
}

fn cmd_annotate(
    traces: &Path,
    row: Option<usize>,
    well: Option<&str>,
    drug: Option<&str>,
    window: &WindowArgs,
    out: Option<&Path>,
    size: (u32, u32),
) -> Result<()> {
    let records = traces_io::read_traces(traces)?;
    let record = match row {
        Some(row) => records
            .get(row)
            .ok_or_else(|| anyhow!("row {} out of range ({} rows)", row, records.len()))?,
        None => traces_io::find_trace(&records, well, drug)
            .ok_or_else(|| anyhow!("no trace for well {:?} and drug {:?}", well, drug))?,
    };
    info!(
        "annotating trace row {} (drug {:?}, well {:?})",
        record.index,
        record.get("drug"),
        record.get("well")
    );
    let pair = record.motion_pair()?;
    let config = window.resolve()?;
    let bundle = annotate_pair(&pair, &config)?;
    if let Some(path) = out {
        let fig = figure_from_bundle(&bundle);
        PngBackend::new(path, size).draw(&fig)?;
        info!("wrote {}", path.display());
    }
    print_bundle(&bundle)
}

fn cmd_features(input: &Path, drug: Option<&str>, well: Option<&str>) -> Result<()> {
    let rows = features_io::read_features(input)?;
    for row in features_io::filter_rows(&rows, drug, well) {
        println!("{}", serde_json::to_string(row)?);
    }
    Ok(())
}

fn cmd_dose(value: &str) -> Result<()> {
    let molar = dose::parse_dose(value)?;
    let js = serde_json::json!({ "dose": value, "molar": molar });
    println!("{}", js);
    Ok(())
}
