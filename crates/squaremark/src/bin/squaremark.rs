//! squaremark CLI: render reference markers, inspect dictionaries and run
//! detection jobs.

use clap::{Args, Parser, Subcommand};
use squaremark::config::DetectConfig;
use squaremark::detect;
use squaremark::marker::{add_quiet_zone, parse_code, render_marker, DictionaryParams};
use squaremark::pose::CameraModel;
use std::path::PathBuf;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "squaremark")]
#[command(about = "Detect and decode square fiducial markers")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON log lines (only with the `tracing` feature).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect markers in frames and write a JSON report.
    Detect(DetectArgs),

    /// Build a dictionary from reference images and print it as JSON.
    Dictionary(DictionaryArgs),

    /// Render a printable marker from a 0/1 code.
    Render(RenderArgs),
}

#[derive(Debug, Clone, Args)]
struct DetectArgs {
    /// JSON job config; other flags override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reference marker image (repeatable).
    #[arg(long = "reference")]
    references: Vec<PathBuf>,

    /// Frame to search (repeatable).
    #[arg(long = "frame")]
    frames: Vec<PathBuf>,

    /// Camera model JSON; enables pose estimation.
    #[arg(long)]
    camera: Option<PathBuf>,

    /// Report path; prints to stdout when neither this nor the config sets one.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Largest accepted Hamming distance.
    #[arg(long)]
    tolerance: Option<usize>,

    /// Maximum markers per frame, 0 for no limit.
    #[arg(long)]
    max_markers: Option<usize>,

    /// Signature length (a perfect square).
    #[arg(long)]
    bits: Option<usize>,
}

#[derive(Debug, Clone, Args)]
struct DictionaryArgs {
    /// Reference marker image (repeatable).
    #[arg(long = "reference", required = true)]
    references: Vec<PathBuf>,

    #[arg(long, default_value_t = 36)]
    bits: usize,

    /// Printed marker side, in world units.
    #[arg(long, default_value_t = 25.0)]
    marker_side: f64,

    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct RenderArgs {
    /// Inner cells row by row, e.g. "1001/0110/1100/0011" (1 = white).
    #[arg(long)]
    code: String,

    #[arg(long, default_value_t = 20)]
    cell_px: usize,

    /// White quiet zone around the marker, in pixels.
    #[arg(long, default_value_t = 0)]
    margin: usize,

    #[arg(long)]
    out: PathBuf,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json)?;

    match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Dictionary(args) => run_dictionary(&args),
        Commands::Render(args) => run_render(&args),
    }
}

#[cfg(feature = "tracing")]
fn init_logging(verbose: u8, json: bool) -> CliResult<()> {
    squaremark::core::init_tracing(squaremark::core::level_from_verbosity(verbose), json);
    Ok(())
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8, _json: bool) -> CliResult<()> {
    squaremark::core::init_with_level(squaremark::core::level_from_verbosity(verbose))?;
    Ok(())
}

fn path_string(p: &std::path::Path) -> String {
    p.display().to_string()
}

// ── detect ─────────────────────────────────────────────────────────────

impl DetectArgs {
    fn to_config(&self) -> CliResult<DetectConfig> {
        let mut cfg = match &self.config {
            Some(path) => DetectConfig::load_json(path)?,
            None => DetectConfig::default(),
        };
        if !self.references.is_empty() {
            cfg.reference_paths = self.references.iter().map(|p| path_string(p)).collect();
        }
        if !self.frames.is_empty() {
            cfg.frame_paths = self.frames.iter().map(|p| path_string(p)).collect();
        }
        if let Some(path) = &self.camera {
            let raw = std::fs::read_to_string(path)?;
            cfg.camera = Some(serde_json::from_str::<CameraModel>(&raw)?);
        }
        if let Some(out) = &self.out {
            cfg.output_path = Some(path_string(out));
        }
        if let Some(tolerance) = self.tolerance {
            cfg.detector.tolerance = tolerance;
        }
        if let Some(max_markers) = self.max_markers {
            cfg.detector.max_markers = max_markers;
        }
        if let Some(bits) = self.bits {
            cfg.dictionary.bits = bits;
        }

        if cfg.reference_paths.is_empty() {
            return Err("no reference image; pass --reference or set reference_paths".into());
        }
        if cfg.frame_paths.is_empty() {
            return Err("no frames; pass --frame or set frame_paths".into());
        }
        Ok(cfg)
    }
}

fn run_detect(args: &DetectArgs) -> CliResult<()> {
    let cfg = args.to_config()?;
    log::info!(
        "{} reference(s), {} frame(s)",
        cfg.reference_paths.len(),
        cfg.frame_paths.len()
    );

    let report = detect::run_detect_config(&cfg)?;
    log::info!("{} marker(s) in total", report.marker_count());

    match &cfg.output_path {
        Some(_) => {
            let out = cfg.output_path();
            report.write_json(&out)?;
            log::info!("report written to {}", out.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

// ── dictionary ─────────────────────────────────────────────────────────

fn run_dictionary(args: &DictionaryArgs) -> CliResult<()> {
    let references = args
        .references
        .iter()
        .map(detect::load_gray)
        .collect::<Result<Vec<_>, _>>()?;
    let params = DictionaryParams {
        bits: args.bits,
        marker_side: args.marker_side,
    };
    let dictionary = detect::build_dictionary(&references, &params)?;
    let json = serde_json::to_string_pretty(&dictionary)?;

    match &args.out {
        Some(out) => std::fs::write(out, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

// ── render ─────────────────────────────────────────────────────────────

fn run_render(args: &RenderArgs) -> CliResult<()> {
    let code = parse_code(&args.code)?;
    let marker = render_marker(&code, args.cell_px)?;
    let img = add_quiet_zone(&marker, args.margin, 255);
    detect::from_core_image(&img)?.save(&args.out)?;
    log::info!(
        "wrote {}x{} marker to {}",
        img.width,
        img.height,
        args.out.display()
    );
    Ok(())
}
