//! gammactl - inspect and adjust display gamma ramps
//!
//! Lists adjustment methods, walks the site → partition → CRTC hierarchy,
//! prints CRTC information, reads and writes ramps, and decodes EDIDs.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gamma_device::MethodRegistry;
use gamma_device::dummy::DummyConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "gammactl")]
#[command(author, version, about = "Inspect and adjust display gamma ramps")]
#[command(long_about = "
Inspects and adjusts the gamma ramps of display CRTCs through any
registered adjustment method.

Examples:
  gammactl methods                        # Registered methods and suitability
  gammactl methods --level 4              # Everything compiled in
  gammactl caps dummy                     # Method capabilities
  gammactl list -m dummy                  # Partitions and CRTCs
  gammactl info -m dummy -p 1 -c 0        # Everything about one CRTC
  gammactl info -m dummy -f MACRO_EDID    # Selected fields only
  gammactl get -m dummy -d u16 -n 16      # Sampled ramp values
  gammactl set-gamma -m dummy 2.2         # Apply a power curve
  gammactl restore -m dummy               # Back to system settings
  gammactl edid monitor.hex               # Decode an EDID
  gammactl error -29                      # Describe an error code
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML file configuring the dummy method (default: $GAMMA_DUMMY_CONFIG)
    #[arg(long = "dummy-config", global = true, value_name = "FILE")]
    dummy_config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List adjustment methods
    #[command(visible_alias = "m")]
    Methods(MethodsArgs),

    /// Show the capabilities of a method
    Caps(CapsArgs),

    /// List partitions and CRTCs of a site
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show information about a CRTC
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Read the ramps of a CRTC
    Get(GetArgs),

    /// Write power-curve ramps to a CRTC
    #[command(name = "set-gamma", visible_alias = "set")]
    SetGamma(SetGammaArgs),

    /// Restore ramps to system settings
    Restore(RestoreArgs),

    /// Decode an EDID from a file or hex text
    Edid(EdidArgs),

    /// Describe an error code
    Error(ErrorArgs),
}

/// Selects a site of a method.
#[derive(Args, Clone)]
struct SiteArgs {
    /// Adjustment method by name or number (default: best available)
    #[arg(short, long)]
    method: Option<String>,

    /// Site identifier (default: the method's default site)
    #[arg(short, long)]
    site: Option<String>,
}

/// Selects one CRTC.
#[derive(Args, Clone)]
struct CrtcArgs {
    #[command(flatten)]
    site: SiteArgs,

    /// Partition index
    #[arg(short, long, default_value = "0")]
    partition: usize,

    /// CRTC index
    #[arg(short, long, default_value = "0")]
    crtc: usize,
}

#[derive(Args)]
struct MethodsArgs {
    /// Listing level: 0 recommended, 1 with fake, 2 real non-fake, 3 real, 4 all
    #[arg(short, long)]
    level: Option<u8>,
}

#[derive(Args)]
struct CapsArgs {
    /// Adjustment method (default: best available)
    method: Option<String>,

    /// Capabilities layout version
    #[arg(long = "layout-version")]
    layout_version: Option<u32>,
}

#[derive(Args)]
struct ListArgs {
    #[command(flatten)]
    site: SiteArgs,
}

#[derive(Args)]
struct InfoArgs {
    #[command(flatten)]
    target: CrtcArgs,

    /// Fields to query, e.g. "ACTIVE|GAMMA_SIZE" or "MACRO_EDID"
    #[arg(short, long, default_value = "ALL")]
    fields: String,

    /// Information layout version
    #[arg(long = "layout-version")]
    layout_version: Option<u32>,
}

#[derive(Args)]
struct GetArgs {
    #[command(flatten)]
    target: CrtcArgs,

    /// Depth to read at: u8, u16, u32, u64, f32, f64 (default: native)
    #[arg(short, long)]
    depth: Option<String>,

    /// Number of evenly spaced stops to print per channel (0 = all)
    #[arg(short = 'n', long, default_value = "8")]
    samples: usize,
}

#[derive(Args)]
struct SetGammaArgs {
    #[command(flatten)]
    target: CrtcArgs,

    /// Gamma of all channels
    #[arg(default_value = "1.0")]
    gamma: f64,

    /// Red channel gamma
    #[arg(long)]
    red: Option<f64>,

    /// Green channel gamma
    #[arg(long)]
    green: Option<f64>,

    /// Blue channel gamma
    #[arg(long)]
    blue: Option<f64>,

    /// Output scale at full input, in [0, 1]
    #[arg(short, long, default_value = "1.0")]
    brightness: f64,
}

#[derive(Args)]
struct RestoreArgs {
    #[command(flatten)]
    site: SiteArgs,

    /// Restore only this partition
    #[arg(short, long)]
    partition: Option<usize>,

    /// Restore only this CRTC of the partition
    #[arg(short, long, requires = "partition")]
    crtc: Option<usize>,
}

#[derive(Args)]
struct EdidArgs {
    /// File holding raw or hex EDID, or hex text
    input: String,
}

#[derive(Args)]
struct ErrorArgs {
    /// Error code or name; omit to list the catalog
    #[arg(allow_hyphen_values = true)]
    code: Option<String>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let owned;
    let registry = match &cli.dummy_config {
        Some(path) => {
            let config = DummyConfig::from_file(path)
                .with_context(|| format!("Failed to load dummy config: {}", path.display()))?;
            owned = MethodRegistry::with_builtin(config);
            &owned
        }
        None => MethodRegistry::global(),
    };

    match cli.command {
        Commands::Methods(args) => commands::methods::run(args, registry, cli.verbose),
        Commands::Caps(args) => commands::caps::run(args, registry, cli.verbose),
        Commands::List(args) => commands::list::run(args, registry, cli.verbose),
        Commands::Info(args) => commands::info::run(args, registry, cli.verbose),
        Commands::Get(args) => commands::get::run(args, registry, cli.verbose),
        Commands::SetGamma(args) => commands::set_gamma::run(args, registry, cli.verbose),
        Commands::Restore(args) => commands::restore::run(args, registry, cli.verbose),
        Commands::Edid(args) => commands::edid::run(args, cli.verbose),
        Commands::Error(args) => commands::error::run(args, cli.verbose),
    }
}
