/// YXDB command-line tool: inspect, validate and dump `.yxdb` files.
///
/// # Command overview
///
/// ```text
/// yxdb <COMMAND> [OPTIONS]
///
/// Commands:
///   inspect    Print header fields, record layout and the field table
///   schema     Print the metadata XML exactly as the reader parsed it
///   validate   Stream every record and check the declared count
///   dump       Print records as hex (text or JSON lines)
///   help       Print help information
///
/// Global options:
///   -v, --verbose     Debug logging on stderr
///   --no-prefetch     Read blocks on the main thread
///   -h, --help        Print help
///   -V, --version     Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                      |
/// |------|----------------------------------------------|
/// | 0    | Success                                      |
/// | 1    | Error (I/O failure, invalid file, mismatch)  |
///
/// Errors and logs go to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use yxdb_reader::{PrefetchMode, ReaderConfig};

mod cmd_dump;
mod cmd_inspect;
mod cmd_schema;
mod cmd_validate;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The YXDB command-line tool.
#[derive(Parser)]
#[command(name = "yxdb", version, about = "Streaming YXDB file reader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (overrides `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read blocks inline instead of on a background thread.
    #[arg(long, global = true)]
    no_prefetch: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print header fields, record layout and the field table.
    Inspect(FileArgs),
    /// Print the metadata XML.
    Schema(FileArgs),
    /// Stream every record and check the declared record count.
    Validate(FileArgs),
    /// Print records as length + hex.
    Dump(DumpArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments shared by the commands that only need a file.
#[derive(clap::Args)]
pub struct FileArgs {
    /// Path to the `.yxdb` file.
    pub file: PathBuf,
}

/// Arguments for `yxdb dump`.
///
/// ```text
/// ┌────────────┬─────────────────────────────────────────────────┐
/// │ Flag       │ Effect                                          │
/// ├────────────┼─────────────────────────────────────────────────┤
/// │ --offset N │ Skip the first N records                        │
/// │ --limit N  │ Print at most N records                         │
/// │ --json     │ One JSON object per line instead of text        │
/// └────────────┴─────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct DumpArgs {
    /// Path to the `.yxdb` file.
    pub file: PathBuf,

    /// Number of records to skip before printing.
    #[arg(long, default_value_t = 0)]
    pub offset: u64,

    /// Maximum number of records to print.
    #[arg(long)]
    pub limit: Option<u64>,

    /// Emit JSON lines (`{"index":..,"len":..,"long":..,"hex":".."}`).
    #[arg(long)]
    pub json: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ReaderConfig {
        prefetch: if cli.no_prefetch {
            PrefetchMode::Inline
        } else {
            PrefetchMode::Background
        },
    };

    let result = match cli.command {
        Commands::Inspect(args) => cmd_inspect::run(&args, config),
        Commands::Schema(args) => cmd_schema::run(&args, config),
        Commands::Validate(args) => cmd_validate::run(&args, config),
        Commands::Dump(args) => cmd_dump::run(&args, config),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
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
