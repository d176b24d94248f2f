//! filetree - catalog merged directory trees for provisioning.
//!
//! Usage:
//!   filetree <ROOT>...                 List entries of the merged trees
//!   filetree --format json <ROOT>...   Emit the catalog as JSON
//!   filetree --help                    Show help

use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use filetree_scan::{Catalog, EntryKind, ScanConfig, SecurityCapability, TreeScanner, security};

#[derive(Parser)]
#[command(
    name = "filetree",
    version,
    about = "Catalog merged directory trees with ownership and permissions",
    long_about = "filetree walks each ROOT in order and lists every file, directory and \
                  symlink beneath them.\n\n\
                  When several roots contain the same relative path, the first root wins, \
                  so later roots act as fallbacks for earlier ones."
)]
struct Cli {
    /// Roots to scan, highest priority first
    #[arg(required = true)]
    roots: Vec<PathBuf>,

    /// Resolve relative roots against this directory
    #[arg(short, long)]
    base_dir: Option<PathBuf>,

    /// Sort entries by name within each directory
    #[arg(short, long)]
    sort: bool,

    /// Threads used to read directories (1 = serial, 0 = auto-detect)
    #[arg(short = 'j', long, default_value = "1")]
    threads: usize,

    /// Never query SELinux contexts
    #[arg(long)]
    no_selinux: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let security = if cli.no_selinux {
        SecurityCapability::Disabled
    } else {
        security::probe()
    };

    let config = ScanConfig::builder()
        .roots(cli.roots)
        .base_dir(cli.base_dir)
        .security(security)
        .sort(cli.sort)
        .threads(cli.threads)
        .build()
        .context("Invalid scan configuration")?;

    tracing::info!(roots = ?config.resolved_roots(), ?security, "scanning");
    let catalog = TreeScanner::new().scan(&config);

    let rendered = match cli.format {
        OutputFormat::Text => render_text(&catalog),
        OutputFormat::Json => serde_json::to_string_pretty(&catalog.records)?,
    };

    match cli.output {
        Some(output_path) => {
            std::fs::write(&output_path, rendered)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            eprintln!("Wrote {} entries to {}", catalog.len(), output_path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{rendered}")?;
        }
    }

    print_summary(&catalog);

    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the `-v` level.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// One line per record.
fn render_text(catalog: &Catalog) -> String {
    let mut out = String::new();
    for record in catalog {
        let link = match &record.kind {
            EntryKind::Link { src } => format!(" -> {}", src.display()),
            _ => String::new(),
        };
        out.push_str(&format!(
            "{:<9} {:>5} {:<17} {:>10} {} {}{}\n",
            record.state(),
            record.mode,
            format!("{}:{}", record.owner, record.group),
            format_size(record.size),
            format_time(record.mtime),
            record.path.display(),
            link
        ));
    }
    out.truncate(out.trim_end().len());
    out
}

fn print_summary(catalog: &Catalog) {
    let stats = &catalog.stats;
    eprintln!(
        "{} files, {} directories, {} links ({}) from {} root(s), {} shadowed, in {:.2}s",
        stats.total_files,
        stats.total_dirs,
        stats.total_links,
        format_size(stats.total_size),
        catalog.roots.len(),
        stats.shadowed,
        catalog.scan_duration.as_secs_f64()
    );
    if catalog.has_warnings() {
        eprintln!("{} warning(s) during scan", catalog.warnings.len());
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Format fractional epoch seconds as RFC 3339.
fn format_time(epoch: f64) -> String {
    let secs = epoch.floor() as i64;
    let nanos = ((epoch - epoch.floor()) * 1e9) as u32;
    DateTime::<Utc>::from_timestamp(secs, nanos)
        .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
        .unwrap_or_else(|| "-".to_string())
}
