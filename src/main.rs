//! CLI entry point for `listunpack`.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use listunpack::unpack;

#[derive(Parser)]
#[command(
    name = "listunpack",
    version,
    about = "Unpack a LISTSERV .log directory into emails"
)]
struct Cli {
    /// Directory containing listserv .log files
    logdir: PathBuf,

    /// Directory to contain the unpacked emails
    outdir: PathBuf,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if !cli.logdir.is_dir() {
        anyhow::bail!("Log directory not found: {}", cli.logdir.display());
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Unpacking [{bar:40.cyan/blue}] {pos}/{len} files")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let stats = unpack::unpack_directory(
        &cli.logdir,
        &cli.outdir,
        Some(&|current, total| {
            pb.set_length(total);
            pb.set_position(current);
        }),
    )?;
    pb.finish_and_clear();
    let elapsed = start.elapsed();

    println!();
    println!("  {:<20} {}", "Log files", stats.files);
    println!("  {:<20} {}", "Messages unpacked", stats.messages_written);
    println!("  {:<20} {}", "Messages skipped", stats.messages_skipped);
    println!("  {:<20} {}", "Manifest", cli.outdir.join("emails.csv").display());
    println!("  {:<20} {:.2?}", "Elapsed", elapsed);
    println!();

    Ok(())
}

/// Set up tracing with an env-filtered stderr layer.
///
/// Defaults to `info` so part-decode diagnostics stay visible; `-v` raises
/// the level, `RUST_LOG` overrides everything.
fn setup_logging(verbose: u8) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let level = match verbose {
        0 => "info",
        1 => "listunpack=debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}
