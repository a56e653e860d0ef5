//! musicmirror CLI entry point

use clap::Parser;
use musicmirror::config::{Cli, Settings};
use musicmirror::{pipeline, MirrorReport};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli);

    let settings = match Settings::from_cli(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match pipeline::run(&settings) {
        Ok(report) => {
            print_summary(&report, settings.dry_run);

            if report.failed() > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(report: &MirrorReport, dry_run: bool) {
    let (transcoded, copied) = if dry_run {
        ("would transcode", "would copy")
    } else {
        ("transcoded", "copied")
    };

    let t = &report.transcode;
    println!(
        "Audio: {} {}, {} up to date, {} failed (of {} total)",
        t.written, transcoded, t.up_to_date, t.failed, t.total
    );

    if let Some(c) = &report.cover_art {
        println!(
            "Cover art: {} {}, {} up to date, {} without album, {} failed (of {} total)",
            c.written, copied, c.up_to_date, c.skipped, c.failed, c.total
        );
    }
}
