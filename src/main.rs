// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::io;
use std::path::PathBuf;

use anyhow::{bail, Result};
use keyscan::calibration::TerminalPrompt;
use keyscan::{Config, Pipeline};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!("KEYSCAN - Piano visualizer video to MIDI");
    println!();
    println!("Usage: keyscan [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <FILE>   Load settings from a YAML or TOML file");
    println!("  --show-config     Print the effective configuration and exit");
    println!("  --verbose         Log every captured line");
    println!("  --help            Show this help message");
    println!();
    println!("Delete the capture file (default midi-capture.json) to record again.");
}

struct Options {
    config: Option<PathBuf>,
    show_config: bool,
    verbose: bool,
}

fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut options = Options {
        config: None,
        show_config: false,
        verbose: false,
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => match iter.next() {
                Some(path) => options.config = Some(PathBuf::from(path)),
                None => bail!("--config requires a file path"),
            },
            "--show-config" => options.show_config = true,
            "--verbose" | "-v" => options.verbose = true,
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            other => {
                print_usage();
                bail!("Unknown option: {}", other);
            }
        }
    }

    Ok(Some(options))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let Some(options) = parse_args(&args)? else {
        return Ok(());
    };

    let config = match &options.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if options.show_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    init_logging(options.verbose);

    let pipeline = Pipeline::new(config);
    let mut prompt = TerminalPrompt::new(io::stdin().lock(), io::stdout());

    let stop = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Stopping capture early"),
            Err(_) => std::future::pending::<()>().await,
        }
    };
    let summary = pipeline.run(&mut prompt, stop).await?;

    info!(
        "File {} written to disk ({} notes from {} lines{})",
        summary.output_file.display(),
        summary.notes,
        summary.lines,
        if summary.replayed { ", replayed from cache" } else { "" }
    );
    Ok(())
}
