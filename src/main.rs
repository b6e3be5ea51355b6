//! `branch-splitr` — normalize company names in license records and split them by branch ID.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and start logging ([`logging`]).
//! 2. Load the run config ([`config::load_config`]) and apply CLI overrides.
//! 3. Read the pipe-delimited batch ([`ingest`]).
//! 4. Normalize, sort and partition it ([`pipeline`]).
//! 5. Write `output_with_id.txt` / `output_without_id.txt`, loose or zipped ([`export`]).
//! 6. Render the requested report ([`report`]).
//!
//! Any failure aborts the whole batch; output files only appear once both are complete.

mod cli;
mod config;
mod detector;
mod error;
mod export;
mod ingest;
mod logging;
mod models;
mod normalize;
mod pipeline;
mod report;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use cli::{Cli, ReportFormat};
use config::{load_config, Config};
use export::Blobs;
use models::RunSummary;
use pipeline::Pipeline;

/// Batches smaller than this finish too fast to be worth a progress bar.
const PROGRESS_THRESHOLD: usize = 10_000;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    // Configuration is fixed before the first record is read
    let cwd = std::env::current_dir()?;
    let mut config = load_config(&cwd, cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);

    let pipeline = Pipeline::new(&config)?;
    tracing::debug!(
        strategy = %config.normalize.strategy,
        scope = %config.normalize.scope,
        reinsert = %config.normalize.reinsert,
        id_pattern = %config.id_pattern(),
        "resolved configuration"
    );

    let batch = ingest::read_batch(&cli.input)?;
    if !cli.quiet {
        eprintln!(
            "  {} {} records from {}",
            "→".cyan(),
            batch.len(),
            cli.input.display()
        );
    }

    let pb = if !cli.quiet && batch.len() >= PROGRESS_THRESHOLD {
        let pb = ProgressBar::new(batch.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let partition = pipeline.run(batch, pb.as_ref())?;

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    // Render both blobs before writing either, so a failure leaves nothing behind
    let blobs = Blobs::render(&partition)?;
    let outputs = match &cli.zip {
        Some(path) => vec![export::write_archive(&blobs, path)?],
        None => export::write_files(&blobs, &cli.out)?,
    };

    let summary = RunSummary {
        input: cli.input.display().to_string(),
        strategy: config.normalize.strategy,
        scope: config.normalize.scope,
        reinsert: config.normalize.reinsert,
        id_pattern: pipeline.detector().pattern(),
        total: partition.total(),
        with_id: partition.with_id.len(),
        without_id: partition.without_id.len(),
        outputs: outputs.iter().map(|p| p.display().to_string()).collect(),
    };

    match cli.report {
        ReportFormat::Terminal => {
            report::terminal::render(
                &summary,
                &partition,
                pipeline.detector(),
                cli.verbose > 0,
                cli.quiet,
            )?;
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

/// CLI flags win over the config file.
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(strategy) = &cli.strategy {
        config.normalize.strategy = strategy.into();
    }
    if let Some(scope) = &cli.scope {
        config.normalize.scope = scope.into();
    }
    if let Some(reinsert) = &cli.reinsert {
        config.normalize.reinsert = reinsert.into();
    }
    if let Some(pattern) = cli.id_pattern {
        config.detect.id_pattern = Some(pattern);
    }
}
