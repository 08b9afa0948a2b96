//! armaextract - batch extractor for Arma PBO archives

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use armaextract::cli::Args;
use armaextract::config::Config;
use armaextract::{discover, ConsoleReporter, Extractor, PboOpener};

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "armaextract=debug,pbo=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(args: &Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let policy = args.policy(&config);
    tracing::debug!(
        rules = policy.rules.len(),
        minify = policy.minify,
        "extraction policy"
    );

    let tasks = discover(&args.source)?;
    if args.verbose {
        eprintln!("Found {} PBO files", tasks.len());
    }

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output folder {:?}", args.output))?;

    let pb = ProgressBar::new(tasks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let reporter = ConsoleReporter::new(pb.clone());
    let summary = Extractor::new(PboOpener, &policy, &args.output, &reporter)
        .jobs(args.jobs(&config))
        .run(&tasks)?;

    pb.finish_and_clear();

    eprintln!(
        "Extracted: {}, Skipped: {}, Failed: {}",
        summary.extracted(),
        summary.skipped(),
        summary.failed()
    );

    Ok(())
}
