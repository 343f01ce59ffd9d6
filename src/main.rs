//! ogn CLI - Node Descriptor Validation
//!
//! Checks `.ogn` descriptor files and prints every diagnostic found.

use anyhow::Context;
use clap::{Parser, Subcommand};
use ogn::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "ogn")]
#[command(version, about = "Node descriptor validator", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate descriptor files or directories of them.
    Check {
        /// Files, or directories searched for `*.ogn`.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Treat warnings as failures.
        #[arg(long)]
        strict: bool,

        /// TOML file with validation options.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print results as JSON, including the normalized model.
        #[arg(long)]
        json: bool,

        /// Validate files one at a time.
        #[arg(long)]
        sequential: bool,
    },

    /// List the attribute type strings the grammar accepts.
    Types {
        /// Include the union group names.
        #[arg(long)]
        unions: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.cmd {
        Commands::Check {
            paths,
            strict,
            config,
            json,
            sequential,
        } => check(&paths, strict, config, json, sequential),
        Commands::Types { unions } => {
            list_types(unions);
            Ok(BatchStatus::Accepted)
        }
    };

    match result {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn check(
    paths: &[PathBuf],
    strict: bool,
    config: Option<PathBuf>,
    json: bool,
    sequential: bool,
) -> anyhow::Result<BatchStatus> {
    let mut options = match &config {
        Some(path) => ValidationOptions::from_toml_file(path)
            .with_context(|| format!("loading options from {}", path.display()))?,
        None => ValidationOptions::default(),
    };
    options.strict |= strict;
    if sequential {
        options.parallel = false;
    }
    let strict = options.strict;

    let files = collect_descriptor_files(paths)?;
    if files.is_empty() {
        anyhow::bail!("no descriptor files found");
    }

    let pipeline = ValidationPipeline::default_pipeline().with_options(options);
    let report = validate_batch(&pipeline, &files);

    if json {
        print_json(&report, strict)?;
    } else {
        print_text(&report, strict);
    }

    Ok(report.status(strict))
}

fn print_text(report: &BatchReport, strict: bool) {
    for file in &report.files {
        match &file.result {
            Ok(outcome) => {
                let status = if outcome.is_accepted(strict) { "ok" } else { "FAILED" };
                println!(
                    "{}: {} ({}, {} node(s))",
                    file.path.display(),
                    status,
                    outcome.report.summary(),
                    outcome.model.len()
                );
                for line in outcome.report.detailed() {
                    println!("  {}", line);
                }
            }
            Err(e) => println!("{}: FAILED ({})", file.path.display(), e),
        }
    }

    println!();
    println!(
        "{} of {} file(s) accepted",
        report.accepted(strict),
        report.len()
    );
}

fn print_json(report: &BatchReport, strict: bool) -> anyhow::Result<()> {
    let files: Vec<serde_json::Value> = report
        .files
        .iter()
        .map(|file| match &file.result {
            Ok(outcome) => serde_json::json!({
                "path": file.path,
                "accepted": outcome.is_accepted(strict),
                "diagnostics": outcome.report.diagnostics,
                "model": outcome.model,
            }),
            Err(e) => serde_json::json!({
                "path": file.path,
                "accepted": false,
                "error": e.to_string(),
            }),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&files)?);
    Ok(())
}

fn list_types(unions: bool) {
    for token in TypeToken::all_concrete() {
        println!("{}", token);
    }
    if unions {
        for group in UnionGroup::all() {
            println!("{}", TypeToken::UnionGroup(group));
        }
    }
}
