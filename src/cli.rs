//! Command line interface

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::constants::{MAX_WORKERS_CAP, SUPPORTED_EXTENSIONS};
use crate::error::SummarizeError;
use crate::extract::OcrEngine;
use crate::pipeline::Summarizer;
use crate::summary::{SummaryMethod, SummaryReport, SummaryType};

#[derive(Parser, Debug)]
#[command(name = "mailsum", author, version, about)]
pub struct Cli {
    /// Config file (defaults to <config dir>/mailsum/config.toml)
    #[arg(long, global = true, env = "MAILSUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summarize one or more .pdf, .eml or .msg files
    Summarize {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Summary length (defaults to summary.default_type from the config)
        #[arg(short = 't', long = "type", value_enum)]
        summary_type: Option<SummaryType>,

        /// Page extraction workers (capped at 8)
        #[arg(short, long)]
        workers: Option<usize>,

        /// API key for this run, overriding config and OPENAI_API_KEY
        #[arg(long)]
        api_key: Option<String>,

        /// Model name, overriding ai.model
        #[arg(long)]
        model: Option<String>,

        /// Never call the LLM; always use the basic summary
        #[arg(long, conflicts_with = "api_key")]
        no_ai: bool,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// List supported formats and optional tooling status
    Formats,

    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::Summarize {
            files,
            summary_type,
            workers,
            api_key,
            model,
            no_ai,
            json,
        } => {
            let mut config = Config::load(cli.config.as_deref())?;
            if let Some(model) = model {
                config.ai.model = model;
            }
            let summary_type = summary_type.unwrap_or(config.summary.default_type);

            let mut summarizer = Summarizer::from_config(config);
            if let Some(workers) = workers {
                summarizer.set_parallel_workers(workers);
            }
            if no_ai {
                summarizer.disable_ai();
            }
            tracing::info!(
                "Summarizing {} file(s) with {} extraction workers",
                files.len(),
                summarizer.parallel_workers()
            );

            let results = summarizer
                .summarize_files(&files, summary_type, api_key.as_deref())
                .await;
            print_results(&files, &results, json)
        }
        Command::Formats => {
            let config = Config::load(cli.config.as_deref())?;
            print_formats(&config);
            Ok(true)
        }
        Command::InitConfig { force } => {
            let path = match cli.config {
                Some(path) => path,
                None => Config::config_path()?,
            };
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
            Config::default()
                .save(&path)
                .with_context(|| format!("Failed to initialize {}", path.display()))?;
            println!("Wrote default configuration to {}", path.display());
            Ok(true)
        }
    }
}

/// Print every result; returns false if any file failed.
fn print_results(
    files: &[PathBuf],
    results: &[std::result::Result<SummaryReport, SummarizeError>],
    json: bool,
) -> Result<bool> {
    let all_ok = results.iter().all(|r| r.is_ok());

    if json {
        let values: Vec<serde_json::Value> = files
            .iter()
            .zip(results)
            .map(|(path, result)| match result {
                Ok(report) => serde_json::to_value(report),
                Err(e) => Ok(serde_json::json!({
                    "success": false,
                    "source": path,
                    "error": e.to_string(),
                })),
            })
            .collect::<std::result::Result<_, _>>()
            .context("Failed to serialize report")?;

        let output = if values.len() == 1 {
            serde_json::to_string_pretty(&values[0])?
        } else {
            serde_json::to_string_pretty(&values)?
        };
        println!("{}", output);
        return Ok(all_ok);
    }

    for (i, (path, result)) in files.iter().zip(results).enumerate() {
        if i > 0 {
            println!();
        }
        match result {
            Ok(report) => print_report(report),
            Err(e) => eprintln!("Error processing {}: {}", path.display(), e),
        }
    }
    Ok(all_ok)
}

fn print_report(report: &SummaryReport) {
    println!("==> {}", report.source.display());
    println!(
        "{} email(s), {} summary ({}), {} chars of text",
        report.email_count,
        report.summary_type,
        match report.method {
            SummaryMethod::Ai => "AI",
            SummaryMethod::Basic => "basic",
        },
        report.raw_text_length
    );
    if let (Some(format), Some(count)) = (report.file_format, report.attachments_count) {
        println!("Format: {}, attachments: {}", format, count);
    }
    println!();
    println!("{}", report.summary);
}

fn print_formats(config: &Config) {
    println!("Supported formats: {}", SUPPORTED_EXTENSIONS.join(", "));
    println!();

    let ocr = OcrEngine::from_config(&config.extract);
    let tool = |path: Option<&std::path::Path>| {
        path.map_or_else(|| "not found".to_string(), |p| p.display().to_string())
    };
    println!("OCR for scanned PDFs:");
    if !config.extract.ocr {
        println!("  disabled in config");
    } else {
        println!("  tesseract: {}", tool(ocr.tesseract()));
        println!("  pdftoppm:  {}", tool(ocr.pdftoppm()));
        if !ocr.is_available() {
            println!("  Install tesseract-ocr and poppler-utils to read image-only PDFs.");
        }
    }
    println!();

    println!("AI summaries:");
    if config.ai.is_enabled() {
        println!("  enabled ({} via {})", config.ai.model, config.ai.base_url);
    } else {
        println!("  no API key; set OPENAI_API_KEY or ai.api_key for AI summaries");
    }
    println!(
        "  extraction workers: {} (max {})",
        config.extract.workers(),
        MAX_WORKERS_CAP
    );
}
