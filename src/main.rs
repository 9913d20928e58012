//! credit-scan - find reference names in a video's on-screen credits.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::error;

use credit_scan::api::{CreditScanner, ScanSummary};
use credit_scan::core::matching::ReferenceMode;
use credit_scan::core::{NerBackend, PipelineConfig, ScanError};

/// Cannot open input file (EX_NOINPUT).
const EXIT_INPUT_ERROR: u8 = 66;
const EXIT_FAILURE: u8 = 1;

#[derive(Parser)]
#[command(name = "credit-scan")]
#[command(version, about = "Match names shown on screen in a video against a reference list", long_about = None)]
struct Cli {
    /// Video file to scan
    #[arg(value_name = "VIDEO")]
    video: PathBuf,

    /// Reference name list, one name or token per line
    #[arg(short, long, value_name = "FILE")]
    reference: PathBuf,

    /// Copy the report here (defaults to leaving it in the run's outputs dir)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// JSON pipeline config; flags below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Frames sampled per second of video
    #[arg(long)]
    fps: Option<f64>,

    /// OCR language code
    #[arg(long)]
    lang: Option<String>,

    /// Binary threshold cutoff (0-255)
    #[arg(long)]
    threshold: Option<u8>,

    /// Entity service endpoint (POST {"text"}, reply {"entities"}). Recommended:
    /// without it a crude offline tagger treats every Title Case run as a person
    #[arg(long, value_name = "URL")]
    ner_url: Option<String>,

    /// Keep reference lines as an ordered list of full names
    #[arg(long)]
    full_names: bool,

    /// Parent directory for per-run workspaces
    #[arg(long, value_name = "DIR")]
    work_dir: Option<PathBuf>,

    /// Also write the raw extracted names next to the report
    #[arg(long)]
    keep_extracted: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    credit_scan::init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("❌ {:#}", err);
            let is_input = err
                .chain()
                .any(|cause| matches!(cause.downcast_ref::<ScanError>(), Some(ScanError::Input(_))));
            if is_input {
                ExitCode::from(EXIT_INPUT_ERROR)
            } else {
                ExitCode::from(EXIT_FAILURE)
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;
    let scanner = CreditScanner::create(config).context("failed to set up scanner")?;

    let summary = scanner
        .scan_file(cli.video.clone(), &cli.reference)
        .with_context(|| format!("scan of {:?} failed", cli.video))?;

    if let Some(output) = &cli.output {
        std::fs::copy(&summary.report_path, output)
            .with_context(|| format!("failed to copy report to {:?}", output))?;
    }

    print_summary(&summary, cli.output.as_ref(), cli.json)
}

fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {:?}", path))?,
        None => PipelineConfig::default(),
    };

    if let Some(fps) = cli.fps {
        config.sampling_rate = fps;
    }
    if let Some(lang) = &cli.lang {
        config.language = lang.clone();
    }
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    if let Some(url) = &cli.ner_url {
        config.ner = NerBackend::Http {
            endpoint: url.clone(),
        };
    }
    if cli.full_names {
        config.reference_mode = ReferenceMode::FullNames;
    }
    if let Some(dir) = &cli.work_dir {
        config.work_root = dir.clone();
    }
    if cli.keep_extracted {
        config.write_extracted_names = true;
    }

    config.validate()?;
    Ok(config)
}

fn print_summary(summary: &ScanSummary, copied_to: Option<&PathBuf>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("Run {}: {} frames, {} names extracted", summary.run_id, summary.frame_count, summary.extracted_count);
    if summary.rows.is_empty() {
        println!("No common names found.");
    } else {
        println!("Common names ({}):", summary.rows.len());
        for row in &summary.rows {
            println!("  {}", row);
        }
    }
    println!("Report: {}", copied_to.unwrap_or(&summary.report_path).display());
    Ok(())
}
