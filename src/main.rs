//! maldetect CLI - scan files, train models, export datasets.
//!
//! Usage:
//!   maldetect scan suspicious.bin
//!   maldetect scan suspicious.bin --algo svm --threshold 0.7 --format json
//!   maldetect train --from-csv features.csv --algo rf
//!   maldetect train --benign data/benign --malware data/malware --all
//!   maldetect extract-dataset --benign data/benign --malware data/malware --out features.csv

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use maldetect::dataset::{csv, samples};
use maldetect::{extract, predict, train, DatasetSource, Registry, Verdict};

#[derive(Parser)]
#[command(name = "maldetect")]
#[command(about = "Byte-level malware classification", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a single file
    Scan {
        /// Path to the file to scan
        path: PathBuf,

        /// Which algorithm's artifact to use (rf, dt, svm, nb, mlp)
        #[arg(short, long)]
        algo: Option<String>,

        /// Maliciousness threshold (0.0-1.0)
        #[arg(short, long, default_value_t = maldetect::constants::DEFAULT_THRESHOLD)]
        threshold: f32,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Train one or all classifiers and persist the artifacts
    Train {
        /// Path to a feature CSV with a 'label' column
        #[arg(long, conflicts_with_all = ["benign", "malware"])]
        from_csv: Option<PathBuf>,

        /// Directory of benign samples
        #[arg(long, requires = "malware")]
        benign: Option<PathBuf>,

        /// Directory of malware samples
        #[arg(long, requires = "benign")]
        malware: Option<PathBuf>,

        /// Which algorithm to train (rf, dt, svm, nb, mlp)
        #[arg(short, long, conflicts_with = "all")]
        algo: Option<String>,

        /// Train every supported algorithm
        #[arg(long)]
        all: bool,
    },

    /// Extract features from a benign/malware directory pair into a CSV
    ExtractDataset {
        /// Directory of benign samples
        #[arg(long)]
        benign: PathBuf,

        /// Directory of malware samples
        #[arg(long)]
        malware: PathBuf,

        /// Output CSV path
        #[arg(long)]
        out: PathBuf,
    },
}

fn run(cli: Cli) -> maldetect::CoreResult<()> {
    let registry = Registry::with_default_dir();

    match cli.command {
        Command::Scan {
            path,
            algo,
            threshold,
            format,
        } => {
            let bytes = fs::read(&path)?;
            let vector = extract(&bytes);
            let result = predict(&registry, &vector, algo.as_deref())?;
            let verdict = Verdict::from_probability(result.malicious_probability, threshold);

            match format {
                OutputFormat::Json => {
                    let out = serde_json::json!({
                        "path": path,
                        "label": verdict.as_str(),
                        "malicious_probability": result.malicious_probability,
                        "threshold": threshold,
                        "provenance": result.provenance,
                    });
                    println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
                }
                OutputFormat::Text => {
                    println!("Prediction: {}", verdict);
                    println!("Confidence (malicious): {:.4}", result.malicious_probability);
                    println!(
                        "Model: {} v{} (algo={}, source={})",
                        result.provenance.name,
                        result.provenance.version,
                        result.provenance.algo,
                        result.provenance.source
                    );
                    if result.provenance.source == "fallback" {
                        println!("Warning: no trained artifact - this score is not predictive");
                    }
                }
            }
        }

        Command::Train {
            from_csv,
            benign,
            malware,
            algo,
            all,
        } => {
            let source = match (from_csv, benign, malware) {
                (Some(path), _, _) => DatasetSource::Csv(path),
                (None, Some(benign_dir), Some(malware_dir)) => DatasetSource::Samples {
                    benign_dir,
                    malware_dir,
                },
                _ => DatasetSource::Samples {
                    benign_dir: PathBuf::from("data/samples/benign"),
                    malware_dir: PathBuf::from("data/samples/malware"),
                },
            };

            let reports = train(&registry, &source, algo.as_deref(), all)?;
            for report in reports {
                println!("\n=== {} ===", report.algo.to_uppercase());
                println!("Model saved to: {}", report.model_path.display());
                println!("\nClassification report:\n");
                println!("{}", report.report);
            }
        }

        Command::ExtractDataset {
            benign,
            malware,
            out,
        } => {
            let rows = samples::collect(&benign, &malware);
            if rows.is_empty() {
                return Err(maldetect::CoreError::InvalidDataset(
                    "no data extracted; check directories".to_string(),
                ));
            }
            csv::write_features(&out, &rows)?;
            println!("Wrote {} rows to {}", rows.len(), out.display());
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
