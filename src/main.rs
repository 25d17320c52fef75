//! Prever CLI - diabetic-retinopathy risk inference server
//!
//! # Commands
//!
//! - `serve` - Start the inference server over a trained model directory
//! - `train` - Fit scaler and classifier from a labeled CSV
//! - `validate` - Score a trained model against a labeled CSV
//! - `info` - Show version info

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use prever::api::{create_router, AppState};
use prever::artifacts::ArtifactBundle;
use prever::error::{PreverError, Result};
use prever::pipeline::Pipeline;
use prever::train::{fit, Dataset, EvalReport, TrainConfig};

/// Prever - diabetic-retinopathy risk prediction service
#[derive(Parser)]
#[command(name = "prever")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the inference server
    ///
    /// Examples:
    ///   prever serve --model-dir ./model
    ///   prever serve --demo --port 9000
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Directory holding the three model artifacts
        #[arg(short, long)]
        model_dir: Option<PathBuf>,

        /// Use the deterministic demo model for testing
        #[arg(long)]
        demo: bool,
    },
    /// Train a model from a labeled CSV
    ///
    /// Examples:
    ///   prever train --data data/diabetic_retinopathy.csv --out ./model
    Train {
        /// Labeled training CSV
        #[arg(short, long)]
        data: PathBuf,

        /// Output directory for the three artifacts
        #[arg(short, long, default_value = "model")]
        out: PathBuf,

        /// Name of the binary target column
        #[arg(long, default_value = "diagnosis")]
        target: String,

        /// Training epochs
        #[arg(long, default_value = "200")]
        epochs: usize,

        /// Learning rate
        #[arg(long, default_value = "0.01")]
        learning_rate: f32,

        /// Seed for shuffling and weight initialization
        #[arg(long, default_value = "42")]
        seed: u64,
    },
    /// Score a trained model against a labeled CSV
    Validate {
        /// Labeled CSV to score
        #[arg(short, long)]
        data: PathBuf,

        /// Directory holding the three model artifacts
        #[arg(short, long, default_value = "model")]
        model_dir: PathBuf,

        /// Name of the binary target column
        #[arg(long, default_value = "diagnosis")]
        target: String,
    },
    /// Show version info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            model_dir,
            demo,
        } => {
            if demo {
                serve(&host, port, AppState::demo()?).await?;
            } else if let Some(dir) = model_dir {
                println!("Loading model artifacts from: {}", dir.display());
                let bundle = ArtifactBundle::load(&dir)?;
                println!(
                    "Loaded model ({} features): {}",
                    bundle.schema.len(),
                    bundle.classifier.architecture()
                );
                serve(&host, port, AppState::new(Pipeline::new(bundle))).await?;
            } else {
                eprintln!("Error: Either --model-dir or --demo must be specified");
                eprintln!();
                eprintln!("Usage:");
                eprintln!("  prever serve --demo                # Use demo model");
                eprintln!("  prever serve --model-dir ./model   # Load trained artifacts");
                std::process::exit(1);
            }
        }
        Commands::Train {
            data,
            out,
            target,
            epochs,
            learning_rate,
            seed,
        } => {
            println!("Loading dataset from: {}", data.display());
            let dataset = Dataset::from_csv(&data, &target)?;
            println!("Dataset: {} rows, {} columns", dataset.len(), dataset.headers.len());

            let config = TrainConfig {
                epochs,
                learning_rate,
                seed,
                ..TrainConfig::default()
            };
            println!(
                "Training MLP (hidden layers {:?}, {} epochs, lr {})...",
                config.hidden, config.epochs, config.learning_rate
            );
            let (bundle, report) = fit(&dataset, &config)?;
            print_report(&report);

            bundle.save(&out)?;
            println!("Artifacts written to: {}", out.display());
        }
        Commands::Validate {
            data,
            model_dir,
            target,
        } => {
            println!("Loading model artifacts from: {}", model_dir.display());
            let bundle = ArtifactBundle::load(&model_dir)?;
            let dataset = Dataset::from_csv(&data, &target)?;
            let report = prever::train::evaluate(&bundle, &dataset)?;
            print_report(&report);
        }
        Commands::Info => {
            println!("prever {}", prever::VERSION);
            println!("Diabetic-retinopathy risk inference server");
        }
    }

    Ok(())
}

fn print_report(report: &EvalReport) {
    println!("Evaluation ({} samples):", report.samples);
    println!("  accuracy:  {:.3}", report.accuracy);
    println!("  precision: {:.3}", report.precision);
    println!("  recall:    {:.3}", report.recall);
}

async fn serve(host: &str, port: u16, state: AppState) -> Result<()> {
    let addr: SocketAddr =
        format!("{host}:{port}")
            .parse()
            .map_err(|e| PreverError::ServerError {
                reason: format!("Invalid address: {e}"),
            })?;

    let app = create_router(state);

    println!("Server listening on http://{addr}");
    println!();
    println!("Endpoints:");
    println!("  GET  /health          - Health check");
    println!("  GET  /metrics         - Prometheus metrics");
    println!("  GET  /api/model-info  - Model metadata");
    println!("  POST /api/predict     - Risk prediction");
    println!();
    println!("Example:");
    println!("  curl http://{addr}/health");
    println!();

    let listener =
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| PreverError::ServerError {
                reason: format!("Failed to bind: {e}"),
            })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| PreverError::ServerError {
            reason: format!("Server error: {e}"),
        })?;

    Ok(())
}
