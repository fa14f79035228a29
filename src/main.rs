use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use shipment_packer::config::Config;
use shipment_packer::infra::read_cable_codes;
use shipment_packer::logging;
use shipment_packer::pipeline::processing::annotation::{prepare_label, ShippingMethod};
use shipment_packer::pipeline::processing::packaging::{CableCodeSet, LabelResolver};
use shipment_packer::pipeline::{packaging_engine, Pipeline};

#[derive(Parser)]
#[command(name = "shipment_packer")]
#[command(about = "Merge marketplace orders into shipments and pick their packaging")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file (defaults to packer.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the normalized order table into labeled shipments
    Merge {
        /// Normalized order table
        #[arg(long)]
        input: Option<PathBuf>,
        /// Merged shipment table to write
        #[arg(long)]
        output: Option<PathBuf>,
        /// Cable item code list
        #[arg(long)]
        cables: Option<PathBuf>,
        /// Write a JSON review report here
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Resolve the packaging of a single annotation string
    Resolve {
        annotation: String,
        /// Cable item code list; without it no cable override applies
        #[arg(long)]
        cables: Option<PathBuf>,
    },
    /// Turn a raw marketplace SKU into an annotation
    Prepare {
        label: String,
        /// Platform tag, e.g. SP, NG, KG, C
        #[arg(long)]
        platform: String,
        /// Marketplace shipping service text
        #[arg(long, default_value = "")]
        shipping: String,
        /// Order amount, used for the tracking threshold
        #[arg(long, default_value_t = 0.0)]
        amount: f64,
        /// Line quantity applied to items without a multiplier
        #[arg(long, default_value_t = 1)]
        quantity: i64,
    },
}

fn main() -> Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Merge {
            input,
            output,
            cables,
            report,
        } => {
            if let Some(input) = input {
                config.files.input = input;
            }
            if let Some(output) = output {
                config.files.output = output;
            }
            if let Some(cables) = cables {
                config.files.cables = cables;
            }
            if report.is_some() {
                config.files.report = report;
            }

            let pipeline = Pipeline::new(config);
            match pipeline.run() {
                Ok(report) => {
                    println!("Shipments: {}", report.stats.shipments);
                    println!("   Order rows: {}", report.stats.input_rows);
                    println!("   Propagated rows: {}", report.stats.propagated_rows);
                    println!("   Summary rows nullified: {}", report.stats.nullified_rows);
                    println!("   Needs review: {}", report.review.len());
                    for item in &report.review {
                        println!("   - {} ({}): {}", item.ids, item.recipient, item.annotation);
                    }
                    println!("   Output file: {}", report.output_file);
                }
                Err(e) => {
                    error!("Batch failed: {:#}", e);
                    return Err(e);
                }
            }
        }
        Commands::Resolve { annotation, cables } => {
            let cables = match cables {
                Some(path) => read_cable_codes(&path)?,
                None => CableCodeSet::default(),
            };
            let engine = packaging_engine(&config, cables)?;
            let outcome = engine.resolve_label(&annotation);
            info!("Resolved '{}' to {}", annotation, outcome.decision);
            println!("{}", outcome.annotation);
        }
        Commands::Prepare {
            label,
            platform,
            shipping,
            amount,
            quantity,
        } => {
            let method =
                ShippingMethod::from_marketplace(&shipping, amount, config.labels.tracking_amount);
            println!("{}", prepare_label(&label, &platform, method, quantity));
        }
    }

    Ok(())
}
