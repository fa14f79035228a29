// Batch pipeline: read tables -> consolidate -> label -> review -> write
pub mod processing;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::domain::{MergedShipment, NormalizedOrderRow};
use crate::infra::{read_cable_codes, read_orders, write_shipments};
use processing::grouping::{GroupingStats, OrderGroupingEngine};
use processing::packaging::{
    CableCodeSet, CableOverrideResolver, CapacityPackagingResolver, PackagingEngine,
};
use processing::review::{self, ReviewItem};

/// Result of a complete batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub input_file: String,
    pub output_file: String,
    pub cable_codes: usize,
    pub stats: GroupingStats,
    pub total_quantity: i64,
    pub total_amount: f64,
    /// Shipments whose label needs a human decision
    pub review: Vec<ReviewItem>,
}

/// Shipments of a batch in output order together with what needs review
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub shipments: Vec<MergedShipment>,
    pub stats: GroupingStats,
    pub review: Vec<ReviewItem>,
}

/// Builds the label resolution chain from the capacity configuration and cable list
pub fn packaging_engine(config: &Config, cables: CableCodeSet) -> Result<PackagingEngine> {
    let capacity = CapacityPackagingResolver::new(config.capacity.clone())
        .context("Invalid capacity configuration")?;
    Ok(PackagingEngine::new(capacity, CableOverrideResolver::new(cables)))
}

/// Runs the in-memory part of the batch; no files are touched.
pub fn process_rows(rows: &[NormalizedOrderRow], engine: &PackagingEngine) -> BatchOutcome {
    let consolidation = OrderGroupingEngine::new(engine).consolidate(rows);
    let review = review::assess(&consolidation.shipments);
    BatchOutcome {
        shipments: consolidation.shipments,
        stats: consolidation.stats,
        review,
    }
}

pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Processes one batch end to end. Any error before the output is written leaves the
    /// output file untouched.
    #[instrument(skip(self), fields(input = %self.config.files.input.display()))]
    pub fn run(&self) -> Result<BatchReport> {
        let started_at = Utc::now();
        let files = &self.config.files;

        let rows = read_orders(&files.input)
            .with_context(|| format!("Failed to read order table {}", files.input.display()))?;
        let cables = read_cable_codes(&files.cables)
            .with_context(|| format!("Failed to read cable list {}", files.cables.display()))?;
        let cable_codes = cables.len();
        if cables.is_empty() {
            warn!("Cable list {} is empty, no cable overrides will apply", files.cables.display());
        }

        let engine = packaging_engine(&self.config, cables)?;
        let outcome = process_rows(&rows, &engine);

        write_shipments(&files.output, &outcome.shipments)
            .with_context(|| format!("Failed to write {}", files.output.display()))?;

        let report = BatchReport {
            started_at,
            input_file: files.input.display().to_string(),
            output_file: files.output.display().to_string(),
            cable_codes,
            stats: outcome.stats,
            total_quantity: outcome.shipments.iter().map(|s| s.quantity).sum(),
            total_amount: outcome.shipments.iter().map(|s| s.amount).sum(),
            review: outcome.review,
        };

        if !report.review.is_empty() {
            warn!("{} shipments need manual review", report.review.len());
        }
        if let Some(report_path) = &files.report {
            write_report(report_path, &report)?;
        }

        info!(
            "Batch finished: {} shipments written to {}",
            report.stats.shipments, report.output_file
        );
        Ok(report)
    }
}

fn write_report(path: &Path, report: &BatchReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    info!("Review report written to {}", path.display());
    Ok(())
}
