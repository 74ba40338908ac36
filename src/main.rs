//! Sales YoY Report - Category Sales Variance & Annotated Bar Chart Viewer
//!
//! Loads a sales export, compares two seasonal windows per product category
//! and presents the result as six progressively refined bar charts.

mod charts;
mod cli;
mod config;
mod data;
mod export;
mod gui;
mod report;
mod stats;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use eframe::egui;
use gui::ReportApp;
use tracing::info;
use tracing_subscriber::prelude::*;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(config::LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = cli.resolve_config()?;
    let report = report::build_report(&config)?;

    if let Some(dir) = &cli.export_dir {
        let figures = report.figures(&config);
        export::export_report(&report, &figures, dir, &config.chart)
            .with_context(|| format!("exporting to {}", dir.display()))?;
        if cli.open {
            export::open_path(&export::figure_path(dir, charts::ChartVariant::Infographic))?;
        }
    }

    if cli.headless {
        info!("headless run finished");
        return Ok(());
    }

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1200.0, 700.0])
            .with_title("Sales YoY Report"),
        ..Default::default()
    };

    let export_dir = cli.export_dir.clone();
    eframe::run_native(
        "Sales YoY Report",
        options,
        Box::new(move |cc| Ok(Box::new(ReportApp::new(cc, config, report, export_dir)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}
