//! Command-line parsing; flags override the configuration file.

use crate::config::ReportConfig;
use clap::Parser;
use std::path::PathBuf;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "sales-yoy-report",
    version,
    about = "Year-on-year category sales report with annotated bar charts"
)]
pub struct Cli {
    /// JSON configuration file; omitted keys keep their defaults.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Sales export CSV (overrides `input_path`).
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Category to highlight (overrides `highlight_category`).
    #[arg(long)]
    pub highlight: Option<String>,

    /// Write every chart as PNG plus summary.json into this folder.
    #[arg(short, long)]
    pub export_dir: Option<PathBuf>,

    /// Open the exported infographic with the system viewer.
    #[arg(long, requires = "export_dir")]
    pub open: bool,

    /// Skip the interactive viewer.
    #[arg(long)]
    pub headless: bool,
}

impl Cli {
    /// Load the configuration file (or defaults) and apply flag overrides.
    pub fn resolve_config(&self) -> Result<ReportConfig, crate::config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => ReportConfig::from_file(path)?,
            None => ReportConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut ReportConfig) {
        if let Some(input) = &self.input {
            config.input_path = Some(input.clone());
        }
        if let Some(highlight) = &self.highlight {
            config.highlight_category = highlight.clone();
        }
    }
}
