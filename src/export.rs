//! Export of rendered figures and the summary table to a folder.

use crate::charts::{ChartVariant, Figure, RenderError, StaticChartRenderer};
use crate::config::ChartConfig;
use crate::report::Report;
use crate::stats::CategorySummary;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create export folder {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to render '{variant}': {source}")]
    Render {
        variant: &'static str,
        source: RenderError,
    },
    #[error("Failed to serialize summary: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Serialize)]
struct SummaryDocument<'a> {
    category_order: &'a [String],
    rows: &'a [CategorySummary],
}

/// Path a variant's PNG is written to inside `dir`.
pub fn figure_path(dir: &Path, variant: ChartVariant) -> PathBuf {
    dir.join(format!("{}.png", variant.file_stem()))
}

/// Write every figure as PNG plus `summary.json`; returns the written paths.
pub fn export_report(
    report: &Report,
    figures: &[Figure],
    dir: &Path,
    chart: &ChartConfig,
) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(figures.len() + 1);
    for figure in figures {
        let bytes = StaticChartRenderer::render_png(figure, chart.width, chart.height).map_err(
            |source| ExportError::Render {
                variant: figure.variant.display_name(),
                source,
            },
        )?;
        let path = figure_path(dir, figure.variant);
        write_file(&path, &bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "wrote figure");
        written.push(path);
    }

    let summary_path = write_summary(report, dir)?;
    written.push(summary_path);

    info!(dir = %dir.display(), files = written.len(), "export complete");
    Ok(written)
}

/// Write the summary table and category order as pretty JSON.
pub fn write_summary(report: &Report, dir: &Path) -> Result<PathBuf, ExportError> {
    let document = SummaryDocument {
        category_order: &report.category_order,
        rows: report.summary.rows(),
    };
    let json = serde_json::to_string_pretty(&document)?;
    let path = dir.join(SUMMARY_FILE);
    write_file(&path, json.as_bytes())?;
    Ok(path)
}

/// Open a file with the system's default application.
pub fn open_path(path: &Path) -> Result<(), ExportError> {
    info!(path = %path.display(), "opening with system viewer");
    open::that(path).map_err(|source| ExportError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    fs::write(path, bytes).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CleanStats;
    use crate::stats::{HighlightCommentary, SeasonRange, SeasonTotals, SummaryTable};

    fn report() -> Report {
        let t = |units, sales| SeasonTotals { units, sales };
        let summary = SummaryTable::new(vec![
            CategorySummary::from_totals("Books", t(10, 1000.0), t(5, 500.0)),
            CategorySummary::from_totals("Beauty", t(0, 0.0), t(3, 300.0)),
        ]);
        Report {
            clean_stats: CleanStats::default(),
            category_order: summary.category_order(),
            summary,
            commentary: HighlightCommentary {
                category: "Books".to_string(),
                high_price_point: 40_000.0,
                last_year: SeasonRange::default(),
                this_year: SeasonRange::default(),
            },
        }
    }

    #[test]
    fn summary_json_keeps_order_and_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_summary(&report(), dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), SUMMARY_FILE);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["category_order"], serde_json::json!(["Books", "Beauty"]));
        let beauty = value["rows"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["category_name"] == "Beauty")
            .unwrap();
        assert!(beauty["sales_variance_pct"].is_null());
        assert_eq!(beauty["sales_variance_abs"], 300.0);
    }

    #[test]
    fn figure_paths_follow_variant_order() {
        let dir = Path::new("out");
        assert_eq!(
            figure_path(dir, ChartVariant::Basic),
            Path::new("out/01_sales_variance.png")
        );
        assert_eq!(
            figure_path(dir, ChartVariant::Infographic),
            Path::new("out/06_infographic.png")
        );
    }

    #[test]
    fn unwritable_folder_is_reported() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = write_summary(&report(), &file.path().join("nested")).unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }));
    }
}
