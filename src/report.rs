//! Report pipeline: load, clean, aggregate, then describe the figures.

use crate::charts::{Figure, FigureBuilder};
use crate::config::{ConfigError, ReportConfig};
use crate::data::{CleanError, CleanStats, DataLoader, DataProcessor, LoaderError};
use crate::stats::{AggregateError, HighlightCommentary, SummaryCalculator, SummaryTable};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Load: {0}")]
    Load(#[from] LoaderError),
    #[error("Clean: {0}")]
    Clean(#[from] CleanError),
    #[error("Aggregate: {0}")]
    Aggregate(#[from] AggregateError),
}

/// Everything the presentation layer needs from one run.
#[derive(Debug, Clone)]
pub struct Report {
    pub clean_stats: CleanStats,
    pub summary: SummaryTable,
    /// Category-axis order, bottom to top.
    pub category_order: Vec<String>,
    pub commentary: HighlightCommentary,
}

impl Report {
    pub fn record_count(&self) -> usize {
        self.clean_stats.retained
    }

    pub fn figures(&self, config: &ReportConfig) -> Vec<Figure> {
        FigureBuilder::new(
            &self.summary,
            &self.category_order,
            &self.commentary,
            config,
        )
        .build_all()
    }
}

/// Run the batch pipeline once over the configured input.
pub fn build_report(config: &ReportConfig) -> Result<Report, ReportError> {
    config.validate()?;
    let input = config.input()?;

    let loader = DataLoader::new(&config.category_column);
    let raw = loader.load_csv(input)?;
    let (records, clean_stats) = DataProcessor::clean(&raw, config)?;
    let frame = DataProcessor::records_frame(&records)?;

    let summary = SummaryCalculator::aggregate(&frame, config)?;
    let category_order = summary.category_order();
    let commentary = HighlightCommentary::compute(&frame, config)?;

    if summary.get(&config.highlight_category).is_none() {
        warn!(
            category = %config.highlight_category,
            "highlighted category has no fulfilled orders in either window"
        );
    }
    info!(
        records = clean_stats.retained,
        categories = summary.len(),
        "report ready"
    );

    Ok(Report {
        clean_stats,
        summary,
        category_order,
        commentary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartVariant;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "item_id,status,created_at,price,qty_ordered,grand_total,category_name_1,discount_amount";

    fn write_csv(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn config_for(file: &NamedTempFile) -> ReportConfig {
        ReportConfig {
            input_path: Some(file.path().to_path_buf()),
            ..ReportConfig::default()
        }
    }

    #[test]
    fn end_to_end_report() {
        let file = write_csv(&[
            "1,complete,2017-07-01 10:00:00,100,10,0,Mobiles & Tablets,0",
            "2,complete,2018-07-01 10:00:00,400,5,0,Mobiles & Tablets,0",
            "3,canceled,2018-07-02 10:00:00,999,1,999,Mobiles & Tablets,0",
            "4,received,2017-07-03,50,2,100,Books,0",
            "5,paid,2018-07-03,50,1,50,Books,0",
            r"6,complete,2018-07-04,10,1,10,\N,0",
            "7,complete,2018-01-15,10,1,10,Books,0",
            "8,complete,2018-07-05,20,3,60,Beauty,",
        ]);
        let report = build_report(&config_for(&file)).unwrap();

        assert_eq!(report.clean_stats.incomplete, 1);
        assert_eq!(report.clean_stats.unfulfilled, 1);
        assert_eq!(report.clean_stats.out_of_window, 1);
        assert_eq!(report.record_count(), 5);

        let mobiles = report.summary.get("Mobiles & Tablets").unwrap();
        assert_eq!(mobiles.sales_ly, 1000.0);
        assert_eq!(mobiles.sales_ty, 2000.0);
        assert_eq!(mobiles.avg_rsp_variance_abs, Some(300.0));
        assert_eq!(mobiles.avg_rsp_variance_pct, Some(3.0));
        assert!(report.summary.get(r"\N").is_none());

        assert_eq!(report.category_order, vec!["Books", "Mobiles & Tablets"]);
        assert_eq!(report.commentary.last_year.range_size, 1);
        assert_eq!(report.commentary.this_year.range_size, 1);

        let figures = report.figures(&config_for(&file));
        assert_eq!(figures.len(), ChartVariant::ALL.len());
    }

    #[test]
    fn missing_input_path_is_a_config_error() {
        let result = build_report(&ReportConfig::default());
        assert!(matches!(
            result,
            Err(ReportError::Config(ConfigError::MissingInput))
        ));
    }

    #[test]
    fn absent_file_is_a_load_error() {
        let config = ReportConfig {
            input_path: Some("/definitely/not/here.csv".into()),
            ..ReportConfig::default()
        };
        let err = build_report(&config).unwrap_err();
        assert!(matches!(err, ReportError::Load(LoaderError::InputMissing(_))));
        assert!(err.to_string().starts_with("Load:"));
    }

    #[test]
    fn bad_date_is_a_clean_error() {
        let file = write_csv(&["1,complete,yesterday,100,1,100,Books,0"]);
        let err = build_report(&config_for(&file)).unwrap_err();
        assert!(matches!(err, ReportError::Clean(CleanError::DateParse { row: 1, .. })));
    }
}
