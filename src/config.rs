//! Report Configuration Module
//! Every constant of the report lives here, loadable from a JSON file.
//!
//! Defaults reproduce the Pakistan e-commerce Q3 2017 vs Q3 2018 report.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding the tracing filter.
pub const LOG_ENV_VAR: &str = "SALES_REPORT_LOG";

/// Largest exported image side, in pixels.
pub const MAX_CANVAS_SIDE: u32 = 8192;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("No input file configured (set input_path or pass --input)")]
    MissingInput,
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Inclusive calendar window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Axis range as `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange(pub f64, pub f64);

/// Presentation settings shared by the renderer and the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub currency_symbol: String,
    pub sales_abs_range: AxisRange,
    pub pct_range: AxisRange,
    pub title: String,
    pub highlight_title: String,
    /// `{category}` is replaced by the highlighted category.
    pub headline: String,
    pub subtitle: String,
    pub category_axis_title: String,
    pub period_label_ly: String,
    pub period_label_ty: String,
    pub author: Option<String>,
    pub data_source: Option<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 800,
            currency_symbol: "₹".to_string(),
            sales_abs_range: AxisRange(-4_000_000.0, 10_000_000.0),
            pct_range: AxisRange(-1.0, 4.0),
            title: "Year on Year Sales Variance by Category for Pakistan Ecommerce Stores"
                .to_string(),
            highlight_title:
                "Year on Year Change in Sales by Category for Pakistan Ecommerce Stores"
                    .to_string(),
            headline: "{category} Experienced Largest Sales Growth...".to_string(),
            subtitle: "E-commerce data from various merchants in Pakistan".to_string(),
            category_axis_title: "Product Category".to_string(),
            period_label_ly: "Q3 2017".to_string(),
            period_label_ty: "Q3 2018".to_string(),
            author: None,
            data_source: Some("Data Source: kaggle.com".to_string()),
        }
    }
}

/// Complete report configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub input_path: Option<PathBuf>,
    pub category_column: String,
    pub fulfilled_statuses: Vec<String>,
    pub last_year_window: DateWindow,
    pub this_year_window: DateWindow,
    /// Records dated on or after this day belong to this year.
    pub season_cutoff: NaiveDate,
    pub highlight_category: String,
    pub unknown_category: String,
    pub high_price_point: f64,
    pub chart: ChartConfig,
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input_path: None,
            category_column: "category_name_1".to_string(),
            fulfilled_statuses: vec![
                "complete".to_string(),
                "received".to_string(),
                "paid".to_string(),
            ],
            last_year_window: DateWindow {
                start: ymd(2017, 6, 1),
                end: ymd(2017, 8, 28),
            },
            this_year_window: DateWindow {
                start: ymd(2018, 6, 1),
                end: ymd(2018, 8, 28),
            },
            season_cutoff: ymd(2018, 1, 1),
            highlight_category: "Mobiles & Tablets".to_string(),
            unknown_category: r"\N".to_string(),
            high_price_point: 40_000.0,
            chart: ChartConfig::default(),
        }
    }
}

impl ReportConfig {
    /// Load a configuration file; omitted keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The configured input path, which is required.
    pub fn input(&self) -> Result<&Path, ConfigError> {
        self.input_path.as_deref().ok_or(ConfigError::MissingInput)
    }

    pub fn is_fulfilled(&self, status: &str) -> bool {
        self.fulfilled_statuses.iter().any(|s| s == status)
    }

    pub fn in_window(&self, date: NaiveDate) -> bool {
        self.last_year_window.contains(date) || self.this_year_window.contains(date)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fulfilled_statuses.is_empty() {
            return Err(ConfigError::Invalid(
                "fulfilled_statuses must not be empty".to_string(),
            ));
        }
        for (name, window) in [
            ("last_year_window", &self.last_year_window),
            ("this_year_window", &self.this_year_window),
        ] {
            if window.start > window.end {
                return Err(ConfigError::Invalid(format!(
                    "{name} starts after it ends ({} > {})",
                    window.start, window.end
                )));
            }
        }
        if !(self.last_year_window.end < self.season_cutoff
            && self.season_cutoff <= self.this_year_window.start)
        {
            return Err(ConfigError::Invalid(format!(
                "season_cutoff {} must fall between the two windows",
                self.season_cutoff
            )));
        }
        for (name, range) in [
            ("sales_abs_range", self.chart.sales_abs_range),
            ("pct_range", self.chart.pct_range),
        ] {
            if range.0 >= range.1 {
                return Err(ConfigError::Invalid(format!(
                    "chart.{name} must be increasing, got [{}, {}]",
                    range.0, range.1
                )));
            }
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ConfigError::Invalid(
                "chart canvas must have a non-zero size".to_string(),
            ));
        }
        if self.chart.width > MAX_CANVAS_SIDE || self.chart.height > MAX_CANVAS_SIDE {
            return Err(ConfigError::Invalid(format!(
                "chart canvas {}x{} exceeds {MAX_CANVAS_SIDE} pixels per side",
                self.chart.width, self.chart.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ReportConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.is_fulfilled("paid"));
        assert!(!config.is_fulfilled("canceled"));
    }

    #[test]
    fn windows_are_inclusive() {
        let config = ReportConfig::default();
        assert!(config.in_window(ymd(2017, 6, 1)));
        assert!(config.in_window(ymd(2018, 8, 28)));
        assert!(!config.in_window(ymd(2018, 8, 29)));
        assert!(!config.in_window(ymd(2017, 12, 1)));
    }

    #[test]
    fn missing_input_is_an_error() {
        let config = ReportConfig::default();
        assert!(matches!(config.input(), Err(ConfigError::MissingInput)));
    }

    #[test]
    fn rejects_cutoff_outside_windows() {
        let config = ReportConfig {
            season_cutoff: ymd(2017, 7, 1),
            ..ReportConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_inverted_axis_range() {
        let mut config = ReportConfig::default();
        config.chart.pct_range = AxisRange(4.0, -1.0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_oversized_canvas() {
        let mut config = ReportConfig::default();
        config.chart.width = 70_000;
        config.chart.height = 70_000;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.chart.width = MAX_CANVAS_SIDE;
        config.chart.height = MAX_CANVAS_SIDE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"input_path": "sales.csv", "highlight_category": "Appliances",
                "chart": {{"width": 1000}}}}"#
        )
        .unwrap();

        let config = ReportConfig::from_file(file.path()).unwrap();
        assert_eq!(config.input().unwrap(), Path::new("sales.csv"));
        assert_eq!(config.highlight_category, "Appliances");
        assert_eq!(config.chart.width, 1000);
        assert_eq!(config.chart.height, 800);
        assert_eq!(config.unknown_category, r"\N");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(
            ReportConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
