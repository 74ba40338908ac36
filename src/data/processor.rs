//! Data Processor Module
//! Turns the loaded export into season-tagged order records and back into a
//! frame for aggregation.

use crate::config::ReportConfig;
use crate::data::record::{OrderRecord, Season};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column '{column}' holds non-numeric values: {source}")]
    NumericParse {
        column: String,
        source: PolarsError,
    },
    #[error("Row {row}: cannot parse created_at value '{value}'")]
    DateParse { row: usize, value: String },
    #[error("Row {row}: quantity {value} is not a non-negative integer")]
    InvalidQuantity { row: usize, value: f64 },
}

/// Counts of rows removed by each cleaning rule.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanStats {
    pub incomplete: usize,
    pub unfulfilled: usize,
    pub out_of_window: usize,
    pub retained: usize,
}

/// Handles data cleaning and transformation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Clean the selected export columns into order records.
    pub fn clean(
        df: &DataFrame,
        config: &ReportConfig,
    ) -> Result<(Vec<OrderRecord>, CleanStats), CleanError> {
        let item_col = df.column("item_id")?.cast(&DataType::String)?;
        let status_col = df.column("status")?.cast(&DataType::String)?;
        let created_col = df.column("created_at")?.cast(&DataType::String)?;
        let category_col = df
            .column(&config.category_column)?
            .cast(&DataType::String)?;
        let price_col = Self::numeric_column(df, "price")?;
        let qty_col = Self::numeric_column(df, "qty_ordered")?;
        // Only checked for presence, its value is recomputed
        let total_col = Self::numeric_column(df, "grand_total")?;
        let discount_col = Self::numeric_column(df, "discount_amount")?;

        let items = item_col.str()?;
        let statuses = status_col.str()?;
        let created = created_col.str()?;
        let categories = category_col.str()?;
        let prices = price_col.f64()?;
        let quantities = qty_col.f64()?;
        let totals = total_col.f64()?;
        let discounts = discount_col.f64()?;

        let mut stats = CleanStats::default();
        let mut records = Vec::new();

        for i in 0..df.height() {
            let (
                Some(item_id),
                Some(status),
                Some(created_at),
                Some(price),
                Some(qty),
                Some(total),
                Some(category),
                Some(discount),
            ) = (
                items.get(i),
                statuses.get(i),
                created.get(i),
                prices.get(i),
                quantities.get(i),
                totals.get(i),
                categories.get(i),
                discounts.get(i),
            )
            else {
                stats.incomplete += 1;
                continue;
            };
            // NaN counts as missing
            if !price.is_finite() || !discount.is_finite() || qty.is_nan() || total.is_nan() {
                stats.incomplete += 1;
                continue;
            }

            let row = i + 1;
            let created_at = Self::parse_timestamp(created_at).ok_or_else(|| {
                CleanError::DateParse {
                    row,
                    value: created_at.to_string(),
                }
            })?;
            if !qty.is_finite() || qty < 0.0 || qty.fract() != 0.0 {
                return Err(CleanError::InvalidQuantity { row, value: qty });
            }

            if !config.is_fulfilled(status) {
                stats.unfulfilled += 1;
                continue;
            }

            let date = created_at.date();
            if !config.in_window(date) {
                stats.out_of_window += 1;
                continue;
            }

            let qty_ordered = qty as i64;
            records.push(OrderRecord {
                item_id: item_id.to_string(),
                status: status.to_string(),
                created_at,
                price,
                qty_ordered,
                grand_total: OrderRecord::computed_grand_total(price, qty_ordered, discount),
                category: category.to_string(),
                discount_amount: discount,
                season: Season::for_date(date, config.season_cutoff),
            });
        }

        stats.retained = records.len();
        info!(
            retained = stats.retained,
            incomplete = stats.incomplete,
            unfulfilled = stats.unfulfilled,
            out_of_window = stats.out_of_window,
            "cleaned order records"
        );
        Ok((records, stats))
    }

    /// Tabular view of cleaned records.
    ///
    /// Output columns: ["item_id", "season", "category_name", "price",
    /// "qty_ordered", "grand_total"]
    pub fn records_frame(records: &[OrderRecord]) -> Result<DataFrame, CleanError> {
        let item_ids: Vec<&str> = records.iter().map(|r| r.item_id.as_str()).collect();
        let seasons: Vec<&str> = records.iter().map(|r| r.season.label()).collect();
        let categories: Vec<&str> = records.iter().map(|r| r.category.as_str()).collect();
        let prices: Vec<f64> = records.iter().map(|r| r.price).collect();
        let quantities: Vec<i64> = records.iter().map(|r| r.qty_ordered).collect();
        let totals: Vec<f64> = records.iter().map(|r| r.grand_total).collect();

        let df = DataFrame::new(vec![
            Column::new("item_id".into(), item_ids),
            Column::new("season".into(), seasons),
            Column::new("category_name".into(), categories),
            Column::new("price".into(), prices),
            Column::new("qty_ordered".into(), quantities),
            Column::new("grand_total".into(), totals),
        ])?;
        debug!(rows = df.height(), "built records frame");

        Ok(df)
    }

    fn numeric_column(df: &DataFrame, name: &str) -> Result<Column, CleanError> {
        df.column(name)?
            .strict_cast(&DataType::Float64)
            .map_err(|source| CleanError::NumericParse {
                column: name.to_string(),
                source,
            })
    }

    fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
        let value = value.trim();
        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }
}
