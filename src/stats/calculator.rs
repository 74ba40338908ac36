//! Summary Calculator Module
//! Aggregates season-tagged records into one year-on-year row per category.

use crate::config::ReportConfig;
use crate::data::Season;
use polars::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Summed volume for one category in one season.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SeasonTotals {
    pub units: i64,
    pub sales: f64,
}

impl SeasonTotals {
    /// Average selling price, missing when nothing was sold.
    pub fn avg_rsp(&self) -> Option<f64> {
        if self.units == 0 {
            None
        } else {
            Some(self.sales / self.units as f64)
        }
    }
}

/// Year-on-year metrics for one product category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category_name: String,
    pub items_ord_ly: i64,
    pub items_ord_ty: i64,
    pub sales_ly: f64,
    pub sales_ty: f64,
    pub avg_rsp_ly: Option<f64>,
    pub avg_rsp_ty: Option<f64>,
    pub items_ord_variance_abs: i64,
    pub items_ord_variance_pct: Option<f64>,
    pub sales_variance_abs: f64,
    pub sales_variance_pct: Option<f64>,
    pub avg_rsp_variance_abs: Option<f64>,
    pub avg_rsp_variance_pct: Option<f64>,
}

impl CategorySummary {
    pub fn from_totals(category_name: &str, ly: SeasonTotals, ty: SeasonTotals) -> Self {
        let avg_rsp_ly = ly.avg_rsp();
        let avg_rsp_ty = ty.avg_rsp();
        let items_ord_variance_abs = ty.units - ly.units;
        let sales_variance_abs = ty.sales - ly.sales;
        let avg_rsp_variance_abs = match (avg_rsp_ty, avg_rsp_ly) {
            (Some(t), Some(l)) => Some(t - l),
            _ => None,
        };

        Self {
            category_name: category_name.to_string(),
            items_ord_ly: ly.units,
            items_ord_ty: ty.units,
            sales_ly: ly.sales,
            sales_ty: ty.sales,
            avg_rsp_ly,
            avg_rsp_ty,
            items_ord_variance_abs,
            items_ord_variance_pct: pct_change(
                Some(items_ord_variance_abs as f64),
                Some(ly.units as f64),
            ),
            sales_variance_abs,
            sales_variance_pct: pct_change(Some(sales_variance_abs), Some(ly.sales)),
            avg_rsp_variance_abs,
            avg_rsp_variance_pct: pct_change(avg_rsp_variance_abs, avg_rsp_ly),
        }
    }
}

/// Relative change against a base; missing when the base is zero or missing.
pub fn pct_change(abs: Option<f64>, base: Option<f64>) -> Option<f64> {
    match (abs, base) {
        (Some(abs), Some(base)) if base != 0.0 && base.is_finite() => Some(abs / base),
        _ => None,
    }
}

/// All category rows, sorted by category name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryTable {
    rows: Vec<CategorySummary>,
}

impl SummaryTable {
    pub fn new(mut rows: Vec<CategorySummary>) -> Self {
        rows.sort_by(|a, b| a.category_name.cmp(&b.category_name));
        Self { rows }
    }

    pub fn rows(&self) -> &[CategorySummary] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, category: &str) -> Option<&CategorySummary> {
        self.rows.iter().find(|r| r.category_name == category)
    }

    /// Category names by ascending sales variance; the shared axis order of
    /// every chart.
    pub fn category_order(&self) -> Vec<String> {
        let mut rows: Vec<&CategorySummary> = self.rows.iter().collect();
        rows.sort_by(|a, b| {
            a.sales_variance_abs
                .total_cmp(&b.sales_variance_abs)
                .then_with(|| a.category_name.cmp(&b.category_name))
        });
        rows.into_iter().map(|r| r.category_name.clone()).collect()
    }

    /// Units ordered across all categories in a season.
    pub fn total_units(&self, season: Season) -> i64 {
        self.rows
            .iter()
            .map(|r| match season {
                Season::LastYear => r.items_ord_ly,
                Season::ThisYear => r.items_ord_ty,
            })
            .sum()
    }

    /// Category with the largest sales growth.
    pub fn top_growth(&self) -> Option<&CategorySummary> {
        self.rows.iter().max_by(|a, b| {
            a.sales_variance_abs
                .partial_cmp(&b.sales_variance_abs)
                .unwrap_or(Ordering::Equal)
        })
    }
}

/// Handles the grouping and pivoting of cleaned records.
pub struct SummaryCalculator;

impl SummaryCalculator {
    /// Aggregate a records frame (see `DataProcessor::records_frame`).
    pub fn aggregate(
        frame: &DataFrame,
        config: &ReportConfig,
    ) -> Result<SummaryTable, AggregateError> {
        // Group by category with one filtered sum per season: the pivot
        let grouped = frame
            .clone()
            .lazy()
            .group_by_stable([col("category_name")])
            .agg([
                Self::season_sum("qty_ordered", Season::LastYear, "items_ord_ly"),
                Self::season_sum("qty_ordered", Season::ThisYear, "items_ord_ty"),
                Self::season_sum("grand_total", Season::LastYear, "sales_ly"),
                Self::season_sum("grand_total", Season::ThisYear, "sales_ty"),
            ])
            .collect()?;
        debug!(groups = grouped.height(), "grouped records by category");

        let names_col = grouped.column("category_name")?;
        let names = names_col.str()?;
        let items_ly_col = grouped.column("items_ord_ly")?.cast(&DataType::Int64)?;
        let items_ty_col = grouped.column("items_ord_ty")?.cast(&DataType::Int64)?;
        let sales_ly_col = grouped.column("sales_ly")?.cast(&DataType::Float64)?;
        let sales_ty_col = grouped.column("sales_ty")?.cast(&DataType::Float64)?;
        let items_ly = items_ly_col.i64()?;
        let items_ty = items_ty_col.i64()?;
        let sales_ly = sales_ly_col.f64()?;
        let sales_ty = sales_ty_col.f64()?;

        let mut rows = Vec::with_capacity(grouped.height());
        let mut dropped_unknown = false;

        for i in 0..grouped.height() {
            let Some(name) = names.get(i) else {
                continue;
            };
            if name == config.unknown_category {
                dropped_unknown = true;
                continue;
            }

            let ly = SeasonTotals {
                units: items_ly.get(i).unwrap_or(0),
                sales: sales_ly.get(i).unwrap_or(0.0),
            };
            let ty = SeasonTotals {
                units: items_ty.get(i).unwrap_or(0),
                sales: sales_ty.get(i).unwrap_or(0.0),
            };
            rows.push(CategorySummary::from_totals(name, ly, ty));
        }

        let table = SummaryTable::new(rows);
        let degenerate = table
            .rows()
            .iter()
            .filter(|r| r.sales_variance_pct.is_none() || r.avg_rsp_variance_pct.is_none())
            .count();
        info!(
            categories = table.len(),
            dropped_unknown,
            degenerate,
            units_ly = table.total_units(Season::LastYear),
            units_ty = table.total_units(Season::ThisYear),
            "aggregated category summary"
        );

        Ok(table)
    }

    fn season_sum(column: &str, season: Season, alias: &str) -> Expr {
        col(column)
            .filter(col("season").eq(lit(season.label())))
            .sum()
            .alias(alias)
    }
}
