//! Narrative figures for the highlighted category: how many distinct items
//! it sold per season and how many of those sat at a high price point.

use crate::config::ReportConfig;
use crate::data::Season;
use crate::stats::AggregateError;
use polars::prelude::*;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeasonRange {
    /// Distinct items sold.
    pub range_size: u64,
    /// Distinct items priced at or above the high price point.
    pub high_price_items: u64,
}

impl SeasonRange {
    pub fn high_price_share(&self) -> Option<f64> {
        if self.range_size == 0 {
            None
        } else {
            Some(self.high_price_items as f64 / self.range_size as f64)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightCommentary {
    pub category: String,
    pub high_price_point: f64,
    pub last_year: SeasonRange,
    pub this_year: SeasonRange,
}

impl HighlightCommentary {
    /// Compute from a records frame (see `DataProcessor::records_frame`).
    pub fn compute(frame: &DataFrame, config: &ReportConfig) -> Result<Self, AggregateError> {
        let grouped = frame
            .clone()
            .lazy()
            .filter(col("category_name").eq(lit(config.highlight_category.as_str())))
            .group_by([col("season")])
            .agg([
                col("item_id").n_unique().alias("range_size"),
                col("item_id")
                    .filter(col("price").gt_eq(lit(config.high_price_point)))
                    .n_unique()
                    .alias("high_price_items"),
            ])
            .collect()?;

        let season_col = grouped.column("season")?;
        let seasons = season_col.str()?;
        let range_col = grouped.column("range_size")?.cast(&DataType::UInt64)?;
        let high_col = grouped.column("high_price_items")?.cast(&DataType::UInt64)?;
        let ranges = range_col.u64()?;
        let highs = high_col.u64()?;

        let mut commentary = Self {
            category: config.highlight_category.clone(),
            high_price_point: config.high_price_point,
            last_year: SeasonRange::default(),
            this_year: SeasonRange::default(),
        };

        for i in 0..grouped.height() {
            let Some(season) = seasons.get(i).and_then(Season::from_label) else {
                continue;
            };
            let range = SeasonRange {
                range_size: ranges.get(i).unwrap_or(0),
                high_price_items: highs.get(i).unwrap_or(0),
            };
            match season {
                Season::LastYear => commentary.last_year = range,
                Season::ThisYear => commentary.this_year = range,
            }
        }

        info!(
            category = %commentary.category,
            range_ly = commentary.last_year.range_size,
            range_ty = commentary.this_year.range_size,
            high_ly = commentary.last_year.high_price_items,
            high_ty = commentary.this_year.high_price_items,
            "computed highlight commentary"
        );
        Ok(commentary)
    }
}
