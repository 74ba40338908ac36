//! Stats module - year-on-year aggregation and narrative figures

mod calculator;
mod commentary;

pub use calculator::{AggregateError, CategorySummary, SummaryCalculator, SummaryTable};
#[cfg(test)]
pub use calculator::SeasonTotals;
pub use commentary::{HighlightCommentary, SeasonRange};
