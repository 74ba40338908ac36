//! Cleaned order records and their season tag.

use chrono::{NaiveDate, NaiveDateTime};

/// Comparison period a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Season {
    LastYear,
    ThisYear,
}

impl Season {
    pub const ALL: [Season; 2] = [Season::LastYear, Season::ThisYear];

    /// Tag a date against the season cutoff (cutoff day itself is this year).
    pub fn for_date(date: NaiveDate, cutoff: NaiveDate) -> Self {
        if date >= cutoff {
            Season::ThisYear
        } else {
            Season::LastYear
        }
    }

    /// Label used in the tabular views.
    pub fn label(self) -> &'static str {
        match self {
            Season::LastYear => "Last Year",
            Season::ThisYear => "This Year",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Season::ALL.into_iter().find(|s| s.label() == label)
    }
}

/// One fulfilled order line inside a comparison window.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub item_id: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub price: f64,
    pub qty_ordered: i64,
    /// Always `price * qty_ordered - discount_amount`.
    pub grand_total: f64,
    pub category: String,
    pub discount_amount: f64,
    pub season: Season,
}

impl OrderRecord {
    pub fn computed_grand_total(price: f64, qty_ordered: i64, discount_amount: f64) -> f64 {
        price * qty_ordered as f64 - discount_amount
    }
}
