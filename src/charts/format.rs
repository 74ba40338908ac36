//! Number formatting for axis ticks, hover text and commentary.

/// Tick label style of a value axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFormat {
    Plain,
    Currency,
    Thousands,
    Percent,
}

impl TickFormat {
    pub fn format(self, value: f64, currency: &str) -> String {
        match self {
            TickFormat::Plain => compact(value),
            TickFormat::Currency => {
                let sign = if value < 0.0 { "-" } else { "" };
                format!("{sign}{currency}{}", compact(value.abs()))
            }
            TickFormat::Thousands => thousands(value),
            TickFormat::Percent => format!("{:.0}%", value * 100.0),
        }
    }
}

/// 9_500_000 -> "9.5M", 40_000 -> "40k", 12.5 -> "12.5".
pub fn compact(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e9 {
        (value / 1e9, "B")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else if abs >= 1e3 {
        (value / 1e3, "k")
    } else {
        (value, "")
    };
    format!("{}{suffix}", trim_decimal(scaled, 1))
}

/// 1234567.8 -> "1,234,568".
pub fn thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// Signed compact currency, e.g. "+₹9.5M".
pub fn signed_currency(value: Option<f64>, currency: &str) -> String {
    match value {
        Some(v) => {
            let sign = if v < 0.0 { "-" } else { "+" };
            format!("{sign}{currency}{}", compact(v.abs()))
        }
        None => "n/a".to_string(),
    }
}

/// Signed whole percentage from a ratio, e.g. 0.28 -> "+28%".
pub fn signed_percent(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{:+.0}%", r * 100.0),
        None => "n/a".to_string(),
    }
}

/// Percentage with one decimal from a ratio, e.g. 0.092 -> "9.2%".
pub fn share_percent(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{}%", trim_decimal(r * 100.0, 1)),
        None => "n/a".to_string(),
    }
}

/// Hover value for a bar.
pub fn hover_value(value: f64, format: TickFormat, currency: &str) -> String {
    match format {
        TickFormat::Percent => format!("{:.1}%", value * 100.0),
        TickFormat::Currency => {
            let sign = if value < 0.0 { "-" } else { "" };
            format!("{sign}{currency}{}", thousands(value.abs()))
        }
        TickFormat::Thousands | TickFormat::Plain => thousands(value),
    }
}

fn trim_decimal(value: f64, decimals: usize) -> String {
    let text = format!("{value:.decimals$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.');
        if trimmed == "-0" {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_scales() {
        assert_eq!(compact(9_500_000.0), "9.5M");
        assert_eq!(compact(-4_000_000.0), "-4M");
        assert_eq!(compact(2_200.0), "2.2k");
        assert_eq!(compact(6_000.0), "6k");
        assert_eq!(compact(950.0), "950");
        assert_eq!(compact(0.0), "0");
    }

    #[test]
    fn thousands_groups_digits() {
        assert_eq!(thousands(1_234_567.8), "1,234,568");
        assert_eq!(thousands(-12_500.0), "-12,500");
        assert_eq!(thousands(999.0), "999");
        assert_eq!(thousands(0.0), "0");
    }

    #[test]
    fn tick_formats() {
        assert_eq!(TickFormat::Currency.format(-4_000_000.0, "₹"), "-₹4M");
        assert_eq!(TickFormat::Currency.format(10_000_000.0, "₹"), "₹10M");
        assert_eq!(TickFormat::Percent.format(4.0, "₹"), "400%");
        assert_eq!(TickFormat::Percent.format(-1.0, "₹"), "-100%");
        assert_eq!(TickFormat::Thousands.format(25_000.0, "₹"), "25,000");
    }

    #[test]
    fn signed_values_and_missing() {
        assert_eq!(signed_currency(Some(9_520_000.0), "₹"), "+₹9.5M");
        assert_eq!(signed_currency(Some(-3_000.0), "Rs"), "-Rs3k");
        assert_eq!(signed_percent(Some(3.56)), "+356%");
        assert_eq!(signed_percent(Some(-0.25)), "-25%");
        assert_eq!(signed_percent(None), "n/a");
        assert_eq!(share_percent(Some(0.092)), "9.2%");
        assert_eq!(share_percent(Some(0.004)), "0.4%");
        assert_eq!(share_percent(None), "n/a");
    }

    #[test]
    fn hover_values() {
        assert_eq!(hover_value(0.281, TickFormat::Percent, "₹"), "28.1%");
        assert_eq!(hover_value(-1_500.0, TickFormat::Currency, "₹"), "-₹1,500");
        assert_eq!(hover_value(42.0, TickFormat::Thousands, "₹"), "42");
    }
}
