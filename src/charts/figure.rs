//! Figure Model Module
//! Backend-neutral description of the six report charts. The static renderer
//! and the interactive viewer both draw from these figures, so category order,
//! highlighting and missing-value handling are decided once, here.

use crate::charts::format::{self, TickFormat};
use crate::config::{AxisRange, ReportConfig};
use crate::stats::{CategorySummary, HighlightCommentary, SeasonRange, SummaryTable};

/// RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const AXIS_GREY: Rgb = Rgb(0x90, 0x94, 0x97);
pub const TEXT_DARK: Rgb = Rgb(0x24, 0x25, 0x26);
pub const MUTED: Rgb = Rgb(0xBD, 0xC3, 0xC7);
pub const HIGHLIGHT: Rgb = Rgb(0x24, 0x71, 0xA3);

/// Default trace colours, one per panel.
pub const TRACE_COLORS: [Rgb; 4] = [
    Rgb(0x63, 0x6E, 0xFA), // Blue
    Rgb(0xEF, 0x55, 0x3B), // Red
    Rgb(0x00, 0xCC, 0x96), // Green
    Rgb(0xAB, 0x63, 0xFA), // Purple
];

const WIDE_BAR: f64 = 0.8;
const THIN_BAR: f64 = 0.15;

/// The six charts of the report, in order of increasing refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartVariant {
    Basic,
    Sorted,
    MetricBreakdown,
    PercentBreakdown,
    Highlighted,
    Infographic,
}

impl ChartVariant {
    pub const ALL: [ChartVariant; 6] = [
        ChartVariant::Basic,
        ChartVariant::Sorted,
        ChartVariant::MetricBreakdown,
        ChartVariant::PercentBreakdown,
        ChartVariant::Highlighted,
        ChartVariant::Infographic,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ChartVariant::Basic => "1. Sales Variance",
            ChartVariant::Sorted => "2. Sorted & Styled",
            ChartVariant::MetricBreakdown => "3. Metric Breakdown",
            ChartVariant::PercentBreakdown => "4. Percentage Breakdown",
            ChartVariant::Highlighted => "5. Highlighted Category",
            ChartVariant::Infographic => "6. Infographic",
        }
    }

    pub fn file_stem(self) -> &'static str {
        match self {
            ChartVariant::Basic => "01_sales_variance",
            ChartVariant::Sorted => "02_sorted_sales_variance",
            ChartVariant::MetricBreakdown => "03_metric_breakdown",
            ChartVariant::PercentBreakdown => "04_percentage_breakdown",
            ChartVariant::Highlighted => "05_highlighted_category",
            ChartVariant::Infographic => "06_infographic",
        }
    }

    fn highlights(self) -> bool {
        matches!(self, ChartVariant::Highlighted | ChartVariant::Infographic)
    }
}

/// A summary column shown as bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    SalesAbs,
    ItemsOrdAbs,
    AvgRspAbs,
    SalesPct,
    ItemsOrdPct,
    AvgRspPct,
}

impl Metric {
    pub fn value(self, row: &CategorySummary) -> Option<f64> {
        match self {
            Metric::SalesAbs => Some(row.sales_variance_abs),
            Metric::ItemsOrdAbs => Some(row.items_ord_variance_abs as f64),
            Metric::AvgRspAbs => row.avg_rsp_variance_abs,
            Metric::SalesPct => row.sales_variance_pct,
            Metric::ItemsOrdPct => row.items_ord_variance_pct,
            Metric::AvgRspPct => row.avg_rsp_variance_pct,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::SalesAbs => "Sales Variance (Abs)",
            Metric::ItemsOrdAbs => "Items Ord Variance (Abs)",
            Metric::AvgRspAbs => "Avg RSP Variance (Abs)",
            Metric::SalesPct => "Sales Variance (%)",
            Metric::ItemsOrdPct => "Items Ord Variance (%)",
            Metric::AvgRspPct => "Avg RSP Variance (%)",
        }
    }

    pub fn tick_format(self) -> TickFormat {
        match self {
            Metric::SalesAbs | Metric::AvgRspAbs => TickFormat::Currency,
            Metric::ItemsOrdAbs => TickFormat::Thousands,
            Metric::SalesPct | Metric::ItemsOrdPct | Metric::AvgRspPct => TickFormat::Percent,
        }
    }
}

/// Piece of a text line; emphasised spans use the highlight colour.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub emphasis: bool,
}

impl TextSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: false,
        }
    }

    pub fn emphasis(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: true,
        }
    }
}

pub type RichLine = Vec<TextSpan>;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryLabel {
    pub name: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub category: String,
    /// Missing values draw nothing.
    pub value: Option<f64>,
    pub color: Rgb,
    /// Fraction of a category slot.
    pub thickness: f64,
    pub hover: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: Option<String>,
    pub metric: Metric,
    pub tick_format: TickFormat,
    pub x_range: Option<AxisRange>,
    /// Share of the plotting width.
    pub relative_width: f64,
    /// One bar per category, in category-axis order.
    pub bars: Vec<Bar>,
}

impl Panel {
    /// Value-axis bounds: the configured range, else the data extent with zero
    /// included.
    pub fn value_bounds(&self) -> (f64, f64) {
        if let Some(AxisRange(min, max)) = self.x_range {
            return (min, max);
        }
        let (min, max) = self
            .bars
            .iter()
            .filter_map(|b| b.value)
            .filter(|v| v.is_finite())
            .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if max - min <= f64::EPSILON {
            return (min - 1.0, max + 1.0);
        }
        let pad = (max - min) * 0.05;
        (min - pad, max + pad)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub variant: ChartVariant,
    pub title: Option<String>,
    pub headline: Option<RichLine>,
    pub subtitle: Option<String>,
    pub commentary: Vec<RichLine>,
    pub footer_left: Option<String>,
    pub footer_right: Option<String>,
    pub category_title: Option<String>,
    /// Bottom to top.
    pub categories: Vec<CategoryLabel>,
    pub colored_labels: bool,
    pub value_axis_title: Option<String>,
    pub panels: Vec<Panel>,
    pub zero_line: bool,
    pub axis_on_top: bool,
    pub styled: bool,
    pub currency: String,
}

impl Figure {
    pub fn header_lines(&self) -> usize {
        usize::from(self.title.is_some())
            + usize::from(self.headline.is_some())
            + usize::from(self.subtitle.is_some())
            + self.commentary.len()
    }
}

/// Builds report figures from the summary table and the shared order.
pub struct FigureBuilder<'a> {
    summary: &'a SummaryTable,
    order: &'a [String],
    commentary: &'a HighlightCommentary,
    config: &'a ReportConfig,
}

impl<'a> FigureBuilder<'a> {
    pub fn new(
        summary: &'a SummaryTable,
        order: &'a [String],
        commentary: &'a HighlightCommentary,
        config: &'a ReportConfig,
    ) -> Self {
        Self {
            summary,
            order,
            commentary,
            config,
        }
    }

    pub fn build_all(&self) -> Vec<Figure> {
        ChartVariant::ALL.iter().map(|&v| self.build(v)).collect()
    }

    pub fn build(&self, variant: ChartVariant) -> Figure {
        let chart = &self.config.chart;
        let highlight = &self.config.highlight_category;

        let panel_specs: Vec<(Metric, Option<&str>)> = match variant {
            ChartVariant::Basic | ChartVariant::Sorted => vec![(Metric::SalesAbs, None)],
            ChartVariant::MetricBreakdown => vec![
                (Metric::SalesAbs, Some("Sales Variance")),
                (Metric::ItemsOrdAbs, Some("Items Ord Variance")),
                (Metric::AvgRspAbs, Some("Avg RSP Variance")),
            ],
            _ => [
                Metric::SalesAbs,
                Metric::SalesPct,
                Metric::ItemsOrdPct,
                Metric::AvgRspPct,
            ]
            .into_iter()
            .map(|m| (m, Some(m.label())))
            .collect(),
        };

        let count = panel_specs.len();
        let panels = panel_specs
            .into_iter()
            .enumerate()
            .map(|(idx, (metric, title))| {
                let relative_width = if variant.highlights() {
                    if idx == 0 {
                        0.4
                    } else {
                        0.6 / (count - 1) as f64
                    }
                } else {
                    1.0 / count as f64
                };
                let tick_format = match variant {
                    ChartVariant::Basic => TickFormat::Plain,
                    _ => metric.tick_format(),
                };
                let x_range = match variant {
                    ChartVariant::PercentBreakdown
                    | ChartVariant::Highlighted
                    | ChartVariant::Infographic => Some(match metric.tick_format() {
                        TickFormat::Percent => chart.pct_range,
                        _ => chart.sales_abs_range,
                    }),
                    _ => None,
                };
                Panel {
                    title: title.map(str::to_string),
                    metric,
                    tick_format,
                    x_range,
                    relative_width,
                    bars: self.bars(variant, idx, metric),
                }
            })
            .collect();

        let title = match variant {
            ChartVariant::Basic | ChartVariant::Infographic => None,
            ChartVariant::Highlighted => Some(chart.highlight_title.clone()),
            _ => Some(chart.title.clone()),
        };
        let infographic = variant == ChartVariant::Infographic;

        Figure {
            variant,
            title,
            headline: infographic.then(|| template_spans(&chart.headline, highlight)),
            subtitle: infographic.then(|| chart.subtitle.clone()),
            commentary: if infographic {
                self.commentary_lines()
            } else {
                Vec::new()
            },
            footer_left: if infographic {
                chart.data_source.clone()
            } else {
                None
            },
            footer_right: if infographic {
                chart.author.clone()
            } else {
                None
            },
            category_title: (variant != ChartVariant::Basic)
                .then(|| chart.category_axis_title.clone()),
            categories: self
                .order
                .iter()
                .map(|name| CategoryLabel {
                    name: name.clone(),
                    highlighted: variant.highlights() && name == highlight,
                })
                .collect(),
            colored_labels: infographic,
            value_axis_title: (variant == ChartVariant::Sorted)
                .then(|| Metric::SalesAbs.label().to_string()),
            panels,
            zero_line: !matches!(variant, ChartVariant::Basic | ChartVariant::Sorted),
            axis_on_top: matches!(
                variant,
                ChartVariant::PercentBreakdown
                    | ChartVariant::Highlighted
                    | ChartVariant::Infographic
            ),
            styled: variant != ChartVariant::Basic,
            currency: chart.currency_symbol.clone(),
        }
    }

    fn bars(&self, variant: ChartVariant, panel_idx: usize, metric: Metric) -> Vec<Bar> {
        let highlight = &self.config.highlight_category;
        let currency = &self.config.chart.currency_symbol;

        self.order
            .iter()
            .map(|name| {
                let value = self.summary.get(name).and_then(|row| metric.value(row));
                let color = if variant.highlights() {
                    if name == highlight {
                        HIGHLIGHT
                    } else {
                        MUTED
                    }
                } else if variant == ChartVariant::MetricBreakdown
                    || variant == ChartVariant::PercentBreakdown
                {
                    TRACE_COLORS[panel_idx % TRACE_COLORS.len()]
                } else {
                    TRACE_COLORS[0]
                };
                let thickness = if variant.highlights() && panel_idx > 0 {
                    THIN_BAR
                } else {
                    WIDE_BAR
                };
                let hover = (variant == ChartVariant::Infographic).then(|| {
                    let shown = value
                        .map(|v| format::hover_value(v, metric.tick_format(), currency))
                        .unwrap_or_else(|| "n/a".to_string());
                    format!("Category: {name}\n{}: {shown}", metric.label())
                });
                Bar {
                    category: name.clone(),
                    value,
                    color,
                    thickness,
                    hover,
                }
            })
            .collect()
    }

    fn commentary_lines(&self) -> Vec<RichLine> {
        let chart = &self.config.chart;
        let currency = &chart.currency_symbol;
        let category = &self.config.highlight_category;
        let (ly, ty) = (&chart.period_label_ly, &chart.period_label_ty);
        let row = self.summary.get(category);
        let c = self.commentary;

        vec![
            vec![
                TextSpan::plain(format!("...year-on-year in {ty} at ")),
                TextSpan::emphasis(format::signed_currency(
                    row.map(|r| r.sales_variance_abs),
                    currency,
                )),
                TextSpan::plain(" ("),
                TextSpan::emphasis(format::signed_percent(
                    row.and_then(|r| r.sales_variance_pct),
                )),
                TextSpan::plain("), with the avg RSP moving "),
                TextSpan::emphasis(format::signed_percent(
                    row.and_then(|r| r.avg_rsp_variance_pct),
                )),
                TextSpan::plain(" YoY."),
            ],
            vec![
                TextSpan::plain(format!("Between {ly} and {ty}, the range of ")),
                TextSpan::emphasis(category.clone()),
                TextSpan::plain(format!(
                    " products sold went from {} to {}.",
                    range_label(&c.last_year),
                    range_label(&c.this_year)
                )),
            ],
            vec![TextSpan::plain(format!(
                "{} of products sold were priced at or above the {currency}{} price point in {ty}, compared to {} in {ly}.",
                format::share_percent(c.this_year.high_price_share()),
                format::compact(c.high_price_point),
                format::share_percent(c.last_year.high_price_share()),
            ))],
        ]
    }
}

fn range_label(range: &SeasonRange) -> String {
    format::compact(range.range_size as f64)
}

/// Split a template on `{category}`, emphasising each substitution.
fn template_spans(template: &str, category: &str) -> RichLine {
    let mut spans = Vec::new();
    for (i, part) in template.split("{category}").enumerate() {
        if i > 0 {
            spans.push(TextSpan::emphasis(category));
        }
        if !part.is_empty() {
            spans.push(TextSpan::plain(part));
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::SeasonTotals;

    const M: &str = "Mobiles & Tablets";

    fn line_text(line: &[TextSpan]) -> String {
        line.iter().map(|s| s.text.as_str()).collect()
    }

    fn summary() -> SummaryTable {
        let t = |units, sales| SeasonTotals { units, sales };
        SummaryTable::new(vec![
            CategorySummary::from_totals(M, t(6000, 34_000_000.0), t(2200, 43_500_000.0)),
            CategorySummary::from_totals("Books", t(10, 1000.0), t(5, 500.0)),
            CategorySummary::from_totals("School & Education", t(0, 0.0), t(3, 300.0)),
        ])
    }

    fn commentary() -> HighlightCommentary {
        HighlightCommentary {
            category: M.to_string(),
            high_price_point: 40_000.0,
            last_year: SeasonRange {
                range_size: 6000,
                high_price_items: 24,
            },
            this_year: SeasonRange {
                range_size: 2200,
                high_price_items: 202,
            },
        }
    }

    fn figures() -> (Vec<String>, Vec<Figure>) {
        let table = summary();
        let order = table.category_order();
        let commentary = commentary();
        let config = ReportConfig::default();
        let figures = FigureBuilder::new(&table, &order, &commentary, &config).build_all();
        (order, figures)
    }

    #[test]
    fn every_figure_uses_the_shared_order() {
        let (order, figures) = figures();
        assert_eq!(figures.len(), 6);
        for figure in &figures {
            let axis: Vec<&str> = figure.categories.iter().map(|c| c.name.as_str()).collect();
            assert_eq!(axis, order);
            for panel in &figure.panels {
                let bars: Vec<&str> = panel.bars.iter().map(|b| b.category.as_str()).collect();
                assert_eq!(bars, order);
            }
        }
    }

    #[test]
    fn panel_layout_per_variant() {
        let (_, figures) = figures();
        let counts: Vec<usize> = figures.iter().map(|f| f.panels.len()).collect();
        assert_eq!(counts, vec![1, 1, 3, 4, 4, 4]);

        for figure in &figures {
            let total: f64 = figure.panels.iter().map(|p| p.relative_width).sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
        let highlighted = &figures[4];
        assert_eq!(highlighted.panels[0].relative_width, 0.4);
        assert_eq!(highlighted.panels[1].metric, Metric::SalesPct);
        assert_eq!(highlighted.panels[3].x_range, Some(AxisRange(-1.0, 4.0)));
        assert!(highlighted.axis_on_top);
        assert!(!figures[1].zero_line);
    }

    #[test]
    fn only_the_highlighted_category_is_coloured() {
        let (_, figures) = figures();
        for figure in &figures[4..] {
            for panel in &figure.panels {
                for bar in &panel.bars {
                    let expected = if bar.category == M { HIGHLIGHT } else { MUTED };
                    assert_eq!(bar.color, expected);
                }
            }
            let flagged: Vec<&str> = figure
                .categories
                .iter()
                .filter(|c| c.highlighted)
                .map(|c| c.name.as_str())
                .collect();
            assert_eq!(flagged, vec![M]);
        }
        assert!(figures[3].categories.iter().all(|c| !c.highlighted));
    }

    #[test]
    fn missing_values_stay_missing() {
        let (_, figures) = figures();
        let pct = &figures[3].panels[1];
        let school = pct
            .bars
            .iter()
            .find(|b| b.category == "School & Education")
            .unwrap();
        assert_eq!(school.value, None);

        let avg_abs = &figures[2].panels[2];
        let (lo, hi) = avg_abs.value_bounds();
        assert!(lo.is_finite() && hi.is_finite() && lo < hi);
    }

    #[test]
    fn infographic_text() {
        let (_, figures) = figures();
        let info = &figures[5];

        let headline = info.headline.as_ref().unwrap();
        assert_eq!(headline[0], TextSpan::emphasis(M));
        assert_eq!(line_text(headline), format!("{M} Experienced Largest Sales Growth..."));
        assert_eq!(info.commentary.len(), 3);
        assert!(line_text(&info.commentary[0]).contains("+₹9.5M (+28%)"));
        assert!(line_text(&info.commentary[1]).contains("from 6k to 2.2k"));
        assert!(line_text(&info.commentary[2]).starts_with("9.2% of products"));
        assert!(line_text(&info.commentary[2]).contains("compared to 0.4% in Q3 2017"));
        assert_eq!(info.footer_left.as_deref(), Some("Data Source: kaggle.com"));
        assert!(info.colored_labels);
        assert_eq!(info.header_lines(), 5);

        let hover = info.panels[1].bars[0].hover.as_deref().unwrap();
        assert!(hover.starts_with("Category: "));
        assert!(hover.contains("Sales Variance (%)"));
    }

    #[test]
    fn value_bounds_include_zero() {
        let panel = Panel {
            title: None,
            metric: Metric::SalesAbs,
            tick_format: TickFormat::Plain,
            x_range: None,
            relative_width: 1.0,
            bars: vec![Bar {
                category: "Books".to_string(),
                value: Some(100.0),
                color: TRACE_COLORS[0],
                thickness: WIDE_BAR,
                hover: None,
            }],
        };
        let (lo, hi) = panel.value_bounds();
        assert!(lo < 0.0 && hi > 100.0);
    }

    #[test]
    fn template_without_placeholder() {
        assert_eq!(
            template_spans("Sales Report", M),
            vec![TextSpan::plain("Sales Report")]
        );
    }
}
