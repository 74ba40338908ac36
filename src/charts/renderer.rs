//! Static Chart Renderer
//! Draws report figures with Plotters and encodes them as PNG.
//!
//! Layout (top to bottom):
//! 1. Header: title, or headline + subtitle + commentary for the infographic
//! 2. Category axis title above the label column
//! 3. Label column on the left, then the panels side by side sharing one
//!    category axis, widths proportional to each panel's relative width
//! 4. Footer: data source on the left, author on the right

use crate::charts::figure::{Figure, Rgb, RichLine, AXIS_GREY, HIGHLIGHT, TEXT_DARK};
use image::{DynamicImage, ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::io::Cursor;
use thiserror::Error;

const FONT: &str = "sans-serif";
const MARGIN: u32 = 20;
const TITLE_H: u32 = 40;
const HEADLINE_H: u32 = 34;
const SUBTITLE_H: u32 = 26;
const COMMENTARY_H: u32 = 22;
const CATEGORY_TITLE_H: u32 = 22;
const FOOTER_H: u32 = 30;
const LABEL_W: u32 = 190;
const PANEL_GAP: u32 = 16;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Canvas {0}x{1} is too small for the figure")]
    CanvasTooSmall(u32, u32),
    #[error("Pixel buffer does not match the canvas size")]
    Buffer,
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

fn draw_err(e: impl std::fmt::Display) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// Bytes of an RGB buffer for the canvas.
fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

/// Pixel placement of the figure parts on a canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureLayout {
    pub header_height: u32,
    pub footer_height: u32,
    pub plot_left: u32,
    pub plot_top: u32,
    pub plot_width: u32,
    pub plot_height: u32,
    /// `(x offset from plot_left, width)` per panel.
    pub panels: Vec<(u32, u32)>,
}

impl FigureLayout {
    pub fn compute(figure: &Figure, width: u32, height: u32) -> Result<Self, RenderError> {
        let mut header_height = MARGIN;
        if figure.title.is_some() {
            header_height += TITLE_H;
        }
        if figure.headline.is_some() {
            header_height += HEADLINE_H;
        }
        if figure.subtitle.is_some() {
            header_height += SUBTITLE_H;
        }
        header_height += COMMENTARY_H * figure.commentary.len() as u32;
        if figure.category_title.is_some() {
            header_height += CATEGORY_TITLE_H;
        }

        let footer_height = if figure.footer_left.is_some() || figure.footer_right.is_some() {
            FOOTER_H
        } else {
            MARGIN
        };

        let n = figure.panels.len().max(1) as u32;
        let gaps = PANEL_GAP * (n - 1);
        let fixed_w = MARGIN + LABEL_W + gaps + MARGIN;
        let fixed_h = header_height + footer_height;
        if width <= fixed_w + 20 * n || height <= fixed_h + 40 {
            return Err(RenderError::CanvasTooSmall(width, height));
        }
        let plot_width = width - fixed_w;
        let plot_height = height - fixed_h;

        let drawable = plot_width - gaps;
        let total_share: f64 = figure.panels.iter().map(|p| p.relative_width).sum();
        let mut panels = Vec::with_capacity(figure.panels.len());
        let mut x = 0u32;
        for (i, panel) in figure.panels.iter().enumerate() {
            let w = if i + 1 == figure.panels.len() {
                // Last panel absorbs rounding
                plot_width - x
            } else {
                (drawable as f64 * panel.relative_width / total_share).round() as u32
            };
            panels.push((x, w));
            x += w + PANEL_GAP;
        }

        Ok(Self {
            header_height,
            footer_height,
            plot_left: MARGIN + LABEL_W,
            plot_top: header_height,
            plot_width,
            plot_height,
            panels,
        })
    }
}

/// Renders figures to static images.
pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render a figure to in-memory PNG bytes.
    pub fn render_png(figure: &Figure, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let layout = FigureLayout::compute(figure, width, height)?;
        let mut buffer = vec![0u8; buffer_len(width, height)];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            Self::draw(&root, figure, &layout, width, height)?;
            root.present().map_err(draw_err)?;
        }

        let img = RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer)?;
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Draw a figure onto any Plotters backend.
    pub fn draw<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        figure: &Figure,
        layout: &FigureLayout,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let text_color = if figure.styled { AXIS_GREY } else { TEXT_DARK };
        root.fill(&WHITE).map_err(draw_err)?;

        // Header
        let mut y = MARGIN as i32;
        if let Some(title) = &figure.title {
            let style = (FONT, 20).into_font().color(&rgb(text_color));
            root.draw(&Text::new(title.as_str(), (MARGIN as i32, y), style))
                .map_err(draw_err)?;
            y += TITLE_H as i32;
        }
        if let Some(headline) = &figure.headline {
            Self::draw_rich_line(root, headline, MARGIN as i32, y, 22)?;
            y += HEADLINE_H as i32;
        }
        if let Some(subtitle) = &figure.subtitle {
            let style = (FONT, 14).into_font().color(&rgb(AXIS_GREY));
            root.draw(&Text::new(subtitle.as_str(), (MARGIN as i32, y), style))
                .map_err(draw_err)?;
            y += SUBTITLE_H as i32;
        }
        for line in &figure.commentary {
            Self::draw_rich_line(root, line, MARGIN as i32, y, 14)?;
            y += COMMENTARY_H as i32;
        }
        if let Some(category_title) = &figure.category_title {
            let style = (FONT, 13).into_font().color(&rgb(text_color));
            root.draw(&Text::new(category_title.as_str(), (MARGIN as i32, y), style))
                .map_err(draw_err)?;
        }

        // Panels
        let n = figure.categories.len().max(1) as f64;
        let mut label_rows: Vec<i32> = Vec::new();

        for (idx, (panel, &(x_off, panel_w))) in
            figure.panels.iter().zip(layout.panels.iter()).enumerate()
        {
            let area = root.clone().shrink(
                (layout.plot_left + x_off, layout.plot_top),
                (panel_w, layout.plot_height),
            );
            let (lo, hi) = panel.value_bounds();

            let mut builder = ChartBuilder::on(&area);
            builder.margin_left(4).margin_right(12);
            if let Some(title) = &panel.title {
                builder.caption(title.as_str(), (FONT, 14).into_font().color(&rgb(TEXT_DARK)));
            }
            if figure.axis_on_top {
                builder.set_label_area_size(LabelAreaPosition::Top, 28);
            } else {
                builder.set_label_area_size(LabelAreaPosition::Bottom, 40);
            }
            let mut chart = builder
                .build_cartesian_2d(lo..hi, -0.5f64..(n - 0.5))
                .map_err(draw_err)?;

            let tick = panel.tick_format;
            let currency = figure.currency.clone();
            let tick_label = move |v: &f64| tick.format(*v, &currency);
            let axis_color = rgb(AXIS_GREY);

            let mut mesh = chart.configure_mesh();
            mesh.disable_mesh()
                .x_labels(6)
                .x_label_formatter(&tick_label)
                .axis_style(axis_color)
                .label_style((FONT, 11).into_font().color(&axis_color));
            if idx == 0 {
                if let Some(desc) = &figure.value_axis_title {
                    mesh.x_desc(desc.as_str());
                }
            }
            mesh.draw().map_err(draw_err)?;

            chart
                .draw_series(panel.bars.iter().enumerate().filter_map(|(i, bar)| {
                    let value = bar.value.filter(|v| v.is_finite())?.clamp(lo, hi);
                    let base = 0.0f64.clamp(lo, hi);
                    let row = i as f64;
                    let half = bar.thickness / 2.0;
                    Some(Rectangle::new(
                        [
                            (base.min(value), row - half),
                            (base.max(value), row + half),
                        ],
                        rgb(bar.color).filled(),
                    ))
                }))
                .map_err(draw_err)?;

            if figure.zero_line && lo <= 0.0 && hi >= 0.0 {
                chart
                    .draw_series(std::iter::once(PathElement::new(
                        vec![(0.0, -0.5), (0.0, n - 0.5)],
                        axis_color.stroke_width(1),
                    )))
                    .map_err(draw_err)?;
            }

            if idx == 0 {
                label_rows = (0..figure.categories.len())
                    .map(|i| chart.backend_coord(&(lo, i as f64)).1)
                    .collect();
            }
        }

        // Category labels, right-aligned against the first panel
        let label_x = layout.plot_left as i32 - 8;
        for (label, &row_y) in figure.categories.iter().zip(label_rows.iter()) {
            let color = if figure.colored_labels && label.highlighted {
                HIGHLIGHT
            } else {
                text_color
            };
            let style = (FONT, 12)
                .into_font()
                .color(&rgb(color))
                .pos(Pos::new(HPos::Right, VPos::Center));
            root.draw(&Text::new(label.name.as_str(), (label_x, row_y), style))
                .map_err(draw_err)?;
        }

        // Footer
        let footer_y = (height - layout.footer_height + 8) as i32;
        if let Some(left) = &figure.footer_left {
            let style = (FONT, 12).into_font().color(&rgb(AXIS_GREY));
            root.draw(&Text::new(left.as_str(), (MARGIN as i32, footer_y), style))
                .map_err(draw_err)?;
        }
        if let Some(right) = &figure.footer_right {
            let style = (FONT, 12)
                .into_font()
                .color(&rgb(AXIS_GREY))
                .pos(Pos::new(HPos::Right, VPos::Top));
            root.draw(&Text::new(
                right.as_str(),
                ((width - MARGIN) as i32, footer_y),
                style,
            ))
            .map_err(draw_err)?;
        }

        Ok(())
    }

    /// Draw spans left to right, emphasised spans in the highlight colour.
    fn draw_rich_line<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        line: &RichLine,
        x: i32,
        y: i32,
        size: u32,
    ) -> Result<(), RenderError> {
        let mut x = x;
        for span in line {
            let color = if span.emphasis { HIGHLIGHT } else { TEXT_DARK };
            let style = (FONT, size).into_font().color(&rgb(color));
            let (w, _) = root
                .estimate_text_size(&span.text, &style)
                .map_err(draw_err)?;
            root.draw(&Text::new(span.text.as_str(), (x, y), style))
                .map_err(draw_err)?;
            x += w as i32;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::figure::{ChartVariant, FigureBuilder, TRACE_COLORS};
    use crate::config::ReportConfig;
    use crate::stats::{CategorySummary, HighlightCommentary, SeasonRange, SeasonTotals, SummaryTable};

    fn figure(variant: ChartVariant) -> Figure {
        let t = |units, sales| SeasonTotals { units, sales };
        let table = SummaryTable::new(vec![
            CategorySummary::from_totals("Books", t(10, 1000.0), t(5, 500.0)),
            CategorySummary::from_totals("Beauty", t(0, 0.0), t(3, 300.0)),
        ]);
        let order = table.category_order();
        let commentary = HighlightCommentary {
            category: "Books".to_string(),
            high_price_point: 40_000.0,
            last_year: SeasonRange::default(),
            this_year: SeasonRange::default(),
        };
        let config = ReportConfig::default();
        FigureBuilder::new(&table, &order, &commentary, &config).build(variant)
    }

    #[test]
    fn panels_fill_the_plot_width() {
        for variant in ChartVariant::ALL {
            let figure = figure(variant);
            let layout = FigureLayout::compute(&figure, 1400, 800).unwrap();
            let (last_x, last_w) = *layout.panels.last().unwrap();
            assert_eq!(last_x + last_w, layout.plot_width);
            assert_eq!(layout.panels.len(), figure.panels.len());
            assert!(layout.plot_top + layout.plot_height + layout.footer_height <= 800);
        }
    }

    #[test]
    fn highlighted_panels_follow_relative_widths() {
        let figure = figure(ChartVariant::Highlighted);
        let layout = FigureLayout::compute(&figure, 1400, 800).unwrap();
        let widths: Vec<u32> = layout.panels.iter().map(|p| p.1).collect();
        assert!(widths[0] > widths[1] * 2 - 4 && widths[0] < widths[1] * 2 + 4);
        assert!(widths[1].abs_diff(widths[2]) <= 1);
    }

    #[test]
    fn infographic_reserves_header_and_footer() {
        let plain = FigureLayout::compute(&figure(ChartVariant::Basic), 1400, 800).unwrap();
        let info = FigureLayout::compute(&figure(ChartVariant::Infographic), 1400, 800).unwrap();
        assert!(info.header_height > plain.header_height + 3 * COMMENTARY_H);
        assert_eq!(info.footer_height, FOOTER_H);
    }

    #[test]
    fn tiny_canvas_is_rejected() {
        let result = FigureLayout::compute(&figure(ChartVariant::Infographic), 300, 200);
        assert!(matches!(result, Err(RenderError::CanvasTooSmall(300, 200))));
    }

    #[test]
    fn buffer_length_does_not_overflow() {
        assert_eq!(buffer_len(1400, 800), 3_360_000);
        assert_eq!(buffer_len(70_000, 70_000), 14_700_000_000);
    }

    #[test]
    fn renders_bars_and_skips_missing_values() {
        // Beauty has no last-year sales, so its avg RSP bar is missing
        let figure = figure(ChartVariant::MetricBreakdown);
        assert!(figure.panels[2].bars.iter().any(|b| b.value.is_none()));

        let png = match StaticChartRenderer::render_png(&figure, 1000, 600) {
            Ok(png) => png,
            Err(RenderError::Draw(reason)) => {
                eprintln!("skipping render check, no usable font: {reason}");
                return;
            }
            Err(other) => panic!("unexpected render failure: {other}"),
        };

        let image = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(image.dimensions(), (1000, 600));
        let count = |c: Rgb| {
            image
                .pixels()
                .filter(|p| p.0 == [c.0, c.1, c.2])
                .count()
        };
        assert!(count(TRACE_COLORS[0]) > 0);
        assert!(count(TRACE_COLORS[1]) > 0);
    }
}
