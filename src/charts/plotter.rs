//! Chart Plotter Module
//! Interactive horizontal bar charts and the summary grid, drawn with egui_plot.

use crate::charts::figure::{Figure, Panel, Rgb, RichLine, AXIS_GREY, HIGHLIGHT, TEXT_DARK};
use crate::charts::format::{self, TickFormat};
use crate::stats::SummaryTable;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Plot, VLine, VPlacement};

pub fn color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.0, c.1, c.2)
}

/// Creates the interactive figure views using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Category name for a tick on the category axis; blank between slots.
    pub fn category_tick(labels: &[String], value: f64) -> String {
        let idx = value.round();
        if (value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }

    /// Draw all panels of a figure side by side.
    pub fn draw_figure(ui: &mut egui::Ui, figure: &Figure, height: f32) {
        let labels: Vec<String> = figure.categories.iter().map(|c| c.name.clone()).collect();
        let total_width = ui.available_width();
        let spacing = ui.spacing().item_spacing.x;
        let usable = total_width - spacing * figure.panels.len().saturating_sub(1) as f32;

        ui.horizontal(|ui| {
            for (idx, panel) in figure.panels.iter().enumerate() {
                let width = (usable * panel.relative_width as f32).max(80.0);
                ui.vertical(|ui| {
                    ui.set_width(width);
                    if let Some(title) = &panel.title {
                        ui.label(RichText::new(title).strong().size(12.0));
                    }
                    Self::draw_panel(ui, figure, panel, idx, &labels, width, height);
                });
            }
        });
    }

    fn draw_panel(
        ui: &mut egui::Ui,
        figure: &Figure,
        panel: &Panel,
        idx: usize,
        labels: &[String],
        width: f32,
        height: f32,
    ) {
        let (lo, hi) = panel.value_bounds();
        let n = labels.len().max(1) as f64;
        let tick: TickFormat = panel.tick_format;
        let currency = figure.currency.clone();
        let y_labels = labels.to_vec();
        let show_categories = idx == 0;

        let mut plot = Plot::new(format!("{}_panel_{}", figure.variant.file_stem(), idx))
            .width(width)
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_x(lo)
            .include_x(hi)
            .include_y(-0.5)
            .include_y(n - 0.5)
            .show_axes([true, show_categories])
            .x_axis_formatter(move |mark, _range| tick.format(mark.value, &currency))
            .y_axis_formatter(move |mark, _range| Self::category_tick(&y_labels, mark.value));
        if figure.axis_on_top {
            plot = plot.x_axis_position(VPlacement::Top);
        }
        if idx == 0 {
            if let Some(desc) = &figure.value_axis_title {
                plot = plot.x_axis_label(desc.clone());
            }
        }

        let bars: Vec<Bar> = panel
            .bars
            .iter()
            .enumerate()
            .filter_map(|(i, bar)| {
                let value = bar.value.filter(|v| v.is_finite())?;
                let name = bar.hover.clone().unwrap_or_else(|| {
                    format!(
                        "{}: {}",
                        bar.category,
                        format::hover_value(value, panel.tick_format, &figure.currency)
                    )
                });
                Some(
                    Bar::new(i as f64, value.clamp(lo, hi))
                        .width(bar.thickness)
                        .fill(color32(bar.color))
                        .name(name),
                )
            })
            .collect();

        let zero_line = figure.zero_line && lo <= 0.0 && hi >= 0.0;
        plot.show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .horizontal()
                    .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| bar.name.clone())),
            );
            if zero_line {
                plot_ui.vline(VLine::new(0.0).color(color32(AXIS_GREY)).width(1.0));
            }
        });
    }

    /// Draw the year-on-year summary grid, rows in category-axis order (top first).
    pub fn draw_summary_table(
        ui: &mut egui::Ui,
        summary: &SummaryTable,
        order: &[String],
        highlight: &str,
        currency: &str,
    ) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id("summary_table"))
                    .striped(true)
                    .min_col_width(55.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for header in [
                            "Category",
                            "Items LY",
                            "Items TY",
                            "Sales LY",
                            "Sales TY",
                            "Sales Var",
                            "Sales %",
                            "Items %",
                            "Avg RSP %",
                        ] {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        let default_text_color = ui.visuals().text_color();
                        for name in order.iter().rev() {
                            let Some(row) = summary.get(name) else {
                                continue;
                            };
                            let color = if name == highlight {
                                color32(HIGHLIGHT)
                            } else {
                                default_text_color
                            };
                            let cell = |text: String| RichText::new(text).size(11.0);

                            ui.label(cell(row.category_name.clone()).color(color));
                            ui.label(cell(format::thousands(row.items_ord_ly as f64)));
                            ui.label(cell(format::thousands(row.items_ord_ty as f64)));
                            ui.label(cell(format::hover_value(
                                row.sales_ly,
                                TickFormat::Currency,
                                currency,
                            )));
                            ui.label(cell(format::hover_value(
                                row.sales_ty,
                                TickFormat::Currency,
                                currency,
                            )));
                            ui.label(cell(format::signed_currency(
                                Some(row.sales_variance_abs),
                                currency,
                            )));
                            ui.label(cell(format::signed_percent(row.sales_variance_pct)));
                            ui.label(cell(format::signed_percent(row.items_ord_variance_pct)));
                            ui.label(cell(format::signed_percent(row.avg_rsp_variance_pct)));
                            ui.end_row();
                        }
                    });
            });
    }

    /// Draw a header line span by span.
    pub fn draw_rich_line(ui: &mut egui::Ui, line: &RichLine, size: f32) {
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            for span in line {
                let text = RichText::new(&span.text)
                    .size(size)
                    .color(Self::span_color(span.emphasis));
                ui.label(if span.emphasis { text.strong() } else { text });
            }
        });
    }

    /// Text colour of a header span.
    pub fn span_color(emphasis: bool) -> Color32 {
        if emphasis {
            color32(HIGHLIGHT)
        } else {
            color32(TEXT_DARK)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ticks_land_on_slots() {
        let labels = vec!["Books".to_string(), "Beauty".to_string()];
        assert_eq!(ChartPlotter::category_tick(&labels, 0.0), "Books");
        assert_eq!(ChartPlotter::category_tick(&labels, 1.0), "Beauty");
        assert_eq!(ChartPlotter::category_tick(&labels, 0.5), "");
        assert_eq!(ChartPlotter::category_tick(&labels, 2.0), "");
        assert_eq!(ChartPlotter::category_tick(&labels, -1.0), "");
    }

    #[test]
    fn palette_conversion() {
        assert_eq!(color32(HIGHLIGHT), Color32::from_rgb(0x24, 0x71, 0xA3));
        assert_eq!(ChartPlotter::span_color(false), color32(TEXT_DARK));
    }
}
