//! Chart Viewer Widget
//! Central scrollable area drawing the selected figure with egui_plot.

use crate::charts::{color32, ChartPlotter, ChartVariant, Figure, AXIS_GREY};
use crate::report::Report;
use egui::{Color32, RichText, ScrollArea};

const MIN_PLOT_HEIGHT: f32 = 320.0;
const HEADER_SPACING: f32 = 6.0;

/// Scrollable chart display area for one figure at a time.
#[derive(Default)]
pub struct ChartViewer {
    pub figures: Vec<Figure>,
}

impl ChartViewer {
    pub fn new(figures: Vec<Figure>) -> Self {
        Self { figures }
    }

    pub fn figure(&self, variant: ChartVariant) -> Option<&Figure> {
        self.figures.iter().find(|f| f.variant == variant)
    }

    /// Draw the selected figure, optionally followed by the summary grid.
    pub fn show(
        &self,
        ui: &mut egui::Ui,
        selected: ChartVariant,
        report: &Report,
        highlight: &str,
        show_summary: bool,
    ) {
        let Some(figure) = self.figure(selected) else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        // Leave room for the header lines above the plots
        let header_height = 24.0 * (figure.header_lines() + 2) as f32;
        let plot_height = (ui.available_height() - header_height).max(MIN_PLOT_HEIGHT);

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::draw_header(ui, figure);
                ChartPlotter::draw_figure(ui, figure, plot_height);
                Self::draw_footer(ui, figure);

                if show_summary {
                    ui.add_space(12.0);
                    ui.separator();
                    ChartPlotter::draw_summary_table(
                        ui,
                        &report.summary,
                        &report.category_order,
                        highlight,
                        &figure.currency,
                    );
                }
            });
    }

    fn draw_header(ui: &mut egui::Ui, figure: &Figure) {
        if figure.header_lines() == 0 && figure.category_title.is_none() {
            return;
        }
        let muted = color32(AXIS_GREY);

        if let Some(title) = &figure.title {
            ui.label(RichText::new(title).size(18.0).color(muted));
        }
        if let Some(headline) = &figure.headline {
            ChartPlotter::draw_rich_line(ui, headline, 20.0);
        }
        if let Some(subtitle) = &figure.subtitle {
            ui.label(RichText::new(subtitle).size(13.0).color(muted));
        }
        if !figure.commentary.is_empty() {
            ui.add_space(HEADER_SPACING);
            for line in &figure.commentary {
                ChartPlotter::draw_rich_line(ui, line, 13.0);
            }
        }
        if let Some(category_title) = &figure.category_title {
            ui.add_space(HEADER_SPACING);
            ui.label(RichText::new(category_title).size(12.0).italics());
        }
        ui.add_space(HEADER_SPACING);
    }

    fn draw_footer(ui: &mut egui::Ui, figure: &Figure) {
        if figure.footer_left.is_none() && figure.footer_right.is_none() {
            return;
        }
        ui.horizontal(|ui| {
            if let Some(left) = &figure.footer_left {
                ui.label(RichText::new(left).size(11.0).color(Color32::GRAY));
            }
            if let Some(right) = &figure.footer_right {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(RichText::new(right).size(11.0).color(Color32::GRAY));
                });
            }
        });
    }
}
