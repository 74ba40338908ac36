//! Control Panel Widget
//! Left side panel with the chart list, report facts and export actions.

use crate::charts::ChartVariant;
use egui::{Color32, RichText};
use std::path::PathBuf;

/// Headline numbers of the loaded report.
#[derive(Debug, Clone, Default)]
pub struct ReportFacts {
    pub input: Option<PathBuf>,
    pub records: usize,
    pub dropped: usize,
    pub categories: usize,
    pub highlight: String,
    pub top_growth: Option<String>,
}

/// Left side control panel with chart selection and export controls.
pub struct ControlPanel {
    pub selected: usize,
    pub show_summary: bool,
    pub export_dir: Option<PathBuf>,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            selected: ChartVariant::ALL.len() - 1,
            show_summary: false,
            export_dir: None,
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_variant(&self) -> ChartVariant {
        ChartVariant::ALL[self.selected.min(ChartVariant::ALL.len() - 1)]
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, facts: &ReportFacts) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Sales YoY Report")
                    .size(22.0)
                    .color(Color32::from_rgb(36, 113, 163)),
            );
            ui.label(
                RichText::new("Category variance by season")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Report Section =====
        ui.label(RichText::new("📁 Report").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                let file_name = facts
                    .input
                    .as_ref()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "No file".to_string());
                egui::Grid::new("report_facts")
                    .num_columns(2)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("Input:");
                        ui.label(RichText::new(file_name).size(12.0));
                        ui.end_row();
                        ui.label("Records:");
                        ui.label(facts.records.to_string());
                        ui.end_row();
                        ui.label("Dropped rows:");
                        ui.label(facts.dropped.to_string());
                        ui.end_row();
                        ui.label("Categories:");
                        ui.label(facts.categories.to_string());
                        ui.end_row();
                        ui.label("Highlighted:");
                        ui.label(
                            RichText::new(&facts.highlight).color(Color32::from_rgb(36, 113, 163)),
                        );
                        ui.end_row();
                        ui.label("Top growth:");
                        ui.label(facts.top_growth.as_deref().unwrap_or("-"));
                        ui.end_row();
                    });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Charts Section =====
        ui.label(RichText::new("📈 Charts").size(14.0).strong());
        ui.add_space(5.0);

        for (idx, variant) in ChartVariant::ALL.iter().enumerate() {
            if ui
                .selectable_label(self.selected == idx, variant.display_name())
                .clicked()
                && self.selected != idx
            {
                action = ControlPanelAction::SelectVariant(idx);
            }
        }
        ui.add_space(5.0);
        ui.checkbox(&mut self.show_summary, "Show summary table");

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.label(RichText::new("💾 Export").size(14.0).strong());
        ui.add_space(5.0);

        if let Some(dir) = &self.export_dir {
            ui.label(
                RichText::new(dir.display().to_string())
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }
        ui.horizontal(|ui| {
            let export_button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                .min_size(egui::vec2(130.0, 30.0));
            if ui.add(export_button).clicked() {
                action = ControlPanelAction::Export;
            }
            let open_button = egui::Button::new(RichText::new("🔍 Open Infographic").size(14.0))
                .min_size(egui::vec2(150.0, 30.0));
            if ui.add(open_button).clicked() {
                action = ControlPanelAction::OpenInfographic;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    SelectVariant(usize),
    Export,
    OpenInfographic,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_the_infographic() {
        let panel = ControlPanel::new();
        assert_eq!(panel.selected_variant(), ChartVariant::Infographic);
        assert_eq!(panel.status, "Ready");
    }

    #[test]
    fn out_of_range_selection_is_clamped() {
        let panel = ControlPanel {
            selected: 42,
            ..ControlPanel::default()
        };
        assert_eq!(panel.selected_variant(), ChartVariant::Infographic);
    }
}
