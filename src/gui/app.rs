//! Sales YoY Report Main Application
//! Main window with control panel and chart viewer.

use crate::charts::ChartVariant;
use crate::config::ReportConfig;
use crate::export;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, ReportFacts};
use crate::report::Report;
use egui::SidePanel;
use std::path::PathBuf;
use tracing::{error, info};

/// Main application window.
pub struct ReportApp {
    config: ReportConfig,
    report: Report,
    facts: ReportFacts,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl ReportApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: ReportConfig,
        report: Report,
        export_dir: Option<PathBuf>,
    ) -> Self {
        // Figure colours are chosen for a light background
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let facts = ReportFacts {
            input: config.input_path.clone(),
            records: report.record_count(),
            dropped: report.clean_stats.incomplete
                + report.clean_stats.unfulfilled
                + report.clean_stats.out_of_window,
            categories: report.summary.len(),
            highlight: config.highlight_category.clone(),
            top_growth: report.summary.top_growth().map(|r| r.category_name.clone()),
        };
        let chart_viewer = ChartViewer::new(report.figures(&config));
        let mut control_panel = ControlPanel::new();
        control_panel.export_dir = export_dir;

        Self {
            config,
            report,
            facts,
            control_panel,
            chart_viewer,
        }
    }

    /// Export all figures into a folder picked by the user
    fn handle_export(&mut self) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new();
        if let Some(dir) = &self.control_panel.export_dir {
            dialog = dialog.set_directory(dir);
        }
        let dir = dialog.pick_folder()?;

        match export::export_report(
            &self.report,
            &self.chart_viewer.figures,
            &dir,
            &self.config.chart,
        ) {
            Ok(paths) => {
                info!(dir = %dir.display(), "exported from viewer");
                self.control_panel
                    .set_status(format!("Exported {} files", paths.len()));
                self.control_panel.export_dir = Some(dir.clone());
                Some(dir)
            }
            Err(e) => {
                error!(error = %e, "export failed");
                self.control_panel.set_status(format!("Error: {e}"));
                None
            }
        }
    }

    /// Open the exported infographic, exporting first when nothing was written yet
    fn handle_open_infographic(&mut self) {
        let dir = match self.control_panel.export_dir.clone() {
            Some(dir) if export::figure_path(&dir, ChartVariant::Infographic).is_file() => dir,
            _ => match self.handle_export() {
                Some(dir) => dir,
                None => return,
            },
        };

        let path = export::figure_path(&dir, ChartVariant::Infographic);
        if let Err(e) = export::open_path(&path) {
            error!(error = %e, "open failed");
            self.control_panel.set_status(format!("Error: {e}"));
        }
    }
}

impl eframe::App for ReportApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui, &self.facts);

                    match action {
                        ControlPanelAction::SelectVariant(idx) => {
                            self.control_panel.selected = idx;
                        }
                        ControlPanelAction::Export => {
                            self.handle_export();
                        }
                        ControlPanelAction::OpenInfographic => self.handle_open_infographic(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(
                ui,
                self.control_panel.selected_variant(),
                &self.report,
                &self.config.highlight_category,
                self.control_panel.show_summary,
            );
        });
    }
}
