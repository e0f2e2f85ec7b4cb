use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use eframe::egui;
use tracing::warn;

use crate::clicker::{self, ClickerHandle};
use crate::config::{EngineConfig, TARGET_CPS_RANGE};
use crate::report::{ChannelReporter, Report, StatusTone};

const FG_COLOR: egui::Color32 = egui::Color32::from_rgb(0xE0, 0xE0, 0xE0);
const RUNNING_COLOR: egui::Color32 = egui::Color32::from_rgb(0x1D, 0xB9, 0x54);
const STOPPED_COLOR: egui::Color32 = egui::Color32::from_rgb(0xFF, 0xA5, 0x00);
const WARNING_COLOR: egui::Color32 = egui::Color32::from_rgb(0xFF, 0x55, 0x55);

fn tone_color(tone: Option<StatusTone>) -> egui::Color32 {
    match tone {
        Some(StatusTone::Running) => RUNNING_COLOR,
        Some(StatusTone::Stopped) => STOPPED_COLOR,
        Some(StatusTone::Warning) => WARNING_COLOR,
        None => FG_COLOR,
    }
}

fn custom_slider(
    ui: &mut egui::Ui,
    value: &mut u32,
    range: std::ops::RangeInclusive<u32>,
    enabled: bool,
) -> SliderOutcome {
    let desired_width = ui.available_width();
    let height = 20.0;
    let (response, painter) = ui.allocate_painter(
        egui::vec2(desired_width, height),
        egui::Sense::click_and_drag(),
    );

    let old_value = *value;
    let mut outcome = SliderOutcome::default();

    if enabled && (response.dragged() || response.clicked()) {
        if let Some(pos) = response.interact_pointer_pos() {
            let rect = response.rect;
            let normalized = ((pos.x - rect.left()) / rect.width()).clamp(0.0, 1.0);
            let range_size = range.end() - range.start();
            *value = range.start() + (normalized * range_size as f32).round() as u32;
            outcome.changed = old_value != *value;
        }
    }
    if enabled {
        outcome.committed = response.drag_released() || response.clicked();
    }

    painter.rect_filled(
        response.rect,
        egui::Rounding::same(8.0),
        egui::Color32::from_rgb(60, 60, 60),
    );

    let range_size = (range.end() - range.start()) as f32;
    let fill_width = if range_size == 0.0 {
        response.rect.width()
    } else {
        response.rect.width() * (*value - range.start()) as f32 / range_size
    };
    let fill_rect = egui::Rect::from_min_size(
        response.rect.left_top(),
        egui::vec2(fill_width, height),
    );
    painter.rect_filled(
        fill_rect,
        egui::Rounding::same(8.0),
        RUNNING_COLOR,
    );

    outcome
}

/// `committed` is set when the user lets go of the slider.
#[derive(Default, Clone, Copy)]
struct SliderOutcome {
    changed: bool,
    committed: bool,
}

pub struct AutoClickerApp {
    config: EngineConfig,
    saved_config: EngineConfig,
    config_path: PathBuf,
    clicker: Option<ClickerHandle>,
    reporter: Arc<ChannelReporter>,
    reports: Receiver<Report>,
    status: String,
    status_tone: Option<StatusTone>,
    log: String,
}

impl AutoClickerApp {
    pub fn new(config_path: PathBuf) -> Self {
        let (reporter, reports) = ChannelReporter::new();
        let mut app = Self {
            config: EngineConfig::default(),
            saved_config: EngineConfig::default(),
            config_path,
            clicker: None,
            reporter: Arc::new(reporter),
            reports,
            status: "Status: Waiting...".to_string(),
            status_tone: None,
            log: String::new(),
        };
        app.load_config();
        app
    }

    fn load_config(&mut self) {
        match EngineConfig::load(&self.config_path) {
            Ok(Some(config)) => {
                self.config = config;
                self.saved_config = config;
                self.append_log(&format!(
                    "Loaded config.json: target_cps={}, min_cps={}\n",
                    config.target_cps, config.min_cps
                ));
            }
            Ok(None) => self.append_log("config.json not found, using defaults.\n"),
            Err(e) => {
                warn!(%e, "failed to load config");
                self.set_status(format!("Failed to load config.json: {e}"), StatusTone::Warning);
            }
        }
    }

    /// Writes the config file unless it already holds the current values.
    fn commit_config(&mut self) {
        if self.config == self.saved_config {
            return;
        }
        match self.config.save(&self.config_path) {
            Ok(()) => {
                self.saved_config = self.config;
                self.append_log(&format!(
                    "Saved config.json: target_cps={}, min_cps={}\n",
                    self.config.target_cps, self.config.min_cps
                ));
            }
            Err(e) => {
                warn!(%e, "failed to save config");
                self.set_status(format!("Failed to save config.json: {e}"), StatusTone::Warning);
            }
        }
    }

    fn append_log(&mut self, line: &str) {
        self.log.push_str(line);
    }

    fn set_status(&mut self, text: String, tone: StatusTone) {
        self.status = text;
        self.status_tone = Some(tone);
    }

    fn drain_reports(&mut self) {
        while let Ok(report) = self.reports.try_recv() {
            match report {
                Report::Log(line) => self.append_log(&line),
                Report::Status(text, tone) => self.set_status(text, tone),
            }
        }
    }

    fn is_running(&self) -> bool {
        self.clicker.is_some()
    }

    fn toggle_clicker(&mut self) {
        if let Some(handle) = self.clicker.take() {
            handle.stop();
            return;
        }
        match clicker::start(self.config, self.reporter.clone()) {
            Ok(handle) => self.clicker = Some(handle),
            Err(e) => {
                warn!(%e, "could not start clicker");
                self.set_status(format!("Error: {e}"), StatusTone::Warning);
            }
        }
    }
}

impl eframe::App for AutoClickerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Request continuous repainting to update status
        ctx.request_repaint();

        // A run that aborted on its own still has to be joined.
        if self.clicker.as_ref().is_some_and(ClickerHandle::is_finished) {
            if let Some(handle) = self.clicker.take() {
                handle.stop();
            }
        }
        self.drain_reports();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Auto Clicker");

            ui.add_space(10.0);

            let running = self.is_running();
            let mut target = self.config.target_cps;
            let mut min = self.config.min_cps;
            let mut changed = false;
            let mut committed = false;

            ui.vertical(|ui| {
                ui.label(format!("Target CPS: {target}"));
                let slid = custom_slider(ui, &mut target, TARGET_CPS_RANGE, !running);
                if slid.changed {
                    min = min.min(target - 1);
                }
                changed |= slid.changed;
                committed |= slid.committed;

                ui.add_space(5.0);

                ui.label(format!("Min CPS: {min}"));
                let slid = custom_slider(ui, &mut min, 0..=target - 1, !running);
                changed |= slid.changed;
                committed |= slid.committed;
            });

            if changed {
                match EngineConfig::new(target, min) {
                    Ok(config) => self.config = config,
                    Err(e) => self.set_status(e.to_string(), StatusTone::Warning),
                }
            }
            if committed {
                self.commit_config();
            }

            ui.add_space(10.0);

            if ui
                .add(
                    egui::Button::new(if running { "Stop Clicker" } else { "Start Clicker" })
                        .fill(if running {
                            egui::Color32::from_rgb(200, 0, 0)
                        } else {
                            egui::Color32::from_rgb(0, 120, 212)
                        }),
                )
                .clicked()
            {
                self.toggle_clicker();
            }

            ui.add_space(10.0);

            ui.colored_label(tone_color(self.status_tone), &self.status);

            ui.add_space(10.0);

            egui::ScrollArea::vertical()
                .stick_to_bottom(true)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.monospace(&self.log);
                });
        });
    }
}
