#![windows_subsystem = "windows"]

mod capture;
mod clicker;
mod config;
mod error;
mod gui;
mod observer;
mod policy;
mod report;
mod synth;
mod window;

use std::path::PathBuf;

use eframe::egui;
use gui::AutoClickerApp;

fn main() -> eframe::Result<()> {
    setup_tracing();

    let app = AutoClickerApp::new(PathBuf::from(config::CONFIG_PATH));
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([400.0, 400.0])
            .with_resizable(false)
            .with_decorations(true),
        centered: true,
        ..Default::default()
    };

    eframe::run_native(
        "Auto Clicker",
        options,
        Box::new(|_cc| Box::new(app)),
    )
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
