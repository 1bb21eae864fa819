mod app;
mod color;
mod ui;

use app::MailTriageApp;
use eframe::egui;
use mail_triage::config::{load_config, Config};

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (config, config_error) = match load_config() {
        Ok(cfg) => (cfg, None),
        Err(e) => {
            log::error!("Config error, falling back to defaults: {e:#}");
            (Config::default(), Some(format!("Config error: {e:#}")))
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Mail Triage – Email Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(MailTriageApp::new(config, config_error)))),
    )
}
