// Salon Calendar Application
// Main entry point

use salon_calendar::services::config::AppConfig;
use salon_calendar::ui_egui::CalendarApp;

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::init();

    log::info!("Starting Salon Calendar");

    let config = AppConfig::load().unwrap_or_else(|err| {
        log::error!("Failed to load configuration, falling back to defaults: {err:#}");
        AppConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Salon Calendar",
        options,
        Box::new(move |cc| Ok(Box::new(CalendarApp::new(cc, config)))),
    )
}
