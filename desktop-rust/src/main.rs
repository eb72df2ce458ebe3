mod app;
mod io;
mod model;

use anyhow::anyhow;
use app::{configure_fonts, StationApp};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("desktop_rust=info,qr_station=info,qr_station_common=info")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 引数は設定ファイルのパスのみ
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = io::load_config(config_path.as_deref())?;
    let station = io::open_station(&config)?;
    let app = StationApp::new(&config, station)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.viewport.width as f32 + 240.0, config.viewport.height as f32 + 90.0]),
        ..Default::default()
    };
    eframe::run_native(
        "QR Station",
        options,
        Box::new(move |cc| {
            configure_fonts(&cc.egui_ctx);
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow!("{e}"))
}
