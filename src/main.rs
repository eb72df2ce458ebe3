use clap::Parser;
use qr_station::{camera, cli, config, decoder, error, station};
use cli::{Cli, Commands};
use config::Config;
use error::{Result, StationError};
use qr_station_common::CodeDecoder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    let config = Config::load_from(&config_path)?;

    match cli.command {
        Commands::Run { snapshot, camera, still_dir, mode, ticks, no_console } => {
            println!("📷 qr-station - スキャン\n");

            let mut config = config;
            if let Some(backend) = camera {
                config.camera.backend = backend;
            }
            if still_dir.is_some() {
                config.camera.still_dir = still_dir;
            }
            if let Some(mode) = mode {
                config.start_mode = mode;
            }
            config.validate()?;

            let options = station::RunOptions {
                snapshot,
                max_ticks: ticks,
                console: !no_console,
            };
            station::run(&config, options).await?;
        }

        Commands::Decode { images } => {
            let mut qr = decoder::QrDecoder::new();
            for path in &images {
                let frame = image::open(path)
                    .map_err(|e| StationError::ImageLoad(format!("{}: {}", path.display(), e)))?
                    .to_rgb8();
                let detections = qr.decode(&frame);

                println!("{} ({}件)", path.display(), detections.len());
                for d in &detections {
                    println!(
                        "  [{}, {}, {}x{}] {}",
                        d.bbox.left, d.bbox.top, d.bbox.width, d.bbox.height, d.payload
                    );
                }
            }
        }

        Commands::Devices => {
            let devices = camera::list_devices()?;
            if devices.is_empty() {
                println!("カメラが見つかりません");
            }
            for (index, name) in devices {
                println!("  {:<5} {}", index, name);
            }
        }

        Commands::Config { show, init, set_start_mode } => {
            let mut config = if init { Config::default() } else { config };
            let mut changed = init;

            if let Some(mode) = set_start_mode {
                config.start_mode = mode;
                changed = true;
            }
            if changed {
                config.save_to(&config_path)?;
                println!("✔ 設定を保存しました: {}", config_path.display());
            }

            if show || !changed {
                println!("設定ファイル: {}", config_path.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "qr_station=debug,qr_station_common=debug"
    } else {
        "qr_station=info,qr_station_common=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
