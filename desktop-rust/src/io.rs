use anyhow::{Context, Result};
use std::path::Path;

use qr_station::config::Config;
use qr_station::input::open_signal_input;
use qr_station::station::Station;

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::config_path().context("resolve config path")?,
    };
    Config::load_from(&path).with_context(|| format!("load {}", path.display()))
}

/// カメラ・送信先・物理ボタンを設定どおりに接続したステーション
pub fn open_station(config: &Config) -> Result<Station> {
    let mut station = Station::open(config).context("open station")?;
    if let Some(source) = open_signal_input(&config.input).context("open signal input")? {
        station.attach(source).context("attach signal input")?;
    }
    Ok(station)
}
