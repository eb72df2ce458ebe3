//! 物理入力の選択
//!
//! 画面ボタン（デスクトップ）やコンソールキーとは別に、設定で選んだ
//! 信号入力を同じコマンドキューへ接続する。

pub mod console;
#[cfg(feature = "rpi")]
pub mod gpio;

use crate::config::{InputBackend, InputConfig};
use crate::error::Result;
#[cfg(not(feature = "rpi"))]
use crate::error::StationError;
use qr_station_common::{InputEvent, InputEventSource, SignalDebouncer};

pub use console::ConsoleKeys;

/// ピン割当とデバウンス窓から信号デバウンサを作る
pub fn debouncer_for(config: &InputConfig) -> SignalDebouncer {
    SignalDebouncer::new(config.debounce())
        .with_line(config.mode_pin, InputEvent::ToggleMode)
        .with_line(config.clear_pin, InputEvent::ClearAll)
        .with_line(config.submit_pin, InputEvent::Submit)
}

/// 設定された信号入力。interactive なら None
pub fn open_signal_input(config: &InputConfig) -> Result<Option<Box<dyn InputEventSource>>> {
    match config.backend {
        InputBackend::Interactive => Ok(None),
        InputBackend::Gpio => open_gpio(config).map(Some),
    }
}

#[cfg(feature = "rpi")]
fn open_gpio(config: &InputConfig) -> Result<Box<dyn InputEventSource>> {
    Ok(Box::new(gpio::GpioButtons::new(config)))
}

#[cfg(not(feature = "rpi"))]
fn open_gpio(_config: &InputConfig) -> Result<Box<dyn InputEventSource>> {
    Err(StationError::FeatureDisabled("rpi"))
}
