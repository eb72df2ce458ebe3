//! GPIOボタン（rppal）
//!
//! 各ピンはプルアップ入力で、押下＝立下りエッジ。割り込みスレッドでは
//! デバウンス判定とキュー送信だけを行う。

use crate::config::InputConfig;
use qr_station_common::{Error, Result};
use qr_station_common::{CommandSender, InputEventSource, SignalDebouncer};
use rppal::gpio::{Gpio, InputPin, Trigger};
use std::sync::{Arc, Mutex};
use std::time::Instant;

pub struct GpioButtons {
    debouncer: Arc<Mutex<SignalDebouncer>>,
    /// 割り込みを保持し続けるため Drop まで持つ
    pins: Vec<InputPin>,
}

impl GpioButtons {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            debouncer: Arc::new(Mutex::new(super::debouncer_for(config))),
            pins: Vec::new(),
        }
    }
}

impl InputEventSource for GpioButtons {
    fn name(&self) -> &str {
        "gpio"
    }

    fn attach(&mut self, sender: CommandSender) -> Result<()> {
        let gpio = Gpio::new().map_err(|e| Error::Input(e.to_string()))?;

        let lines: Vec<_> = match self.debouncer.lock() {
            Ok(d) => d.lines().collect(),
            Err(_) => return Err(Error::Input("デバウンス状態が壊れています".into())),
        };

        for (line, event) in lines {
            let mut pin = gpio
                .get(line)
                .map_err(|e| Error::Input(format!("GPIO{}: {}", line, e)))?
                .into_input_pullup();

            let debouncer = Arc::clone(&self.debouncer);
            let sender = sender.clone();
            pin.set_async_interrupt(Trigger::FallingEdge, None, move |_| {
                let accepted = debouncer
                    .lock()
                    .ok()
                    .and_then(|mut d| d.on_edge(line, Instant::now()));
                if let Some(event) = accepted {
                    tracing::debug!(line, ?event, "GPIOボタン");
                    sender.send(event);
                }
            })
            .map_err(|e| Error::Input(format!("GPIO{}: {}", line, e)))?;

            tracing::info!(line, ?event, "GPIOボタンを登録");
            self.pins.push(pin);
        }
        Ok(())
    }
}

impl Drop for GpioButtons {
    fn drop(&mut self) {
        for pin in &mut self.pins {
            if let Err(e) = pin.clear_async_interrupt() {
                tracing::warn!(pin = pin.pin(), error = %e, "GPIO割り込みの解除に失敗");
            }
        }
    }
}
