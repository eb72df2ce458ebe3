//! 標準入力のキー操作（ヘッドレス実行時の画面ボタン代わり）
//!
//! | 入力 | 動作 |
//! |------|------|
//! | `m` | モード切替 |
//! | `c` | 全クリア |
//! | `s` | 送信 |
//! | `r <内容>` | 品目を1件削除 |

use qr_station_common::Result;
use qr_station_common::{CommandSender, InputEvent, InputEventSource, StationCommand};
use std::io::BufRead;

#[derive(Debug, Default)]
pub struct ConsoleKeys {
    attached: bool,
}

impl ConsoleKeys {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputEventSource for ConsoleKeys {
    fn name(&self) -> &str {
        "console"
    }

    fn attach(&mut self, sender: CommandSender) -> Result<()> {
        if self.attached {
            return Ok(());
        }
        // 標準入力の読み取りは中断できないため、スレッドは切り離す
        std::thread::Builder::new()
            .name("console-keys".into())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    let Ok(line) = line else { break };
                    match parse_command(&line) {
                        Some(command) => {
                            if !sender.send(command) {
                                break;
                            }
                        }
                        None if line.trim().is_empty() => {}
                        None => tracing::warn!(input = %line.trim(), "不明なキー入力 (m / c / s / r <内容>)"),
                    }
                }
            })?;
        self.attached = true;
        Ok(())
    }
}

/// 1行の入力をコマンドに変換
pub fn parse_command(line: &str) -> Option<StationCommand> {
    let line = line.trim();
    if let Some(payload) = line.strip_prefix("r ") {
        let payload = payload.trim();
        return (!payload.is_empty()).then(|| StationCommand::RemoveItem(payload.to_string()));
    }
    match line {
        "m" | "mode" => Some(InputEvent::ToggleMode.into()),
        "c" | "clear" => Some(InputEvent::ClearAll.into()),
        "s" | "send" => Some(InputEvent::Submit.into()),
        _ => None,
    }
}
