//! 入力イベント層
//!
//! 画面ボタン・GPIOボタン・コンソールなど異なるトリガを
//! 3つの論理イベント（モード切替 / 全クリア / 送信）に変換し、
//! スケジューラが消費する単一キューへ流す。
//!
//! 割り込みスレッドからはキューへ送るだけで、セッションの変更は
//! 常にスケジューラ側で1件ずつ適用される。

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use crate::error::Result;

/// 論理入力イベント
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    ToggleMode,
    ClearAll,
    Submit,
}

/// キューに流れるコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationCommand {
    Input(InputEvent),
    /// 一覧の削除ボタン（誤読の取り消し）
    RemoveItem(String),
}

impl From<InputEvent> for StationCommand {
    fn from(event: InputEvent) -> Self {
        StationCommand::Input(event)
    }
}

/// キュー送信側。割り込みスレッドへ複製して渡せる
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<StationCommand>,
}

impl CommandSender {
    /// 受信側が既に破棄されていれば false
    pub fn send(&self, command: impl Into<StationCommand>) -> bool {
        self.tx.send(command.into()).is_ok()
    }
}

/// キュー受信側。スケジューラのみが保持する
#[derive(Debug)]
pub struct CommandReceiver {
    rx: Receiver<StationCommand>,
}

impl CommandReceiver {
    /// 溜まっているコマンドを到着順にすべて取り出す（ブロックしない）
    pub fn drain(&self) -> Vec<StationCommand> {
        self.rx.try_iter().collect()
    }
}

/// コマンドキューを作成
pub fn command_queue() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::channel();
    (CommandSender { tx }, CommandReceiver { rx })
}

/// 入力イベント源
///
/// `attach` 以降、トリガを受けるたびに送信側へコマンドを流す。
/// 保持しているリソース（GPIO割り込み、スレッド）は Drop で解放する。
pub trait InputEventSource {
    fn name(&self) -> &str;
    fn attach(&mut self, sender: CommandSender) -> Result<()>;
}

/// 画面ボタン（押下ごとに同期的に1イベント、デバウンス不要）
#[derive(Debug, Default)]
pub struct UiButtons {
    sender: Option<CommandSender>,
}

impl UiButtons {
    pub fn new() -> Self {
        Self::default()
    }

    /// ボタン押下。未接続なら false
    pub fn press(&self, event: InputEvent) -> bool {
        self.sender.as_ref().is_some_and(|s| s.send(event))
    }

    /// 一覧の削除ボタン
    pub fn remove(&self, payload: &str) -> bool {
        self.sender
            .as_ref()
            .is_some_and(|s| s.send(StationCommand::RemoveItem(payload.to_string())))
    }
}

impl InputEventSource for UiButtons {
    fn name(&self) -> &str {
        "ui-buttons"
    }

    fn attach(&mut self, sender: CommandSender) -> Result<()> {
        self.sender = Some(sender);
        Ok(())
    }
}

/// GPIOなどの信号線ごとのデバウンス
///
/// 同じ線で、最後に受理したエッジから窓時間内に来たエッジは捨てる。
/// 線同士は独立しており、互いをブロックしない。
#[derive(Debug, Clone)]
pub struct SignalDebouncer {
    window: Duration,
    lines: HashMap<u8, LineState>,
}

#[derive(Debug, Clone)]
struct LineState {
    event: InputEvent,
    last_accepted: Option<Instant>,
}

impl SignalDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            lines: HashMap::new(),
        }
    }

    /// 信号線に論理イベントを割り当てる
    pub fn with_line(mut self, line: u8, event: InputEvent) -> Self {
        self.lines.insert(
            line,
            LineState {
                event,
                last_accepted: None,
            },
        );
        self
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn lines(&self) -> impl Iterator<Item = (u8, InputEvent)> + '_ {
        self.lines.iter().map(|(line, state)| (*line, state.event))
    }

    /// 立下りエッジを受けたとき呼ぶ。受理されたら論理イベントを返す
    pub fn on_edge(&mut self, line: u8, at: Instant) -> Option<InputEvent> {
        let Some(state) = self.lines.get_mut(&line) else {
            tracing::debug!(line, "未割当の信号線を無視");
            return None;
        };

        if let Some(last) = state.last_accepted {
            if at.saturating_duration_since(last) < self.window {
                tracing::trace!(line, "デバウンス窓内のエッジを破棄");
                return None;
            }
        }

        state.last_accepted = Some(at);
        Some(state.event)
    }
}
