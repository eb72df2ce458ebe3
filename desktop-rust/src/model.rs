use qr_station_common::{ScanMode, SessionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// 画面表示用の状態。セッションの変更通知だけで更新する
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    pub mode: ScanMode,
    pub operator: Option<String>,
    pub items: Vec<String>,
    pub notice: Option<Notice>,
}

impl DisplayState {
    pub fn new(mode: ScanMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::ItemAdded(item) => self.items.push(item.clone()),
            SessionEvent::ItemRemoved(item) => self.items.retain(|i| i != item),
            SessionEvent::ItemsCleared => self.items.clear(),
            SessionEvent::OperatorChanged(op) => self.operator = Some(op.clone()),
            SessionEvent::ModeChanged(mode) => self.mode = *mode,
            SessionEvent::Submitted { count, operator } => {
                self.notice = Some(Notice {
                    level: NoticeLevel::Info,
                    text: format!("Sent {count} items ({operator})"),
                });
            }
            SessionEvent::Rejected(err) => {
                self.notice = Some(Notice {
                    level: NoticeLevel::Warn,
                    text: err.to_string(),
                });
            }
        }
    }

    pub fn operator_label(&self) -> &str {
        self.operator.as_deref().unwrap_or("-")
    }
}
