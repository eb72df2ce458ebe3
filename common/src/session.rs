//! スキャンセッション（モード状態機械）
//!
//! 状態は IdentifyOperator / CollectItems の2つで、遷移はモード切替のみ。
//! 検出結果の効果は、そのフレームを処理した時点のモードだけで決まる。
//!
//! 表示層は `take_events()` で変更通知を受け取り、一覧や作業者表示を更新する。
//! 一覧そのものを状態として参照しないこと。

use thiserror::Error;

use crate::capability::BatchSubmitter;
use crate::dedup::DedupSet;
use crate::input::{InputEvent, StationCommand};
use crate::types::ScanMode;

/// 操作が受け付けられなかった理由（表示層へ通知する）
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("clear all is not applicable in {0} mode")]
    NotApplicable(ScanMode),

    #[error("no scan data or operator")]
    NothingToSubmit,

    #[error("submit failed: {0}")]
    SubmitFailed(String),
}

/// セッションの変更通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// 一覧に削除可能なエントリを追加
    ItemAdded(String),
    ItemRemoved(String),
    ItemsCleared,
    /// 作業者表示を更新
    OperatorChanged(String),
    ModeChanged(ScanMode),
    Submitted { count: usize, operator: String },
    Rejected(SessionError),
}

/// 1件の検出がセッションに与えた効果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionEffect {
    NewItem,
    AlreadySeen,
    OperatorIdentified,
    /// 空のペイロード
    Ignored,
}

/// 送信完了の控え
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub items: Vec<String>,
    pub operator: String,
}

#[derive(Debug, Default)]
pub struct ScanSession {
    mode: ScanMode,
    items: DedupSet,
    operator: Option<String>,
    events: Vec<SessionEvent>,
}

impl ScanSession {
    pub fn new(mode: ScanMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn items(&self) -> &DedupSet {
        &self.items
    }

    pub fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }

    /// 全クリアが有効か（画面ボタンの有効/無効に使う）
    pub fn can_clear(&self) -> bool {
        self.mode == ScanMode::CollectItems
    }

    /// 送信の前提条件を満たしているか
    pub fn can_submit(&self) -> bool {
        !self.items.is_empty() && self.operator.is_some()
    }

    /// 溜まった変更通知を取り出す
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// 検出1件を現在のモードで適用
    pub fn apply_detection(&mut self, payload: &str) -> DetectionEffect {
        if payload.trim().is_empty() {
            return DetectionEffect::Ignored;
        }

        match self.mode {
            ScanMode::CollectItems => {
                if self.items.insert(payload) {
                    tracing::info!(payload, "品目を追加");
                    self.events.push(SessionEvent::ItemAdded(payload.to_string()));
                    DetectionEffect::NewItem
                } else {
                    DetectionEffect::AlreadySeen
                }
            }
            ScanMode::IdentifyOperator => {
                // 同じ作業者でも毎回上書き（最新の検出を採用）
                self.operator = Some(payload.to_string());
                self.events
                    .push(SessionEvent::OperatorChanged(payload.to_string()));
                DetectionEffect::OperatorIdentified
            }
        }
    }

    /// モード切替。品目と作業者はそのまま残す
    pub fn toggle_mode(&mut self) -> ScanMode {
        self.mode = self.mode.toggled();
        tracing::info!(mode = %self.mode, "モード切替");
        self.events.push(SessionEvent::ModeChanged(self.mode));
        self.mode
    }

    /// 品目を全削除（作業者とモードは残す）。IdentifyOperator では無効
    pub fn clear_all(&mut self) -> Result<usize, SessionError> {
        if !self.can_clear() {
            let err = SessionError::NotApplicable(self.mode);
            self.events.push(SessionEvent::Rejected(err.clone()));
            return Err(err);
        }
        Ok(self.clear_items())
    }

    fn clear_items(&mut self) -> usize {
        let count = self.items.clear();
        self.events.push(SessionEvent::ItemsCleared);
        count
    }

    /// 品目を1件削除。存在しなくてもエラーにしない
    pub fn remove_item(&mut self, payload: &str) -> bool {
        let removed = self.items.remove(payload);
        if removed {
            self.events.push(SessionEvent::ItemRemoved(payload.to_string()));
        }
        removed
    }

    /// 蓄積品目と作業者を送信し、成功したら品目をクリアする
    ///
    /// 作業者はシフト中持ち越すためクリアしない。
    pub fn submit(
        &mut self,
        submitter: &mut dyn BatchSubmitter,
    ) -> Result<SubmitReceipt, SessionError> {
        let operator = match self.operator.clone() {
            Some(op) if self.can_submit() => op,
            _ => {
                let err = SessionError::NothingToSubmit;
                self.events.push(SessionEvent::Rejected(err.clone()));
                return Err(err);
            }
        };

        let items = self.items.to_vec();
        if let Err(e) = submitter.submit(&items, &operator) {
            tracing::warn!(error = %e, "送信失敗");
            let err = SessionError::SubmitFailed(e.to_string());
            self.events.push(SessionEvent::Rejected(err.clone()));
            return Err(err);
        }

        tracing::info!(count = items.len(), operator = %operator, "送信完了");
        self.events.push(SessionEvent::Submitted {
            count: items.len(),
            operator: operator.clone(),
        });
        self.clear_items();

        Ok(SubmitReceipt { items, operator })
    }

    /// キューから取り出したコマンドを1件適用
    ///
    /// 失敗は通知として記録済みなので、呼び出し側は結果を捨ててよい。
    pub fn apply(&mut self, command: StationCommand, submitter: &mut dyn BatchSubmitter) {
        match command {
            StationCommand::Input(InputEvent::ToggleMode) => {
                self.toggle_mode();
            }
            StationCommand::Input(InputEvent::ClearAll) => {
                let _ = self.clear_all();
            }
            StationCommand::Input(InputEvent::Submit) => {
                let _ = self.submit(submitter);
            }
            StationCommand::RemoveItem(payload) => {
                self.remove_item(&payload);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};

    #[derive(Default)]
    struct RecordingSubmitter {
        calls: Vec<(Vec<String>, String)>,
        fail: bool,
    }

    impl BatchSubmitter for RecordingSubmitter {
        fn submit(&mut self, items: &[String], operator: &str) -> Result<()> {
            self.calls.push((items.to_vec(), operator.to_string()));
            if self.fail {
                return Err(Error::Submit("downstream unavailable".into()));
            }
            Ok(())
        }
    }

    fn items_of(session: &ScanSession) -> Vec<&str> {
        session.items().iter().collect()
    }

    #[test]
    fn test_default_mode_is_collect_items() {
        assert_eq!(ScanSession::default().mode(), ScanMode::CollectItems);
    }

    #[test]
    fn test_each_payload_accumulated_once() {
        let mut session = ScanSession::new(ScanMode::CollectItems);
        for payload in ["A123", "B456", "A123", "A123", "B456", "C789"] {
            session.apply_detection(payload);
        }
        assert_eq!(items_of(&session), vec!["A123", "B456", "C789"]);

        let added = session
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::ItemAdded(_)))
            .count();
        assert_eq!(added, 3);
    }

    #[test]
    fn test_removed_item_is_readded_on_next_detection() {
        let mut session = ScanSession::new(ScanMode::CollectItems);
        session.apply_detection("A123");
        assert!(session.remove_item("A123"));
        assert_eq!(session.apply_detection("A123"), DetectionEffect::NewItem);
        assert_eq!(items_of(&session), vec!["A123"]);
    }

    #[test]
    fn test_remove_missing_item_is_idempotent() {
        let mut session = ScanSession::new(ScanMode::CollectItems);
        session.apply_detection("A123");
        session.take_events();
        assert!(!session.remove_item("Z999"));
        assert!(!session.remove_item("Z999"));
        assert!(session.take_events().is_empty());
        assert_eq!(session.items().len(), 1);
    }

    #[test]
    fn test_operator_overwritten_not_accumulated() {
        let mut session = ScanSession::new(ScanMode::IdentifyOperator);
        assert_eq!(
            session.apply_detection("EMP001"),
            DetectionEffect::OperatorIdentified
        );
        session.apply_detection("EMP002");
        assert_eq!(
            session.apply_detection("EMP002"),
            DetectionEffect::OperatorIdentified
        );
        assert_eq!(session.operator(), Some("EMP002"));
        assert!(session.items().is_empty());

        // 同じ作業者の再検出でも表示更新を通知する
        let changes = session
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::OperatorChanged(_)))
            .count();
        assert_eq!(changes, 3);
    }

    #[test]
    fn test_double_toggle_restores_state() {
        let mut session = ScanSession::new(ScanMode::CollectItems);
        session.apply_detection("A123");
        session.toggle_mode();
        session.apply_detection("EMP001");

        let mode = session.mode();
        let items = session.items().to_vec();
        let operator = session.operator().map(str::to_string);

        session.toggle_mode();
        session.toggle_mode();

        assert_eq!(session.mode(), mode);
        assert_eq!(session.items().to_vec(), items);
        assert_eq!(session.operator().map(str::to_string), operator);
    }

    #[test]
    fn test_clear_all_keeps_mode_and_operator() {
        let mut session = ScanSession::new(ScanMode::IdentifyOperator);
        session.apply_detection("EMP001");
        session.toggle_mode();
        session.apply_detection("A123");
        session.apply_detection("B456");

        assert_eq!(session.clear_all(), Ok(2));
        assert!(session.items().is_empty());
        assert_eq!(session.mode(), ScanMode::CollectItems);
        assert_eq!(session.operator(), Some("EMP001"));
    }

    #[test]
    fn test_clear_all_not_applicable_when_identifying() {
        let mut session = ScanSession::new(ScanMode::CollectItems);
        session.apply_detection("A123");
        session.toggle_mode();
        session.take_events();

        assert_eq!(
            session.clear_all(),
            Err(SessionError::NotApplicable(ScanMode::IdentifyOperator))
        );
        assert_eq!(items_of(&session), vec!["A123"]);
        assert_eq!(
            session.take_events(),
            vec![SessionEvent::Rejected(SessionError::NotApplicable(
                ScanMode::IdentifyOperator
            ))]
        );
    }

    #[test]
    fn test_submit_without_items_never_calls_submitter() {
        let mut session = ScanSession::new(ScanMode::IdentifyOperator);
        session.apply_detection("EMP001");
        let mut submitter = RecordingSubmitter::default();

        assert_eq!(
            session.submit(&mut submitter),
            Err(SessionError::NothingToSubmit)
        );
        assert!(submitter.calls.is_empty());
        assert_eq!(session.operator(), Some("EMP001"));
    }

    #[test]
    fn test_submit_without_operator_never_calls_submitter() {
        let mut session = ScanSession::new(ScanMode::CollectItems);
        session.apply_detection("A123");
        let mut submitter = RecordingSubmitter::default();

        assert_eq!(
            session.submit(&mut submitter),
            Err(SessionError::NothingToSubmit)
        );
        assert!(submitter.calls.is_empty());
        assert_eq!(items_of(&session), vec!["A123"]);
        assert_eq!(session.operator(), None);
    }

    #[test]
    fn test_submit_hands_batch_once_then_clears_items() {
        let mut session = ScanSession::new(ScanMode::CollectItems);
        session.apply_detection("A123");
        session.apply_detection("B456");
        session.toggle_mode();
        session.apply_detection("EMP001");
        session.take_events();

        let mut submitter = RecordingSubmitter::default();
        let receipt = session.submit(&mut submitter).expect("送信成功のはず");

        assert_eq!(
            submitter.calls,
            vec![(
                vec!["A123".to_string(), "B456".to_string()],
                "EMP001".to_string()
            )]
        );
        assert_eq!(receipt.items.len(), 2);
        assert!(session.items().is_empty());
        assert_eq!(session.operator(), Some("EMP001"));
        assert_eq!(
            session.take_events(),
            vec![
                SessionEvent::Submitted {
                    count: 2,
                    operator: "EMP001".to_string()
                },
                SessionEvent::ItemsCleared,
            ]
        );
    }

    #[test]
    fn test_failed_submit_keeps_items() {
        let mut session = ScanSession::new(ScanMode::IdentifyOperator);
        session.apply_detection("EMP001");
        session.toggle_mode();
        session.apply_detection("A123");

        let mut submitter = RecordingSubmitter {
            fail: true,
            ..Default::default()
        };
        let err = session.submit(&mut submitter).unwrap_err();
        assert!(matches!(err, SessionError::SubmitFailed(msg) if msg.contains("downstream")));
        assert_eq!(submitter.calls.len(), 1);
        assert_eq!(items_of(&session), vec!["A123"]);
    }

    #[test]
    fn test_blank_payload_ignored() {
        let mut session = ScanSession::new(ScanMode::CollectItems);
        assert_eq!(session.apply_detection("   "), DetectionEffect::Ignored);
        assert!(session.items().is_empty());
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn test_apply_commands() {
        let mut session = ScanSession::new(ScanMode::CollectItems);
        let mut submitter = RecordingSubmitter::default();
        session.apply_detection("A123");
        session.apply_detection("B456");

        session.apply(StationCommand::RemoveItem("A123".into()), &mut submitter);
        session.apply(InputEvent::ToggleMode.into(), &mut submitter);
        session.apply(InputEvent::ClearAll.into(), &mut submitter);
        assert_eq!(items_of(&session), vec!["B456"]);

        session.apply_detection("EMP001");
        session.apply(InputEvent::Submit.into(), &mut submitter);
        assert_eq!(submitter.calls.len(), 1);
        assert!(session.items().is_empty());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SessionError::NothingToSubmit.to_string(),
            "no scan data or operator"
        );
        assert_eq!(
            SessionError::NotApplicable(ScanMode::IdentifyOperator).to_string(),
            "clear all is not applicable in identify-operator mode"
        );
    }
}
