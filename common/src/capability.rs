//! 外部コラボレータのインターフェース
//!
//! デコード・描画・表示・送信はコアの外側にあり、コアはこのトレイト越しにのみ呼び出す。

use crate::error::Result;
use crate::types::{Annotation, Detection, Frame};

/// フレームからコードを検出する（副作用なし、空でもよい）
pub trait CodeDecoder {
    fn decode(&mut self, frame: &Frame) -> Vec<Detection>;
}

/// フレームへオーバーレイを描画する。フレームサイズは変えないこと
pub trait FrameAnnotator {
    fn draw(&self, frame: &mut Frame, annotations: &[Annotation]);
}

/// 描画済みフレームを表示面へ送る（戻り値なし）
pub trait RenderSink {
    fn present(&mut self, frame: Frame);
}

/// 蓄積した品目を作業者名とともに下流へ送る。リトライは実装側の責務
pub trait BatchSubmitter {
    fn submit(&mut self, items: &[String], operator: &str) -> Result<()>;
}

/// 表示しないシンク（テストやプレビュー無しの運用向け）
#[derive(Debug, Default)]
pub struct NullSink {
    pub presented: usize,
}

impl RenderSink for NullSink {
    fn present(&mut self, _frame: Frame) {
        self.presented += 1;
    }
}
