//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// 入力源（GPIOなど）の接続失敗
    #[error("Input source error: {0}")]
    Input(String),

    #[error("Submit error: {0}")]
    Submit(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
