use thiserror::Error;

#[derive(Error, Debug)]
pub enum StationError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("カメラを開けません: {0}")]
    CameraOpen(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("このビルドでは未対応です（feature `{0}` を有効にしてください）")]
    FeatureDisabled(&'static str),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] qr_station_common::Error),
}

pub type Result<T> = std::result::Result<T, StationError>;
