use crate::error::{Result, StationError};
use qr_station_common::{ScanMode, Viewport};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// ヘッダーに表示するライン名・部署名
    pub station_label: String,
    /// 起動時のモード
    pub start_mode: ScanMode,
    pub tick_interval_ms: u64,
    /// ヘッドレス実行時のビューポート（デスクトップは表示領域から決定）
    pub viewport: Viewport,
    pub camera: CameraConfig,
    pub input: InputConfig,
    pub submit: SubmitConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CameraBackend {
    /// 汎用USBカメラ
    #[default]
    Usb,
    /// Raspberry Pi カメラモジュール（rpicam-vid）
    Module,
    /// フォルダ内の画像を順に再生
    Still,
}

impl std::str::FromStr for CameraBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "usb" => Ok(CameraBackend::Usb),
            "module" | "picam" => Ok(CameraBackend::Module),
            "still" | "images" => Ok(CameraBackend::Still),
            _ => Err(format!("Unknown camera backend: {}. Use usb, module, or still", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraConfig {
    pub backend: CameraBackend,
    pub device_index: u32,
    pub frame_rate: u32,
    /// 連続オートフォーカス（カメラモジュールのみ）
    pub autofocus: bool,
    pub capture_width: u32,
    pub capture_height: u32,
    /// still バックエンドの画像フォルダ
    pub still_dir: Option<PathBuf>,
    /// カメラモジュールのキャプチャコマンド
    pub module_command: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            backend: CameraBackend::Usb,
            device_index: 0,
            frame_rate: 60,
            autofocus: true,
            capture_width: 640,
            capture_height: 480,
            still_dir: None,
            module_command: "rpicam-vid".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputBackend {
    /// 画面ボタン / キーボードのみ
    #[default]
    Interactive,
    /// GPIOボタン（画面ボタンと併用）
    Gpio,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputConfig {
    pub backend: InputBackend,
    /// BCM番号
    pub mode_pin: u8,
    pub clear_pin: u8,
    pub submit_pin: u8,
    pub debounce_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            backend: InputBackend::Interactive,
            mode_pin: 17,
            clear_pin: 27,
            submit_pin: 22,
            debounce_ms: 300,
        }
    }
}

impl InputConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitConfig {
    /// 送信バッチをJSON Linesで追記するファイル。未設定ならログ出力のみ
    pub outbox: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            station_label: String::new(),
            start_mode: ScanMode::CollectItems,
            tick_interval_ms: 10,
            viewport: Viewport::default(),
            camera: CameraConfig::default(),
            input: InputConfig::default(),
            submit: SubmitConfig::default(),
        }
    }
}

impl Config {
    /// 指定パスから読み込み。存在しなければ既定値
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "設定ファイルなし、既定値を使用");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 既定パス（`~/.config/qr-station/config.json`）
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| StationError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("qr-station").join("config.json"))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(StationError::Config("tickIntervalMs は1以上にしてください".into()));
        }
        if !self.viewport.is_drawable() {
            return Err(StationError::Config(format!(
                "viewport が小さすぎます: {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if self.camera.capture_width == 0 || self.camera.capture_height == 0 {
            return Err(StationError::Config(format!(
                "キャプチャ解像度が不正です: {}x{}",
                self.camera.capture_width, self.camera.capture_height
            )));
        }
        let pins = [self.input.mode_pin, self.input.clear_pin, self.input.submit_pin];
        if pins[0] == pins[1] || pins[0] == pins[2] || pins[1] == pins[2] {
            return Err(StationError::Config(format!("GPIOピンが重複しています: {:?}", pins)));
        }
        if self.camera.backend == CameraBackend::Still && self.camera.still_dir.is_none() {
            return Err(StationError::Config("still バックエンドには stillDir が必要です".into()));
        }
        Ok(())
    }
}
