//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use qr_station::camera::{open_camera, StillCamera};
use qr_station::config::{CameraBackend, CameraConfig, Config};
use qr_station::error::StationError;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダを静止画カメラに指定した場合
#[test]
fn test_still_camera_nonexistent_folder() {
    let result = StillCamera::open(Path::new("/nonexistent/path/12345"));
    assert!(matches!(result, Err(StationError::NoImagesFound(_))));
}

/// 画像のないフォルダを指定した場合
#[test]
fn test_still_camera_folder_without_images() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("test.txt"), "hello").unwrap();

    let result = StillCamera::open(dir.path());
    assert!(matches!(result, Err(StationError::NoImagesFound(_))));
}

/// 壊れた画像しかない場合もエラー
#[test]
fn test_still_camera_only_broken_images() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("broken.jpg"), "not a jpeg").unwrap();

    let result = StillCamera::open(dir.path());
    assert!(matches!(result, Err(StationError::NoImagesFound(_))));
}

/// カメラモジュールのコマンドが存在しない場合
#[test]
fn test_module_camera_missing_command() {
    let config = CameraConfig {
        backend: CameraBackend::Module,
        module_command: "/nonexistent/rpicam-vid-12345".to_string(),
        ..Default::default()
    };
    let result = open_camera(&config);
    assert!(matches!(result, Err(StationError::CameraOpen(_))));
}

/// 奇数解像度はカメラモジュールで拒否
#[test]
fn test_module_camera_odd_resolution() {
    let config = CameraConfig {
        backend: CameraBackend::Module,
        capture_width: 641,
        ..Default::default()
    };
    let result = open_camera(&config);
    assert!(matches!(result, Err(StationError::Config(_))));
}

/// 不正なJSON設定
#[test]
fn test_config_invalid_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = Config::load_from(&path);
    assert!(matches!(result, Err(StationError::JsonParse(_))));
}

/// StationErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        StationError::Config("テスト設定エラー".to_string()),
        StationError::CameraOpen("usb:0".to_string()),
        StationError::ImageLoad("test.jpg".to_string()),
        StationError::NoImagesFound("フォルダ".to_string()),
        StationError::FeatureDisabled("rpi"),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty());
    }
}

/// 共通ライブラリのエラーはそのまま表示
#[test]
fn test_core_error_is_transparent() {
    let err: StationError = qr_station_common::Error::Input("GPIO27: busy".to_string()).into();
    assert_eq!(err.to_string(), "Input source error: GPIO27: busy");
}
