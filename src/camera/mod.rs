//! カメラバックエンドの選択
//!
//! 起動時に設定から1度だけ選び、以後は `CameraSource` として扱う。

pub mod module;
pub mod still;
#[cfg(feature = "usb-camera")]
pub mod usb;

use crate::config::{CameraBackend, CameraConfig};
use crate::error::{Result, StationError};
use qr_station_common::CameraSource;

pub use module::ModuleCamera;
pub use still::StillCamera;

pub fn open_camera(config: &CameraConfig) -> Result<Box<dyn CameraSource>> {
    match config.backend {
        CameraBackend::Usb => open_usb(config),
        CameraBackend::Module => Ok(Box::new(ModuleCamera::open(config)?)),
        CameraBackend::Still => {
            let dir = config
                .still_dir
                .as_deref()
                .ok_or_else(|| StationError::Config("stillDir が未設定です".into()))?;
            Ok(Box::new(StillCamera::open(dir)?))
        }
    }
}

#[cfg(feature = "usb-camera")]
fn open_usb(config: &CameraConfig) -> Result<Box<dyn CameraSource>> {
    Ok(Box::new(usb::UsbCamera::open(config)?))
}

#[cfg(not(feature = "usb-camera"))]
fn open_usb(_config: &CameraConfig) -> Result<Box<dyn CameraSource>> {
    Err(StationError::FeatureDisabled("usb-camera"))
}

/// 利用可能なUSBカメラ（番号, 名前）
#[cfg(feature = "usb-camera")]
pub fn list_devices() -> Result<Vec<(String, String)>> {
    usb::list_devices()
}

#[cfg(not(feature = "usb-camera"))]
pub fn list_devices() -> Result<Vec<(String, String)>> {
    Err(StationError::FeatureDisabled("usb-camera"))
}
