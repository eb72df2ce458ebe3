//! 汎用USBカメラ（nokhwa）

use crate::config::CameraConfig;
use crate::error::{Result, StationError};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};
use nokhwa::Camera;
use qr_station_common::{fit_to_viewport, CameraSource, Frame, Viewport};

pub struct UsbCamera {
    camera: Camera,
    label: String,
}

impl UsbCamera {
    pub fn open(config: &CameraConfig) -> Result<Self> {
        let index = CameraIndex::Index(config.device_index);
        let wanted = CameraFormat::new(
            Resolution::new(config.capture_width, config.capture_height),
            FrameFormat::MJPEG,
            config.frame_rate,
        );
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(wanted));

        let mut camera = Camera::new(index, requested)
            .map_err(|e| StationError::CameraOpen(format!("USB#{}: {}", config.device_index, e)))?;
        camera
            .open_stream()
            .map_err(|e| StationError::CameraOpen(e.to_string()))?;

        let format = camera.camera_format();
        tracing::info!(
            device = config.device_index,
            width = format.resolution().width(),
            height = format.resolution().height(),
            fps = format.frame_rate(),
            "USBカメラを開始"
        );

        Ok(Self {
            camera,
            label: format!("usb:{}", config.device_index),
        })
    }
}

impl CameraSource for UsbCamera {
    fn name(&self) -> &str {
        &self.label
    }

    fn next_frame(&mut self, viewport: Viewport) -> Option<Frame> {
        let buffer = match self.camera.frame() {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!(error = %e, "フレーム取得失敗");
                return None;
            }
        };
        let decoded = match buffer.decode_image::<RgbFormat>() {
            Ok(img) => img,
            Err(e) => {
                tracing::debug!(error = %e, "フレームのデコード失敗");
                return None;
            }
        };

        let (width, height) = (decoded.width(), decoded.height());
        let frame = Frame::from_raw(width, height, decoded.into_raw())?;
        Some(fit_to_viewport(frame, viewport))
    }
}

impl Drop for UsbCamera {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            tracing::warn!(error = %e, "USBカメラの停止に失敗");
        }
    }
}

/// 接続されているカメラ一覧（番号, 名前）
pub fn list_devices() -> Result<Vec<(String, String)>> {
    let cameras = nokhwa::query(ApiBackend::Auto)
        .map_err(|e| StationError::CameraOpen(e.to_string()))?;
    Ok(cameras
        .into_iter()
        .map(|info| (info.index().to_string(), info.human_name()))
        .collect())
}
