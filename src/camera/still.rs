//! 静止画フォルダを1tick 1枚ずつループ再生するカメラ
//!
//! 現場の撮影画像を使ったオフライン確認やデモ用。

use crate::error::{Result, StationError};
use qr_station_common::{fit_to_viewport, CameraSource, Frame, Viewport};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

pub struct StillCamera {
    frames: Vec<Frame>,
    cursor: usize,
    label: String,
}

impl StillCamera {
    /// フォルダ直下の画像をファイル名順に読み込む
    pub fn open(folder: &Path) -> Result<Self> {
        let paths = scan_images(folder)?;

        let mut frames = Vec::with_capacity(paths.len());
        for path in &paths {
            match image::open(path) {
                Ok(img) => frames.push(img.to_rgb8()),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "画像を読み込めないためスキップ"),
            }
        }

        if frames.is_empty() {
            return Err(StationError::NoImagesFound(folder.display().to_string()));
        }

        tracing::info!(count = frames.len(), folder = %folder.display(), "静止画カメラを開始");
        Ok(Self {
            frames,
            cursor: 0,
            label: format!("still:{}", folder.display()),
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl CameraSource for StillCamera {
    fn name(&self) -> &str {
        &self.label
    }

    fn next_frame(&mut self, viewport: Viewport) -> Option<Frame> {
        let frame = self.frames.get(self.cursor)?.clone();
        self.cursor = (self.cursor + 1) % self.frames.len();
        Some(fit_to_viewport(frame, viewport))
    }
}

/// フォルダ直下（再帰しない）の画像パスをファイル名順で返す
pub fn scan_images(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(StationError::NoImagesFound(folder.display().to_string()));
    }

    let mut images: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .map(|ext| IMAGE_EXTENSIONS.iter().any(|&e| e == ext.to_string_lossy()))
                .unwrap_or(false)
        })
        .collect();

    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}
