//! カメラソースの契約
//!
//! どの実装もビューポートサイズにリサンプルしてから返すため、
//! 検出枠と表示フレームは同じ座標系になる。

use image::imageops::{self, FilterType};

use crate::types::{Frame, Viewport};

/// フレーム取得元
pub trait CameraSource {
    fn name(&self) -> &str;

    /// 次のフレーム。準備できていない・デバイス異常なら None（次のtickで再試行）
    ///
    /// 呼び出しは即時に戻るか、フレーム周期程度で戻ること。
    fn next_frame(&mut self, viewport: Viewport) -> Option<Frame>;
}

impl<C: CameraSource + ?Sized> CameraSource for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn next_frame(&mut self, viewport: Viewport) -> Option<Frame> {
        (**self).next_frame(viewport)
    }
}

/// ビューポートサイズへ引き伸ばし（アスペクト比は保持しない）
pub fn fit_to_viewport(image: Frame, viewport: Viewport) -> Frame {
    if image.dimensions() == (viewport.width, viewport.height) {
        return image;
    }
    imageops::resize(&image, viewport.width, viewport.height, FilterType::Triangle)
}
