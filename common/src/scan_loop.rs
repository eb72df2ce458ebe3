//! 取得・デコード・描画ループ
//!
//! 1 tick = カメラから1フレーム取得 → デコード → セッション更新 → 描画 → 表示。
//! 取得失敗はそのtickを飛ばすだけで、エラーとして扱わない。

use crate::camera::CameraSource;
use crate::capability::{CodeDecoder, FrameAnnotator, RenderSink};
use crate::session::{DetectionEffect, ScanSession};
use crate::types::{Annotation, Viewport};

/// 1 tick の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// ビューポートが未確定
    Skipped,
    /// フレームなし（次のtickで再試行）
    NoFrame,
    Presented {
        detections: usize,
        new_items: usize,
    },
}

pub struct ScanLoop {
    camera: Box<dyn CameraSource>,
    decoder: Box<dyn CodeDecoder>,
    annotator: Box<dyn FrameAnnotator>,
    viewport: Viewport,
}

impl ScanLoop {
    pub fn new(
        camera: Box<dyn CameraSource>,
        decoder: Box<dyn CodeDecoder>,
        annotator: Box<dyn FrameAnnotator>,
        viewport: Viewport,
    ) -> Self {
        Self {
            camera,
            decoder,
            annotator,
            viewport,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// 表示面のサイズ変更時に呼ぶ
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            tracing::debug!(width = viewport.width, height = viewport.height, "ビューポート変更");
            self.viewport = viewport;
        }
    }

    pub fn camera_name(&self) -> &str {
        self.camera.name()
    }

    pub fn tick(&mut self, session: &mut ScanSession, sink: &mut dyn RenderSink) -> TickOutcome {
        if !self.viewport.is_drawable() {
            return TickOutcome::Skipped;
        }

        let Some(mut frame) = self.camera.next_frame(self.viewport) else {
            tracing::trace!(camera = self.camera.name(), "フレームなし");
            return TickOutcome::NoFrame;
        };

        let detections = self.decoder.decode(&frame);

        // セッション更新を先に行い、同じtickの描画に反映させる
        let mut new_items = 0;
        let mut annotations = Vec::with_capacity(detections.len());
        for detection in &detections {
            if session.apply_detection(&detection.payload) == DetectionEffect::NewItem {
                new_items += 1;
            }
            annotations.push(Annotation::from(detection));
        }

        self.annotator.draw(&mut frame, &annotations);
        sink.present(frame);

        TickOutcome::Presented {
            detections: detections.len(),
            new_items,
        }
    }
}
