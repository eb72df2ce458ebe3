//! QRデコーダ（rqrr）

use qr_station_common::{BoundingBox, CodeDecoder, Detection, Frame};

/// フレーム内のQRコードを左上から順に返す
#[derive(Debug, Default)]
pub struct QrDecoder;

impl QrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl CodeDecoder for QrDecoder {
    fn decode(&mut self, frame: &Frame) -> Vec<Detection> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            width as usize,
            height as usize,
            |x, y| luma(frame, x as u32, y as u32),
        );

        let mut detections = Vec::new();
        for grid in prepared.detect_grids() {
            let corners: Vec<(i32, i32)> = grid.bounds.iter().map(|p| (p.x, p.y)).collect();
            let Some(bbox) = BoundingBox::from_corners(&corners) else {
                continue;
            };
            match grid.decode() {
                Ok((_, payload)) => detections.push(Detection::new(payload, bbox)),
                Err(e) => tracing::trace!(error = %e, "QRグリッドのデコード失敗"),
            }
        }

        // 読み取り順を安定させる（上→下、左→右）
        detections.sort_by_key(|d| (d.bbox.top, d.bbox.left));
        detections
    }
}

fn luma(frame: &Frame, x: u32, y: u32) -> u8 {
    let [r, g, b] = frame.get_pixel(x, y).0;
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
}
