//! 検出枠とペイロード文字列のオーバーレイ描画

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::Rgb;

use crate::capability::FrameAnnotator;
use crate::types::{Annotation, BoundingBox, Frame};

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// 枠（緑）と、その下にペイロード（赤）を描く
#[derive(Debug, Clone)]
pub struct BoxAnnotator {
    pub thickness: u32,
    /// 8x8 グリフの拡大率
    pub text_scale: u32,
}

impl Default for BoxAnnotator {
    fn default() -> Self {
        Self {
            thickness: 3,
            text_scale: 2,
        }
    }
}

impl FrameAnnotator for BoxAnnotator {
    fn draw(&self, frame: &mut Frame, annotations: &[Annotation]) {
        for annotation in annotations {
            draw_rect(frame, &annotation.bbox, BOX_COLOR, self.thickness);
            draw_text(
                frame,
                annotation.bbox.left,
                annotation.bbox.bottom() + 2,
                &annotation.label,
                TEXT_COLOR,
                self.text_scale,
            );
        }
    }
}

fn put_clipped(img: &mut Frame, x: i64, y: i64, color: Rgb<u8>) {
    let (w, h) = img.dimensions();
    if x >= 0 && y >= 0 && x < w as i64 && y < h as i64 {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// 指定太さで矩形の枠線を描く（内側へ太らせる、画像外はクリップ）
pub fn draw_rect(img: &mut Frame, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    if bbox.width == 0 || bbox.height == 0 {
        return;
    }
    let x0 = bbox.left as i64;
    let y0 = bbox.top as i64;
    let x1 = bbox.right() as i64;
    let y1 = bbox.bottom() as i64;

    for t in 0..thickness as i64 {
        let (xx0, yy0, xx1, yy1) = (x0 + t, y0 + t, x1 - t, y1 - t);
        if xx0 > xx1 || yy0 > yy1 {
            break;
        }
        for x in xx0..=xx1 {
            put_clipped(img, x, yy0, color);
            put_clipped(img, x, yy1, color);
        }
        for y in yy0..=yy1 {
            put_clipped(img, xx0, y, color);
            put_clipped(img, xx1, y, color);
        }
    }
}

/// 8x8 ビットマップフォントで文字列を描く。未収録文字は '?'
pub fn draw_text(img: &mut Frame, x: i32, y: i32, text: &str, color: Rgb<u8>, scale: u32) {
    let scale = scale.max(1) as i64;
    let mut cursor_x = x as i64;

    for ch in text.chars() {
        let glyph = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?'));
        if let Some(glyph) = glyph {
            for (row_idx, row) in glyph.iter().enumerate() {
                for col_idx in 0..8 {
                    if (row >> col_idx) & 1 == 0 {
                        continue;
                    }
                    let px = cursor_x + col_idx * scale;
                    let py = y as i64 + row_idx as i64 * scale;
                    for sy in 0..scale {
                        for sx in 0..scale {
                            put_clipped(img, px + sx, py + sy, color);
                        }
                    }
                }
            }
        }
        cursor_x += 8 * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(img: &Frame, color: Rgb<u8>) -> usize {
        img.pixels().filter(|p| **p == color).count()
    }

    #[test]
    fn test_rect_outline_only() {
        let mut img = Frame::new(50, 50);
        draw_rect(&mut img, &BoundingBox::new(10, 10, 20, 20), BOX_COLOR, 1);
        assert_eq!(*img.get_pixel(10, 10), BOX_COLOR);
        assert_eq!(*img.get_pixel(30, 30), BOX_COLOR);
        assert_eq!(*img.get_pixel(20, 20), Rgb([0, 0, 0]));
        // 21x21 の外周
        assert_eq!(count(&img, BOX_COLOR), 80);
    }

    #[test]
    fn test_rect_clipped_at_border() {
        let mut img = Frame::new(20, 20);
        draw_rect(&mut img, &BoundingBox::new(-5, -5, 40, 40), BOX_COLOR, 3);
        assert_eq!(img.dimensions(), (20, 20));
        assert_eq!(count(&img, BOX_COLOR), 0);

        draw_rect(&mut img, &BoundingBox::new(15, 15, 10, 10), BOX_COLOR, 2);
        assert_eq!(*img.get_pixel(15, 15), BOX_COLOR);
    }

    #[test]
    fn test_annotator_keeps_dimensions_and_draws_label() {
        let mut img = Frame::new(120, 80);
        let annotations = vec![Annotation {
            bbox: BoundingBox::new(10, 10, 40, 40),
            label: "A1".to_string(),
        }];
        BoxAnnotator::default().draw(&mut img, &annotations);

        assert_eq!(img.dimensions(), (120, 80));
        assert!(count(&img, BOX_COLOR) > 0);
        assert!(count(&img, TEXT_COLOR) > 0);
        // 文字は枠の下側にだけ描かれる
        let text_above_box = (0..80)
            .flat_map(|x| (0..52).map(move |y| (x, y)))
            .any(|(x, y)| *img.get_pixel(x, y) == TEXT_COLOR);
        assert!(!text_above_box);
    }

    #[test]
    fn test_text_outside_frame_is_clipped() {
        let mut img = Frame::new(16, 16);
        draw_text(&mut img, 10, 12, "QRCODE", TEXT_COLOR, 2);
        assert_eq!(img.dimensions(), (16, 16));
    }
}
