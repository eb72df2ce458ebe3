//! スキャンステーションの型定義
//!
//! - ScanMode: 作業者識別モード / 品目収集モード
//! - Detection: デコーダが1フレームで返す検出結果
//! - Annotation: 表示用オーバーレイ指示
//! - Viewport: 表示面から決まるフレームサイズ

use serde::{Deserialize, Serialize};
use std::fmt;

/// カメラから取得するフレーム（RGB8）
pub type Frame = image::RgbImage;

/// 動作モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanMode {
    /// 作業者QRを読み取る
    IdentifyOperator,
    /// 品目コードを蓄積する
    #[default]
    CollectItems,
}

impl ScanMode {
    /// もう一方のモード
    pub fn toggled(self) -> Self {
        match self {
            ScanMode::IdentifyOperator => ScanMode::CollectItems,
            ScanMode::CollectItems => ScanMode::IdentifyOperator,
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::IdentifyOperator => write!(f, "identify-operator"),
            ScanMode::CollectItems => write!(f, "collect-items"),
        }
    }
}

impl std::str::FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "identify-operator" | "operator" | "identify" => Ok(ScanMode::IdentifyOperator),
            "collect-items" | "items" | "collect" => Ok(ScanMode::CollectItems),
            _ => Err(format!(
                "Unknown mode: {}. Use identify-operator or collect-items",
                s
            )),
        }
    }
}

/// 検出枠（ビューポート座標）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> i32 {
        self.left + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height as i32
    }

    /// 頂点群を囲む軸平行矩形。空なら None
    pub fn from_corners(points: &[(i32, i32)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.0, first.1, first.0, first.1);
        for &(x, y) in rest {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        Some(Self {
            left: x0,
            top: y0,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

/// デコーダの検出結果（1フレーム内でのみ有効）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub payload: String,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(payload: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            payload: payload.into(),
            bbox,
        }
    }
}

/// オーバーレイ描画指示（枠 + ペイロード文字列）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub bbox: BoundingBox,
    pub label: String,
}

impl From<&Detection> for Annotation {
    fn from(detection: &Detection) -> Self {
        Self {
            bbox: detection.bbox,
            label: detection.payload.clone(),
        }
    }
}

/// 表示先のフレームサイズ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// レイアウト前の表示面（0や1px）は描画対象外
    pub fn is_drawable(&self) -> bool {
        self.width > 1 && self.height > 1
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_toggle_round_trip() {
        let mode = ScanMode::CollectItems;
        assert_eq!(mode.toggled(), ScanMode::IdentifyOperator);
        assert_eq!(mode.toggled().toggled(), mode);
    }

    #[test]
    fn test_mode_serde_kebab_case() {
        let json = serde_json::to_string(&ScanMode::IdentifyOperator).unwrap();
        assert_eq!(json, "\"identify-operator\"");
        let mode: ScanMode = serde_json::from_str("\"collect-items\"").unwrap();
        assert_eq!(mode, ScanMode::CollectItems);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("operator".parse::<ScanMode>().unwrap(), ScanMode::IdentifyOperator);
        assert_eq!("Collect-Items".parse::<ScanMode>().unwrap(), ScanMode::CollectItems);
        assert!("both".parse::<ScanMode>().is_err());
    }

    #[test]
    fn test_bbox_from_corners() {
        let bbox = BoundingBox::from_corners(&[(40, 12), (90, 10), (92, 60), (38, 62)]).unwrap();
        assert_eq!(bbox, BoundingBox::new(38, 10, 54, 52));
        assert_eq!(bbox.right(), 92);
        assert_eq!(bbox.bottom(), 62);
        assert!(BoundingBox::from_corners(&[]).is_none());
    }

    #[test]
    fn test_viewport_drawable() {
        assert!(Viewport::default().is_drawable());
        assert!(!Viewport::new(1, 1).is_drawable());
        assert!(!Viewport::new(0, 480).is_drawable());
    }
}
