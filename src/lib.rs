//! qr-station
//!
//! 共通コア（`qr_station_common`）に、実機のカメラ・QRデコーダ・
//! 物理ボタン・送信先・ヘッドレス実行を組み合わせる。

pub mod camera;
pub mod cli;
pub mod config;
pub mod decoder;
pub mod error;
pub mod input;
pub mod station;
pub mod submit;
