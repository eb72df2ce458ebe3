//! QR Station Common Library
//!
//! スキャンステーションのコア。CLI(ヘッドレス)とデスクトップUIで共有する:
//! - セッション状態機械と重複排除
//! - 入力イベントキューとデバウンス
//! - カメラ契約と取得・デコード・描画ループ

pub mod types;
pub mod error;
pub mod dedup;
pub mod capability;
pub mod input;
pub mod session;
pub mod camera;
pub mod scan_loop;
pub mod overlay;

pub use types::{Annotation, BoundingBox, Detection, Frame, ScanMode, Viewport};
pub use error::{Error, Result};
pub use dedup::DedupSet;
pub use capability::{BatchSubmitter, CodeDecoder, FrameAnnotator, NullSink, RenderSink};
pub use input::{
    command_queue, CommandReceiver, CommandSender, InputEvent, InputEventSource,
    SignalDebouncer, StationCommand, UiButtons,
};
pub use session::{DetectionEffect, ScanSession, SessionError, SessionEvent, SubmitReceipt};
pub use camera::{fit_to_viewport, CameraSource};
pub use scan_loop::{ScanLoop, TickOutcome};
pub use overlay::BoxAnnotator;
