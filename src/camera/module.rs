//! Raspberry Pi カメラモジュール
//!
//! `rpicam-vid` を1度だけ起動し、標準出力の YUV420 (I420) ストリームを
//! 読み取りスレッドで受ける。スロットには最新フレームだけを置き、
//! tick 側はそれを複製して返すので待たされない。

use crate::config::CameraConfig;
use crate::error::{Result, StationError};
use qr_station_common::{fit_to_viewport, CameraSource, Frame, Viewport};
use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

type FrameSlot = Arc<Mutex<Option<Frame>>>;

pub struct ModuleCamera {
    child: Child,
    reader: Option<JoinHandle<()>>,
    latest: FrameSlot,
}

impl ModuleCamera {
    pub fn open(config: &CameraConfig) -> Result<Self> {
        let (width, height) = (config.capture_width, config.capture_height);
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            return Err(StationError::Config(format!(
                "カメラモジュールの解像度は1以上の偶数にしてください: {}x{}",
                width, height
            )));
        }

        let args = capture_args(config);
        tracing::info!(command = %config.module_command, ?args, "カメラモジュールを起動");

        let mut child = Command::new(&config.module_command)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| StationError::CameraOpen(format!("{}: {}", config.module_command, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| StationError::CameraOpen("標準出力を取得できません".into()))?;

        let latest: FrameSlot = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&latest);
        let reader = std::thread::Builder::new()
            .name("camera-module-reader".into())
            .spawn(move || read_frames(stdout, width, height, slot))?;

        Ok(Self {
            child,
            reader: Some(reader),
            latest,
        })
    }
}

impl CameraSource for ModuleCamera {
    fn name(&self) -> &str {
        "camera-module"
    }

    fn next_frame(&mut self, viewport: Viewport) -> Option<Frame> {
        // 次のフレームが届くまでは直前のフレームを返し続ける
        let frame = self.latest.lock().ok()?.as_ref()?.clone();
        Some(fit_to_viewport(frame, viewport))
    }
}

impl Drop for ModuleCamera {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            tracing::warn!(error = %e, "キャプチャプロセスの停止に失敗");
        }
        if let Err(e) = self.child.wait() {
            tracing::warn!(error = %e, "キャプチャプロセスの終了待ちに失敗");
        }
        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                tracing::warn!("読み取りスレッドが異常終了");
            }
        }
    }
}

/// `rpicam-vid` の引数（プレビューなし・無期限・標準出力へ）
pub fn capture_args(config: &CameraConfig) -> Vec<String> {
    let mut args = vec![
        "-t".to_string(),
        "0".to_string(),
        "--nopreview".to_string(),
        "--codec".to_string(),
        "yuv420".to_string(),
        "--width".to_string(),
        config.capture_width.to_string(),
        "--height".to_string(),
        config.capture_height.to_string(),
        "--framerate".to_string(),
        config.frame_rate.to_string(),
    ];
    if config.autofocus {
        args.push("--autofocus-mode".to_string());
        args.push("continuous".to_string());
    }
    args.push("-o".to_string());
    args.push("-".to_string());
    args
}

fn read_frames(mut stdout: ChildStdout, width: u32, height: u32, slot: FrameSlot) {
    let mut buf = vec![0u8; i420_len(width, height)];
    loop {
        if let Err(e) = stdout.read_exact(&mut buf) {
            tracing::debug!(error = %e, "キャプチャストリーム終了");
            break;
        }
        let Some(frame) = i420_to_rgb(&buf, width, height) else {
            continue;
        };
        match slot.lock() {
            Ok(mut latest) => *latest = Some(frame),
            Err(_) => break,
        }
    }
}

fn i420_len(width: u32, height: u32) -> usize {
    let luma = (width * height) as usize;
    luma + luma / 2
}

/// I420 (Y平面 + 1/4サイズのU,V平面) を RGB に変換（BT.601）
pub fn i420_to_rgb(data: &[u8], width: u32, height: u32) -> Option<Frame> {
    if data.len() < i420_len(width, height) {
        return None;
    }

    let (w, h) = (width as usize, height as usize);
    let (y_plane, chroma) = data.split_at(w * h);
    let (u_plane, v_plane) = chroma.split_at(w * h / 4);
    let chroma_w = w / 2;

    let mut rgb = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        for col in 0..w {
            let y = y_plane[row * w + col] as f32;
            let ci = (row / 2) * chroma_w + col / 2;
            let u = u_plane[ci] as f32 - 128.0;
            let v = v_plane[ci] as f32 - 128.0;

            let r = y + 1.402 * v;
            let g = y - 0.344_136 * u - 0.714_136 * v;
            let b = y + 1.772 * u;
            rgb.push(r.round().clamp(0.0, 255.0) as u8);
            rgb.push(g.round().clamp(0.0, 255.0) as u8);
            rgb.push(b.round().clamp(0.0, 255.0) as u8);
        }
    }

    Frame::from_raw(width, height, rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_gray_i420_converts_to_gray_rgb() {
        let (w, h) = (4u32, 2u32);
        let mut data = vec![100u8; (w * h) as usize];
        data.extend(vec![128u8; (w * h / 2) as usize]);

        let frame = i420_to_rgb(&data, w, h).unwrap();
        assert_eq!(frame.dimensions(), (4, 2));
        assert!(frame.pixels().all(|p| *p == Rgb([100, 100, 100])));
    }

    #[test]
    fn test_short_buffer_is_rejected() {
        assert!(i420_to_rgb(&[0u8; 10], 4, 4).is_none());
    }

    #[test]
    fn test_chroma_shared_by_2x2_block() {
        let (w, h) = (4u32, 2u32);
        let mut data = vec![128u8; (w * h) as usize];
        // U: 左ブロックは中立、右ブロックは青寄り
        data.extend([128u8, 228]);
        data.extend([128u8, 128]);

        let frame = i420_to_rgb(&data, w, h).unwrap();
        assert_eq!(frame.get_pixel(0, 0), frame.get_pixel(1, 1));
        assert!(frame.get_pixel(3, 0)[2] > frame.get_pixel(0, 0)[2]);
    }

    /// 1フレームだけ出力して待機し続けるキャプチャコマンドを作る
    #[cfg(unix)]
    fn single_frame_command(dir: &std::path::Path) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-rpicam-vid");
        std::fs::write(&path, "#!/bin/sh\nhead -c 12 /dev/zero\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    #[cfg(unix)]
    #[test]
    fn test_latest_frame_stays_available_between_captures() {
        let dir = tempfile::tempdir().unwrap();
        let config = CameraConfig {
            backend: crate::config::CameraBackend::Module,
            capture_width: 4,
            capture_height: 2,
            module_command: single_frame_command(dir.path()),
            ..Default::default()
        };
        let mut camera = ModuleCamera::open(&config).unwrap();
        let viewport = Viewport::new(4, 2);

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        let mut first = camera.next_frame(viewport);
        while first.is_none() && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(10));
            first = camera.next_frame(viewport);
        }
        let first = first.expect("capture command produced no frame");

        // 後続フレームは来ないが、毎tick同じフレームが得られる
        for _ in 0..3 {
            assert_eq!(camera.next_frame(viewport).as_ref(), Some(&first));
        }
    }

    #[test]
    fn test_zero_resolution_is_rejected() {
        let config = CameraConfig {
            capture_width: 0,
            ..Default::default()
        };
        assert!(matches!(ModuleCamera::open(&config), Err(StationError::Config(_))));
    }

    #[test]
    fn test_capture_args_autofocus_toggle() {
        let mut config = CameraConfig::default();
        let args = capture_args(&config);
        assert!(args.contains(&"continuous".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("-"));

        config.autofocus = false;
        assert!(!capture_args(&config).contains(&"--autofocus-mode".to_string()));
    }
}
