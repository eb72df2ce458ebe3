//! ステーション本体とヘッドレス実行
//!
//! `Station` はセッション・スキャンループ・送信先・コマンドキューを束ねる。
//! 1 step = キューに溜まったコマンドを到着順に適用 → 1 tick。
//! セッションを変更するのは常に step を呼ぶスケジューラだけ。

use crate::camera::open_camera;
use crate::config::Config;
use crate::decoder::QrDecoder;
use crate::error::Result;
use crate::input::{open_signal_input, ConsoleKeys};
use crate::submit::open_submitter;
use qr_station_common::{
    command_queue, BatchSubmitter, BoxAnnotator, CameraSource, CommandReceiver, CommandSender,
    Frame, InputEventSource, RenderSink, ScanLoop, ScanSession, SessionEvent, TickOutcome,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

const SNAPSHOT_INTERVAL: Duration = Duration::from_secs(1);

pub struct Station {
    session: ScanSession,
    scan_loop: ScanLoop,
    submitter: Box<dyn BatchSubmitter>,
    sender: CommandSender,
    commands: CommandReceiver,
    /// attach 済みの入力源（Drop まで保持）
    sources: Vec<Box<dyn InputEventSource>>,
}

impl Station {
    /// QRデコーダと枠描画を使う標準構成
    pub fn new(
        config: &Config,
        camera: Box<dyn CameraSource>,
        submitter: Box<dyn BatchSubmitter>,
    ) -> Self {
        let scan_loop = ScanLoop::new(
            camera,
            Box::new(QrDecoder::new()),
            Box::new(BoxAnnotator::default()),
            config.viewport,
        );
        Self::with_loop(ScanSession::new(config.start_mode), scan_loop, submitter)
    }

    pub fn with_loop(
        session: ScanSession,
        scan_loop: ScanLoop,
        submitter: Box<dyn BatchSubmitter>,
    ) -> Self {
        let (sender, commands) = command_queue();
        Self {
            session,
            scan_loop,
            submitter,
            sender,
            commands,
            sources: Vec::new(),
        }
    }

    /// 設定どおりにカメラ・送信先を開く
    pub fn open(config: &Config) -> Result<Self> {
        let camera = open_camera(&config.camera)?;
        let submitter = open_submitter(&config.submit, &config.station_label);
        tracing::info!(camera = camera.name(), mode = %config.start_mode, "ステーションを構成");
        Ok(Self::new(config, camera, submitter))
    }

    /// 入力源をキューへ接続して保持する
    pub fn attach(&mut self, mut source: Box<dyn InputEventSource>) -> Result<()> {
        source.attach(self.sender.clone())?;
        tracing::info!(source = source.name(), "入力源を接続");
        self.sources.push(source);
        Ok(())
    }

    pub fn sender(&self) -> CommandSender {
        self.sender.clone()
    }

    pub fn camera_name(&self) -> &str {
        self.scan_loop.camera_name()
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn scan_loop_mut(&mut self) -> &mut ScanLoop {
        &mut self.scan_loop
    }

    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        self.session.take_events()
    }

    /// 溜まったコマンドを適用してから1 tick 進める
    pub fn step(&mut self, sink: &mut dyn RenderSink) -> TickOutcome {
        for command in self.commands.drain() {
            tracing::debug!(?command, "コマンド適用");
            self.session.apply(command, self.submitter.as_mut());
        }
        self.scan_loop.tick(&mut self.session, sink)
    }
}

/// ヘッドレス用の表示先。必要なら最新フレームを1秒ごとに画像保存
#[derive(Debug, Default)]
pub struct LogSink {
    snapshot: Option<PathBuf>,
    last_written: Option<Instant>,
    pub presented: u64,
}

impl LogSink {
    pub fn new(snapshot: Option<PathBuf>) -> Self {
        Self {
            snapshot,
            ..Default::default()
        }
    }
}

impl RenderSink for LogSink {
    fn present(&mut self, frame: Frame) {
        self.presented += 1;

        let Some(path) = &self.snapshot else { return };
        let now = Instant::now();
        if self
            .last_written
            .is_some_and(|t| now.duration_since(t) < SNAPSHOT_INTERVAL)
        {
            return;
        }
        self.last_written = Some(now);
        if let Err(e) = frame.save(path) {
            tracing::warn!(path = %path.display(), error = %e, "スナップショット保存失敗");
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub snapshot: Option<PathBuf>,
    /// 指定tick数で終了（未指定なら Ctrl+C まで）
    pub max_ticks: Option<u64>,
    /// 標準入力のキー操作を受け付ける
    pub console: bool,
}

/// ヘッドレス実行（Ctrl+C で終了）
pub async fn run(config: &Config, options: RunOptions) -> Result<()> {
    let mut station = Station::open(config)?;
    if options.console {
        station.attach(Box::new(ConsoleKeys::new()))?;
    }
    if let Some(source) = open_signal_input(&config.input)? {
        station.attach(source)?;
    }

    let mut sink = LogSink::new(options.snapshot.clone());
    let mut interval = tokio::time::interval(config.tick_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    println!(
        "▶ スキャン開始（カメラ: {}, モード: {}）",
        station.camera_name(),
        station.session().mode()
    );
    if options.console {
        println!("  m=モード切替 c=全クリア s=送信 r <内容>=削除");
    }

    let mut ticks = 0u64;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                station.step(&mut sink);
                for event in station.take_events() {
                    report(&event);
                }
                ticks += 1;
                if options.max_ticks.is_some_and(|max| ticks >= max) {
                    break;
                }
            }
            _ = &mut shutdown => {
                tracing::info!("停止要求を受信");
                break;
            }
        }
    }

    let items = station.session().items().len();
    println!("■ 停止（tick: {}, 表示: {}, 未送信: {}件）", ticks, sink.presented, items);
    Ok(())
}

/// 変更通知を端末へ出す
fn report(event: &SessionEvent) {
    match event {
        SessionEvent::ItemAdded(item) => println!("  + {}", item),
        SessionEvent::ItemRemoved(item) => println!("  - {}", item),
        SessionEvent::ItemsCleared => println!("  一覧をクリア"),
        SessionEvent::OperatorChanged(op) => println!("  作業者: {}", op),
        SessionEvent::ModeChanged(mode) => println!("  モード: {}", mode),
        SessionEvent::Submitted { count, operator } => {
            println!("✔ 送信: {}件（作業者 {}）", count, operator)
        }
        SessionEvent::Rejected(err) => println!("⚠ {}", err),
    }
}
