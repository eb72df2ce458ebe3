use clap::{Parser, Subcommand};
use crate::config::CameraBackend;
use qr_station_common::ScanMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qr-station")]
#[command(about = "QRコード検品スキャンステーション", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 設定ファイル（デフォルト: ~/.config/qr-station/config.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ヘッドレスでスキャンを実行（Ctrl+C で終了）
    Run {
        /// 最新フレームを1秒ごとに保存する画像ファイル
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// カメラバックエンドを上書き (usb/module/still)
        #[arg(long)]
        camera: Option<CameraBackend>,

        /// still バックエンドの画像フォルダ
        #[arg(long)]
        still_dir: Option<PathBuf>,

        /// 開始モードを上書き (operator/items)
        #[arg(short, long)]
        mode: Option<ScanMode>,

        /// 指定tick数で終了
        #[arg(long)]
        ticks: Option<u64>,

        /// 標準入力のキー操作を無効化
        #[arg(long)]
        no_console: bool,
    },

    /// 画像ファイルのQRコードを読み取って表示
    Decode {
        /// 画像ファイル
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// 接続されているカメラを一覧表示
    Devices,

    /// 設定を表示・初期化
    Config {
        /// 現在の設定を表示
        #[arg(long)]
        show: bool,

        /// 既定値で設定ファイルを作成（既存は上書き）
        #[arg(long)]
        init: bool,

        /// 開始モードを保存 (operator/items)
        #[arg(long)]
        set_start_mode: Option<ScanMode>,
    },
}
