//! 送信先
//!
//! - `LogSubmitter`: ログへ出力するだけ（送信先未設定時）
//! - `OutboxSubmitter`: JSON Lines ファイルへ1バッチ1行で追記

use crate::config::SubmitConfig;
use chrono::{SecondsFormat, Utc};
use qr_station_common::{BatchSubmitter, Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Outbox の1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRecord {
    /// RFC 3339 (UTC)
    pub submitted_at: String,
    pub operator: String,
    pub station: String,
    pub items: Vec<String>,
}

#[derive(Debug, Default)]
pub struct LogSubmitter {
    pub submitted: usize,
}

impl BatchSubmitter for LogSubmitter {
    fn submit(&mut self, items: &[String], operator: &str) -> Result<()> {
        self.submitted += 1;
        tracing::info!(operator, count = items.len(), ?items, "送信バッチ");
        Ok(())
    }
}

#[derive(Debug)]
pub struct OutboxSubmitter {
    path: PathBuf,
    station: String,
}

impl OutboxSubmitter {
    pub fn new(path: impl Into<PathBuf>, station: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            station: station.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BatchSubmitter for OutboxSubmitter {
    fn submit(&mut self, items: &[String], operator: &str) -> Result<()> {
        let record = BatchRecord {
            submitted_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            operator: operator.to_string(),
            station: self.station.clone(),
            items: items.to_vec(),
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::Submit(format!("{}: {}", self.path.display(), e)))?;
        file.write_all(line.as_bytes())?;

        tracing::info!(path = %self.path.display(), count = items.len(), "outboxへ追記");
        Ok(())
    }
}

/// 設定から送信先を選ぶ
pub fn open_submitter(config: &SubmitConfig, station: &str) -> Box<dyn BatchSubmitter> {
    match &config.outbox {
        Some(path) => Box::new(OutboxSubmitter::new(path.clone(), station)),
        None => Box::new(LogSubmitter::default()),
    }
}

/// outbox を読み戻す（確認用）
pub fn read_outbox(path: &Path) -> Result<Vec<BatchRecord>> {
    let content = std::fs::read_to_string(path)?;
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).map_err(Error::from))
        .collect()
}
