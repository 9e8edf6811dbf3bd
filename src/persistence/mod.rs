//! Durable interaction log.
//!
//! Every AI interaction is appended to a JSON-lines file and synced to disk
//! before `record` returns, so a response is never delivered for a write
//! that did not commit.

use crate::domain::{AiInteraction, HistoryFilter, NewInteraction};
use crate::store::{newest_first, InteractionStore, StoreError, StoreResult};
use async_trait::async_trait;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

/// Append-only JSON-lines log of AI interactions.
pub struct JsonlInteractionLog {
    path: PathBuf,
    /// Serializes appends so lines never interleave.
    write_lock: Mutex<()>,
}

impl JsonlInteractionLog {
    /// Open (or lazily create) the log at `path`. The parent directory is
    /// created up front so a bad path fails at startup, not on first query.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        tracing::info!(path = %path.display(), "Interaction log opened");

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> StoreResult<Vec<AiInteraction>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Interaction log does not exist yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        let mut records = Vec::new();
        for (line_no, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AiInteraction>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        line = line_no + 1,
                        error = %e,
                        "Skipping malformed interaction record"
                    );
                }
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl InteractionStore for JsonlInteractionLog {
    async fn record(&self, interaction: NewInteraction) -> StoreResult<AiInteraction> {
        let record = interaction.into_record();
        let mut line = serde_json::to_string(&record)
            .map_err(|e| StoreError::Invalid(format!("Failed to encode interaction: {}", e)))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await?;

        // A torn earlier write would otherwise swallow this record.
        let committed_len = file.metadata().await?.len();
        if !ends_with_newline(&mut file, committed_len).await? {
            tracing::warn!(
                path = %self.path.display(),
                "Interaction log ends mid-line, starting a new line"
            );
            line.insert(0, '\n');
        }

        if let Err(e) = append_synced(&mut file, line.as_bytes()).await {
            if let Err(truncate_err) = file.set_len(committed_len).await {
                tracing::error!(
                    path = %self.path.display(),
                    error = %truncate_err,
                    "Failed to roll back partial interaction write"
                );
            }
            return Err(StoreError::Io(e));
        }

        tracing::debug!(
            path = %self.path.display(),
            interaction_id = %record.id,
            "Interaction appended"
        );

        Ok(record)
    }

    async fn history(&self, filter: &HistoryFilter) -> StoreResult<Vec<AiInteraction>> {
        let matching = self
            .read_all()
            .await?
            .into_iter()
            .rev()
            .filter(|i| filter.matches(i))
            .collect();
        Ok(newest_first(matching))
    }
}

/// True for an empty file or one whose last byte is `\n`.
async fn ends_with_newline(file: &mut File, len: u64) -> std::io::Result<bool> {
    if len == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1)).await?;
    file.read_exact(&mut last).await?;
    Ok(last[0] == b'\n')
}

async fn append_synced(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_data().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn interaction(query: &str, member: Option<&str>, auth: Option<&str>) -> NewInteraction {
        NewInteraction {
            query_text: query.to_string(),
            member_id: member.map(str::to_string),
            authorization_id: auth.map(str::to_string),
            response_text: format!("answer to {}", query),
        }
    }

    #[tokio::test]
    async fn test_record_and_history() {
        let dir = tempdir().unwrap();
        let log = JsonlInteractionLog::open(dir.path().join("nested/interactions.jsonl"))
            .await
            .unwrap();

        log.record(interaction("q1", Some("MBR-001"), Some("AUTH-002")))
            .await
            .unwrap();
        log.record(interaction("q2", Some("MBR-001"), None))
            .await
            .unwrap();
        log.record(interaction("q3", Some("MBR-002"), None))
            .await
            .unwrap();

        let history = log
            .history(&HistoryFilter::new(Some("MBR-001".into()), None))
            .await
            .unwrap();
        let queries: Vec<_> = history.iter().map(|i| i.query_text.as_str()).collect();
        assert_eq!(queries, vec!["q2", "q1"]);

        let both = log
            .history(&HistoryFilter::new(
                Some("MBR-001".into()),
                Some("AUTH-002".into()),
            ))
            .await
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].response_text, "answer to q1");
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_history() {
        let dir = tempdir().unwrap();
        let log = JsonlInteractionLog::open(dir.path().join("absent.jsonl"))
            .await
            .unwrap();

        let history = log.history(&HistoryFilter::default()).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_survives_reopen_and_skips_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("interactions.jsonl");

        {
            let log = JsonlInteractionLog::open(&path).await.unwrap();
            log.record(interaction("kept", None, None)).await.unwrap();
        }

        let mut raw = std::fs::read_to_string(&path).unwrap();
        raw.push_str("{not json\n");
        std::fs::write(&path, raw).unwrap();

        let log = JsonlInteractionLog::open(&path).await.unwrap();
        let history = log.history(&HistoryFilter::default()).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].query_text, "kept");
    }

    #[tokio::test]
    async fn test_record_after_torn_line_is_still_readable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("interactions.jsonl");
        std::fs::write(&path, "{\"id\":\"trunc").unwrap();

        let log = JsonlInteractionLog::open(&path).await.unwrap();
        let recorded = log
            .record(interaction("after crash", Some("MBR-001"), None))
            .await
            .unwrap();

        let history = log
            .history(&HistoryFilter::new(Some("MBR-001".into()), None))
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0], recorded);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("{\"id\":\"trunc\n"));
        assert!(raw.ends_with('\n'));
    }
}
