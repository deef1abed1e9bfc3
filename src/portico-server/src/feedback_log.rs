//! Durable feedback log.
//!
//! All writes funnel through a single worker task owning the log file, so
//! two concurrent submissions can never read the same snapshot and clobber
//! each other. Each write is read-modify-rewrite: load the persisted
//! document, append the record, write a temp file, fsync, rename. A failed
//! write is logged and swallowed; it neither aborts later queued writes nor
//! surfaces to the submitting client (best-effort local durability).

use std::path::{Path, PathBuf};

use chrono::Utc;
use portico_protocol::types::{FeedbackValue, MessageFeedback, SessionFeedback};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// The persisted log document: `{messages: [], sessions: []}`.
///
/// Record-level semantics are append-only even though the file is
/// rewritten wholesale on each write.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FeedbackSnapshot {
    #[serde(default)]
    pub messages: Vec<MessageFeedback>,
    #[serde(default)]
    pub sessions: Vec<SessionFeedback>,
}

enum Command {
    Message(MessageFeedback),
    Session(SessionFeedback),
    Flush(oneshot::Sender<()>),
}

/// Handle to the feedback log worker.
///
/// Cloning shares the same queue and file. Record methods only enqueue;
/// durability happens in FIFO order on the worker.
#[derive(Clone)]
pub struct FeedbackLog {
    tx: mpsc::UnboundedSender<Command>,
}

impl std::fmt::Debug for FeedbackLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackLog").finish()
    }
}

impl FeedbackLog {
    /// Create the log and spawn its writer task.
    pub fn new(path: PathBuf) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(path, rx));
        Self { tx }
    }

    /// Enqueue a message-level feedback record.
    pub fn record_message(&self, message_id: u64, feedback: FeedbackValue) {
        let _ = self.tx.send(Command::Message(MessageFeedback {
            message_id,
            feedback,
            timestamp: Utc::now(),
        }));
    }

    /// Enqueue a session rating record.
    pub fn record_session(&self, rating: u8) {
        let _ = self.tx.send(Command::Session(SessionFeedback {
            rating,
            timestamp: Utc::now(),
        }));
    }

    /// Wait until every previously enqueued write has settled.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(Command::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }
}

async fn run_writer(path: PathBuf, mut rx: mpsc::UnboundedReceiver<Command>) {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = tokio::fs::create_dir_all(parent).await
    {
        warn!(path = %path.display(), error = %e, "Failed to create feedback log directory");
    }

    while let Some(command) = rx.recv().await {
        let result = match command {
            Command::Flush(ack) => {
                let _ = ack.send(());
                continue;
            }
            Command::Message(record) => {
                persist(&path, |snapshot| snapshot.messages.push(record)).await
            }
            Command::Session(record) => {
                persist(&path, |snapshot| snapshot.sessions.push(record)).await
            }
        };

        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "Feedback write failed; record dropped");
        }
    }
}

/// One serialized read-modify-write-flush cycle.
async fn persist(
    path: &Path,
    apply: impl FnOnce(&mut FeedbackSnapshot),
) -> std::io::Result<()> {
    let mut snapshot = load_snapshot(path).await;
    apply(&mut snapshot);

    let json = serde_json::to_vec_pretty(&snapshot).map_err(std::io::Error::other)?;

    // Temp file plus rename keeps a concurrent reader from ever seeing a
    // partially written document.
    let tmp = path.with_extension("json.tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(&json).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(&tmp, path).await?;

    debug!(path = %path.display(), "Feedback record persisted");
    Ok(())
}

async fn load_snapshot(path: &Path) -> FeedbackSnapshot {
    match tokio::fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Feedback log unreadable; starting fresh");
                FeedbackSnapshot::default()
            }
        },
        Err(_) => FeedbackSnapshot::default(),
    }
}
