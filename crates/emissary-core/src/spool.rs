//! Durable per-request status records for non-blocking dispatch.
//!
//! Each dispatched request owns a uniquely-keyed record under the spool
//! root, so concurrent requests never contend on the same file. Within one
//! record there is exactly one writer (the completion handler) and any
//! number of readers; every write goes through a tempfile + rename, so a
//! reader can never observe a half-written record.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SpoolError;
use crate::{io, paths};

// ─── StatusRecord ─────────────────────────────────────────────────────────

/// Lifecycle of one non-blocking request: created as `running` at dispatch,
/// then exactly one transition to `completed` or `failed`, never regressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusRecord {
    Running,
    Completed { result: Value },
    Failed { error: String },
}

impl StatusRecord {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StatusRecord::Running)
    }
}

// ─── StatusSpool ──────────────────────────────────────────────────────────

/// Handle on the spool directory. Cheap to clone; the completion handler of
/// a detached action carries its own copy.
#[derive(Debug, Clone)]
pub struct StatusSpool {
    root: PathBuf,
}

impl StatusSpool {
    /// Create a spool rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        StatusSpool { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the record for `request_id`.
    pub fn record_path(&self, request_id: &str) -> PathBuf {
        paths::status_path(&self.root, request_id)
    }

    /// Create the initial `running` record. Called before the action
    /// process is spawned, so a reader holding the identifier always finds
    /// at least `running`.
    pub fn mark_running(&self, request_id: &str) -> Result<(), SpoolError> {
        self.write(request_id, &StatusRecord::Running)
    }

    /// Write the single terminal record for `request_id`.
    ///
    /// Rejects a `Running` argument, and refuses to overwrite an existing
    /// terminal record: a record transitions at most once.
    pub fn write_terminal(
        &self,
        request_id: &str,
        record: &StatusRecord,
    ) -> Result<(), SpoolError> {
        if !record.is_terminal() {
            return Err(SpoolError::NotTerminal);
        }
        if let Some(existing) = self.read(request_id)? {
            if existing.is_terminal() {
                return Err(SpoolError::AlreadyTerminal(request_id.to_string()));
            }
        }
        self.write(request_id, record)
    }

    /// Read the record for `request_id`. A missing record is `None`, not an
    /// error — the request may not have been dispatched yet.
    pub fn read(&self, request_id: &str) -> Result<Option<StatusRecord>, SpoolError> {
        let path = self.record_path(request_id);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Poll for a terminal record at a fixed `interval`, up to `timeout`.
    ///
    /// A missing record or one still `running` means "not yet complete".
    /// Reaching the timeout is not an error either: `Ok(None)` says no
    /// terminal state was observed yet, and the caller decides whether to
    /// keep waiting, report "still running", or escalate. Prefer the
    /// completion handle for in-process waiting; this poller exists for
    /// components that only hold the request identifier.
    pub async fn await_terminal(
        &self,
        request_id: &str,
        timeout: Duration,
        interval: Duration,
    ) -> Result<Option<StatusRecord>, SpoolError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(record) = self.read(request_id)? {
                if record.is_terminal() {
                    return Ok(Some(record));
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(interval).await;
        }
    }

    fn write(&self, request_id: &str, record: &StatusRecord) -> Result<(), SpoolError> {
        let data = serde_json::to_vec(record)?;
        io::atomic_write(&self.record_path(request_id), &data)?;
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn spool() -> (StatusSpool, TempDir) {
        let dir = TempDir::new().unwrap();
        let spool = StatusSpool::new(dir.path().join("spool"));
        (spool, dir)
    }

    #[test]
    fn record_wire_format_matches_the_protocol() {
        let running = serde_json::to_value(StatusRecord::Running).unwrap();
        assert_eq!(running, json!({"status": "running"}));

        let completed = serde_json::to_value(StatusRecord::Completed {
            result: json!({"string": "anodaram"}),
        })
        .unwrap();
        assert_eq!(
            completed,
            json!({"status": "completed", "result": {"string": "anodaram"}})
        );

        let failed = serde_json::to_value(StatusRecord::Failed {
            error: "exit 2".into(),
        })
        .unwrap();
        assert_eq!(failed, json!({"status": "failed", "error": "exit 2"}));
    }

    #[test]
    fn missing_record_reads_as_none() {
        let (spool, _dir) = spool();
        assert_eq!(spool.read("nope").unwrap(), None);
    }

    #[test]
    fn running_then_terminal_roundtrip() {
        let (spool, _dir) = spool();
        spool.mark_running("r1").unwrap();
        assert_eq!(spool.read("r1").unwrap(), Some(StatusRecord::Running));

        let terminal = StatusRecord::Completed {
            result: json!({"ok": true}),
        };
        spool.write_terminal("r1", &terminal).unwrap();
        assert_eq!(spool.read("r1").unwrap(), Some(terminal));
    }

    #[test]
    fn terminal_write_happens_at_most_once() {
        let (spool, _dir) = spool();
        spool.mark_running("r1").unwrap();
        spool
            .write_terminal("r1", &StatusRecord::Failed { error: "x".into() })
            .unwrap();

        let err = spool
            .write_terminal(
                "r1",
                &StatusRecord::Completed {
                    result: json!(null),
                },
            )
            .unwrap_err();
        assert!(matches!(err, SpoolError::AlreadyTerminal(_)));

        // The first terminal record is untouched.
        assert_eq!(
            spool.read("r1").unwrap(),
            Some(StatusRecord::Failed { error: "x".into() })
        );
    }

    #[test]
    fn running_is_rejected_as_a_terminal_state() {
        let (spool, _dir) = spool();
        let err = spool.write_terminal("r1", &StatusRecord::Running).unwrap_err();
        assert!(matches!(err, SpoolError::NotTerminal));
    }

    #[test]
    fn different_requests_own_disjoint_records() {
        let (spool, _dir) = spool();
        spool.mark_running("a").unwrap();
        spool
            .write_terminal("b", &StatusRecord::Failed { error: "x".into() })
            .unwrap();
        assert_eq!(spool.read("a").unwrap(), Some(StatusRecord::Running));
        assert!(spool.read("b").unwrap().unwrap().is_terminal());
    }

    #[tokio::test]
    async fn await_terminal_returns_immediately_on_terminal() {
        let (spool, _dir) = spool();
        spool
            .write_terminal(
                "r1",
                &StatusRecord::Completed {
                    result: json!(1),
                },
            )
            .unwrap();
        let record = spool
            .await_terminal("r1", Duration::from_secs(1), Duration::from_millis(5))
            .await
            .unwrap();
        assert_eq!(record, Some(StatusRecord::Completed { result: json!(1) }));
    }

    #[tokio::test]
    async fn await_terminal_timeout_is_not_an_error() {
        let (spool, _dir) = spool();
        spool.mark_running("r1").unwrap();
        let record = spool
            .await_terminal("r1", Duration::from_millis(50), Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(record, None);
        // Still running — a later poll may yet observe the terminal state.
        assert_eq!(spool.read("r1").unwrap(), Some(StatusRecord::Running));
    }

    #[tokio::test]
    async fn await_terminal_observes_a_concurrent_writer() {
        let (spool, _dir) = spool();
        spool.mark_running("r1").unwrap();

        let writer = spool.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            writer
                .write_terminal(
                    "r1",
                    &StatusRecord::Completed {
                        result: json!("done"),
                    },
                )
                .unwrap();
        });

        let record = spool
            .await_terminal("r1", Duration::from_secs(5), Duration::from_millis(5))
            .await
            .unwrap();
        assert_eq!(
            record,
            Some(StatusRecord::Completed {
                result: json!("done")
            })
        );
    }
}
