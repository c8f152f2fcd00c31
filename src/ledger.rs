//! Durable per-project phase status ledger.
//!
//! One JSON document maps project name → phase records. Every write is a
//! read-merge-write over the whole document followed by an atomic rename, so
//! unrelated phases and unrelated projects survive any sequence of writes.
//! Records are never deleted automatically — the ledger only grows, which is
//! what makes workflow resumption and auditing across runs possible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::LedgerError;
use crate::phase::{AgentRole, PhaseStatus};

/// Maximum stored length of a phase result, in characters. Agent output can
/// be arbitrarily long; truncating before persisting bounds ledger growth.
pub const MAX_RESULT_CHARS: usize = 500;

/// Status record for one phase of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub agent: AgentRole,
    pub status: PhaseStatus,
    pub result: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-project entry: phase records keyed by phase id.
///
/// `updated_at` always reflects the most recent phase write for the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub phases: BTreeMap<String, PhaseRecord>,
    pub updated_at: DateTime<Utc>,
}

/// The full backing-store document. `BTreeMap` keeps serialization
/// reproducible for the same input.
pub type LedgerDoc = BTreeMap<String, ProjectRecord>;

/// Owns the backing-store location and the read-merge-write cycle.
///
/// Constructed once per run and passed by reference to all phase executions;
/// tests point it at a tempdir instead of the real artifacts root.
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full document.
    ///
    /// An absent store is a fresh, empty document. A store that exists but
    /// does not parse is `Corrupt` — recorded history is never silently
    /// discarded; the error text tells the operator how to start over.
    pub fn load(&self) -> Result<LedgerDoc, LedgerError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "ledger absent, starting fresh");
            return Ok(LedgerDoc::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|source| LedgerError::Unreadable {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| LedgerError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Record a status transition for one phase of one project.
    ///
    /// Upserts the phase entry under its id, stamps the phase timestamp and
    /// the project's `updated_at`, and persists the whole merged document.
    /// `result_text` is truncated to [`MAX_RESULT_CHARS`] before storage.
    pub fn record(
        &self,
        project: &str,
        phase_id: &str,
        agent: AgentRole,
        status: PhaseStatus,
        result_text: &str,
    ) -> Result<(), LedgerError> {
        let mut doc = self.load()?;
        let now = Utc::now();

        let entry = doc
            .entry(project.to_string())
            .or_insert_with(|| ProjectRecord {
                phases: BTreeMap::new(),
                updated_at: now,
            });
        entry.phases.insert(
            phase_id.to_string(),
            PhaseRecord {
                agent,
                status,
                result: truncate_result(result_text),
                timestamp: now,
            },
        );
        entry.updated_at = now;

        self.persist(&doc)?;
        debug!(project, phase_id, %status, "ledger updated");
        Ok(())
    }

    /// Read one project's entry, if any. Used by the status command.
    pub fn project_record(&self, project: &str) -> Result<Option<ProjectRecord>, LedgerError> {
        Ok(self.load()?.remove(project))
    }

    /// Drop one project's entries. Unrelated projects are untouched.
    /// Returns whether anything was removed.
    pub fn reset_project(&self, project: &str) -> Result<bool, LedgerError> {
        let mut doc = self.load()?;
        let removed = doc.remove(project).is_some();
        if removed {
            self.persist(&doc)?;
        }
        Ok(removed)
    }

    /// Remove the backing store entirely. The only way past a corrupt store.
    pub fn reset_all(&self) -> Result<(), LedgerError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|source| LedgerError::Unwritable {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Replace-on-write: serialize next to the store, then rename over it,
    /// so a reader never observes a partially written document.
    fn persist(&self, doc: &LedgerDoc) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(doc).map_err(|e| LedgerError::Unwritable {
            path: self.path.clone(),
            source: std::io::Error::other(e),
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| LedgerError::Unwritable {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| LedgerError::Unwritable {
            path: self.path.clone(),
            source,
        })
    }
}

/// Truncate to [`MAX_RESULT_CHARS`] characters. Counting characters rather
/// than bytes keeps non-ASCII output intact and never splits a code point.
fn truncate_result(text: &str) -> String {
    match text.char_indices().nth(MAX_RESULT_CHARS) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
