//! Asynchronous document-processing queue.
//!
//! One background worker per queue drains submissions in FIFO order and runs
//! the full pipeline for each task: extract text, preprocess, call the
//! analyzer through the shared retrier/rate-limiter. Serialization is
//! intentional: a single worker means the rate limiter observes the true
//! outbound call cadence, which parallel calls would hide.
//!
//! Submitters and pollers never block: `submit` is a channel push plus a
//! table insert, and the read-side methods are lock-snapshot-unlock. All
//! sleeping (limiter spacing, backoff, the HTTP call itself) happens inside
//! the worker task. The result table lock is a `std::sync::Mutex` that is
//! never held across an await point.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::analyzer::{DocumentAnalyzer, DocumentText};
use crate::extract::TextExtractor;
use crate::models::{AnalyzedDocument, DocumentRef, MatchCriteria};
use crate::preprocess::{name_hint_from_path, preprocess_resume_text};
use crate::retry::Retrier;

/// Extracted text shorter than this fails the task as unusable.
const MIN_TEXT_CHARS: usize = 50;

/// Stored error strings are truncated to stay readable in status views.
const ERROR_MESSAGE_MAX: usize = 500;

/// Deterministic task identity, derived from the document's file stem so a
/// resubmission of the same document maps to the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    pub fn for_document(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "document".to_string());
        TaskId(stem)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Task lifecycle. `queued → processing → completed | failed`; the two
/// terminal states are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// What to do when a task id that already exists is submitted again.
///
/// `Reprocess` begins a new lifecycle for the id (its status drops back to
/// `queued`); monotonicity of status transitions holds within one lifecycle.
/// `Dedupe` keeps the existing entry and returns its id untouched. The
/// orchestrator picks; the queue does not decide for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResubmitPolicy {
    #[default]
    Reprocess,
    Dedupe,
}

/// Queue tuning, supplied by the processor from engine config.
#[derive(Debug, Clone)]
pub struct QueueOptions {
    pub resubmit_policy: ResubmitPolicy,
    /// Longer documents are truncated before prompting.
    pub max_document_chars: usize,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            resubmit_policy: ResubmitPolicy::default(),
            max_document_chars: 15_000,
        }
    }
}

/// Read-only view of one task.
#[derive(Debug, Clone)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub status: TaskStatus,
    pub data: Option<AnalyzedDocument>,
    pub error: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

struct QueuedTask {
    id: TaskId,
    generation: u64,
    path: PathBuf,
    criteria: Option<MatchCriteria>,
}

struct TableEntry {
    status: TaskStatus,
    /// Bumped on reprocess so a stale in-flight run cannot overwrite the
    /// entry of the lifecycle that superseded it.
    generation: u64,
    data: Option<AnalyzedDocument>,
    error: Option<String>,
    submitted_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TableEntry {
    fn new(generation: u64) -> Self {
        let now = Utc::now();
        Self {
            status: TaskStatus::Queued,
            generation,
            data: None,
            error: None,
            submitted_at: now,
            updated_at: now,
        }
    }
}

type ResultTable = Arc<Mutex<HashMap<TaskId, TableEntry>>>;

/// FIFO task queue with a single owned background worker.
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<QueuedTask>,
    table: ResultTable,
    options: QueueOptions,
    worker: JoinHandle<()>,
}

impl TaskQueue {
    /// Spawns the worker and returns the queue handle. Exactly one worker
    /// drains this queue for the lifetime of the handle.
    pub fn start(
        extractor: Arc<dyn TextExtractor>,
        analyzer: Arc<dyn DocumentAnalyzer>,
        retrier: Retrier,
        options: QueueOptions,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let table: ResultTable = Arc::new(Mutex::new(HashMap::new()));

        let worker = tokio::spawn(worker_loop(
            rx,
            Arc::clone(&table),
            extractor,
            analyzer,
            retrier,
            options.clone(),
        ));

        Self {
            tx,
            table,
            options,
            worker,
        }
    }

    /// Enqueues a document for analysis and returns its id immediately.
    /// Never blocks: the push is an unbounded-channel send.
    pub fn submit(&self, path: &Path, criteria: Option<MatchCriteria>) -> TaskId {
        let id = TaskId::for_document(path);

        let generation = {
            let mut table = self.table.lock().expect("result table poisoned");
            match table.get_mut(&id) {
                Some(_) if self.options.resubmit_policy == ResubmitPolicy::Dedupe => {
                    return id;
                }
                Some(entry) => {
                    let next = entry.generation + 1;
                    *entry = TableEntry::new(next);
                    next
                }
                None => {
                    table.insert(id.clone(), TableEntry::new(0));
                    0
                }
            }
        };

        let task = QueuedTask {
            id: id.clone(),
            generation,
            path: path.to_path_buf(),
            criteria,
        };
        if self.tx.send(task).is_err() {
            // Worker already shut down; fail the entry so pollers see it.
            let mut table = self.table.lock().expect("result table poisoned");
            if let Some(entry) = table.get_mut(&id) {
                entry.status = TaskStatus::Failed;
                entry.error = Some("queue worker is not running".to_string());
                entry.updated_at = Utc::now();
            }
        }
        id
    }

    /// Non-blocking snapshot of one task; `None` for unknown ids.
    pub fn result(&self, id: &TaskId) -> Option<TaskSnapshot> {
        let table = self.table.lock().expect("result table poisoned");
        table.get(id).map(|entry| TaskSnapshot {
            id: id.clone(),
            status: entry.status,
            data: entry.data.clone(),
            error: entry.error.clone(),
            submitted_at: entry.submitted_at,
            updated_at: entry.updated_at,
        })
    }

    /// Non-blocking snapshot of every task's status, for bulk polling.
    pub fn statuses(&self) -> HashMap<TaskId, TaskStatus> {
        let table = self.table.lock().expect("result table poisoned");
        table
            .iter()
            .map(|(id, entry)| (id.clone(), entry.status))
            .collect()
    }

    /// All completed analyses.
    pub fn completed(&self) -> Vec<AnalyzedDocument> {
        let table = self.table.lock().expect("result table poisoned");
        table
            .values()
            .filter_map(|entry| entry.data.clone())
            .collect()
    }

    /// True when no task is queued or processing.
    pub fn is_idle(&self) -> bool {
        let table = self.table.lock().expect("result table poisoned");
        table.values().all(|entry| entry.status.is_terminal())
    }

    /// Stops accepting submissions and waits for the worker to drain what it
    /// already has. Teardown only; there is no per-task cancellation.
    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.worker.await;
    }
}

async fn worker_loop(
    mut rx: mpsc::UnboundedReceiver<QueuedTask>,
    table: ResultTable,
    extractor: Arc<dyn TextExtractor>,
    analyzer: Arc<dyn DocumentAnalyzer>,
    retrier: Retrier,
    options: QueueOptions,
) {
    while let Some(task) = rx.recv().await {
        if !mark_processing(&table, &task) {
            // A newer lifecycle superseded this submission.
            continue;
        }

        info!(task_id = %task.id, "processing document");
        let id = task.id.clone();
        let generation = task.generation;

        // The task runs on its own spawned future so a panic anywhere in the
        // pipeline fails that task instead of unwinding the worker loop.
        let attempt = {
            let extractor = Arc::clone(&extractor);
            let analyzer = Arc::clone(&analyzer);
            let retrier = retrier.clone();
            let options = options.clone();
            tokio::spawn(async move {
                process_task(&task, &extractor, &analyzer, &retrier, &options).await
            })
        };
        let outcome = match attempt.await {
            Ok(outcome) => outcome,
            Err(join_err) => Err(join_error_message(join_err)),
        };

        let mut table = table.lock().expect("result table poisoned");
        let Some(entry) = table.get_mut(&id) else {
            continue;
        };
        if entry.generation != generation || entry.status.is_terminal() {
            continue;
        }
        entry.updated_at = Utc::now();
        match outcome {
            Ok(doc) => {
                info!(task_id = %id, candidate = %doc.profile.name, "task completed");
                entry.status = TaskStatus::Completed;
                entry.data = Some(doc);
            }
            Err(message) => {
                warn!(task_id = %id, error = %message, "task failed");
                entry.status = TaskStatus::Failed;
                entry.error = Some(truncate_chars(&message, ERROR_MESSAGE_MAX));
            }
        }
    }
}

fn join_error_message(err: tokio::task::JoinError) -> String {
    if err.is_panic() {
        let payload = err.into_panic();
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        format!("analysis panicked: {detail}")
    } else {
        "analysis was cancelled".to_string()
    }
}

/// Commits `queued → processing` for the task's generation. Returns false if
/// the entry no longer belongs to this submission.
fn mark_processing(table: &ResultTable, task: &QueuedTask) -> bool {
    let mut table = table.lock().expect("result table poisoned");
    match table.get_mut(&task.id) {
        Some(entry) if entry.generation == task.generation => {
            entry.status = TaskStatus::Processing;
            entry.updated_at = Utc::now();
            true
        }
        _ => false,
    }
}

/// The per-task pipeline. Every failure path collapses into an error string;
/// the worker never propagates, because one poisoned task must not take the queue
/// down with it.
async fn process_task(
    task: &QueuedTask,
    extractor: &Arc<dyn TextExtractor>,
    analyzer: &Arc<dyn DocumentAnalyzer>,
    retrier: &Retrier,
    options: &QueueOptions,
) -> Result<AnalyzedDocument, String> {
    let source = DocumentRef::new(&task.path);

    // Extraction is sync and CPU-bound; keep it off the async executor.
    let raw = {
        let extractor = Arc::clone(extractor);
        let path = task.path.clone();
        tokio::task::spawn_blocking(move || extractor.extract(&path))
            .await
            .map_err(|e| format!("extraction task failed: {e}"))?
            .map_err(|e| e.to_string())?
    };

    let mut text = preprocess_resume_text(&raw);
    if text.trim().len() < MIN_TEXT_CHARS {
        return Err(format!(
            "document text unusable: extracted only {} chars from {}",
            text.trim().len(),
            source.file_name
        ));
    }
    if text.len() > options.max_document_chars {
        warn!(
            task_id = %task.id,
            chars = text.len(),
            limit = options.max_document_chars,
            "document is very long, truncating"
        );
        text = truncate_chars(&text, options.max_document_chars);
    }

    let doc = DocumentText::with_hint(text, name_hint_from_path(&task.path));
    let profile = retrier
        .call(|| analyzer.analyze(&doc, task.criteria.as_ref()))
        .await
        .map_err(|e| e.to_string())?;

    Ok(AnalyzedDocument { source, profile })
}

/// Truncates on a char boundary.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
