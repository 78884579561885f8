use std::fmt;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Everything the pipeline reports while it runs.
///
/// Workers emit [`TaskEvent`]s, the executor emits [`ProgressEvent`]s, and
/// reduction levels emit [`DiagnosticEvent`]s; one `Event` stream carries all
/// three to whatever sinks the caller attached.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Event {
    Task(TaskEvent),
    Progress(ProgressEvent),
    Diagnostic(DiagnosticEvent),
}

impl Event {
    pub fn task_message(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Event::Task(TaskEvent::new(None, None, scope.into(), message.into()))
    }

    pub fn task_message_with_meta(
        index: usize,
        attempt: u32,
        scope: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Event::Task(TaskEvent::new(
            Some(index),
            Some(attempt),
            scope.into(),
            message.into(),
        ))
    }

    pub fn progress(label: impl Into<String>, completed: usize, total: usize) -> Self {
        Event::Progress(ProgressEvent::new(label, completed, total))
    }

    pub fn diagnostic(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Event::Diagnostic(DiagnosticEvent::new(scope, message))
    }

    pub fn scope_label(&self) -> Option<&str> {
        match self {
            Event::Task(task) => Some(task.scope()),
            Event::Progress(progress) => Some(progress.label()),
            Event::Diagnostic(diag) => Some(diag.scope()),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Event::Task(task) => task.message(),
            Event::Progress(progress) => progress.label(),
            Event::Diagnostic(diag) => diag.message(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Event::Task(_) => "task",
            Event::Progress(_) => "progress",
            Event::Diagnostic(_) => "diagnostic",
        }
    }

    /// Variant-specific payload fields, rendered as the `metadata` object of
    /// the normalized schema.
    fn metadata_json(&self) -> Value {
        let mut meta = serde_json::Map::new();
        match self {
            Event::Task(task) => {
                if let Some(index) = task.index() {
                    meta.insert("index".into(), json!(index));
                }
                if let Some(attempt) = task.attempt() {
                    meta.insert("attempt".into(), json!(attempt));
                }
            }
            Event::Progress(progress) => {
                meta.insert("completed".into(), json!(progress.completed()));
                meta.insert("total".into(), json!(progress.total()));
                meta.insert("fraction".into(), json!(progress.fraction()));
                for (key, value) in progress.metadata() {
                    meta.insert(key.clone(), value.clone());
                }
            }
            Event::Diagnostic(_) => {}
        }
        Value::Object(meta)
    }

    /// Flatten the event into the JSON shape shared by every variant:
    ///
    /// ```json
    /// {
    ///   "type": "task" | "progress" | "diagnostic",
    ///   "scope": "...",
    ///   "message": "...",
    ///   "timestamp": "2026-08-22T09:14:03.512+00:00",
    ///   "metadata": { ... }
    /// }
    /// ```
    ///
    /// Progress events keep their capture timestamp; the other variants are
    /// stamped at render time.
    ///
    /// ```
    /// use sumweave::events::Event;
    ///
    /// let json = Event::task_message_with_meta(4, 2, "summarize", "retrying chunk")
    ///     .to_json_value();
    /// assert_eq!(json["type"], "task");
    /// assert_eq!(json["scope"], "summarize");
    /// assert_eq!(json["metadata"]["index"], 4);
    /// assert_eq!(json["metadata"]["attempt"], 2);
    /// ```
    pub fn to_json_value(&self) -> Value {
        let timestamp = match self {
            Event::Progress(progress) => progress.timestamp(),
            _ => Utc::now(),
        };

        json!({
            "type": self.kind(),
            "scope": self.scope_label(),
            "message": self.message(),
            "timestamp": timestamp.to_rfc3339(),
            "metadata": self.metadata_json(),
        })
    }

    /// Compact single-line form of [`to_json_value`](Self::to_json_value),
    /// suitable for JSONL journals.
    ///
    /// ```
    /// use sumweave::events::Event;
    ///
    /// let line = Event::diagnostic("reduce", "level 1").to_json_string().unwrap();
    /// assert!(line.contains("\"type\":\"diagnostic\""));
    /// ```
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_json_value())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Task(task) => match (task.index(), task.attempt()) {
                (Some(index), Some(attempt)) => {
                    write!(f, "[item {index} attempt {attempt}] {}", task.message())
                }
                (Some(index), None) => write!(f, "[item {index}] {}", task.message()),
                (None, Some(attempt)) => write!(f, "[attempt {attempt}] {}", task.message()),
                (None, None) => f.write_str(task.message()),
            },
            Event::Progress(progress) => write!(
                f,
                "[{}] {}/{}",
                progress.label(),
                progress.completed(),
                progress.total()
            ),
            Event::Diagnostic(diag) => f.write_str(diag.message()),
        }
    }
}

/// Event emitted by a worker while processing one batch item.
///
/// `index` and `attempt` are absent for messages that are not tied to a
/// specific item, such as stage-level notes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskEvent {
    index: Option<usize>,
    attempt: Option<u32>,
    scope: String,
    message: String,
}

impl TaskEvent {
    pub fn new(index: Option<usize>, attempt: Option<u32>, scope: String, message: String) -> Self {
        Self {
            index,
            attempt,
            scope,
            message,
        }
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn attempt(&self) -> Option<u32> {
        self.attempt
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Terminal-state progress snapshot for one batch or reduction stage.
///
/// `completed` counts items that reached a terminal state, successes and
/// permanent failures alike, so the fraction always reaches 1.0 when the
/// stage drains.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressEvent {
    label: String,
    completed: usize,
    total: usize,
    metadata: FxHashMap<String, Value>,
    timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(label: impl Into<String>, completed: usize, total: usize) -> Self {
        Self {
            label: label.into(),
            completed,
            total,
            metadata: FxHashMap::default(),
            timestamp: Utc::now(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Completed fraction in `[0.0, 1.0]`; an empty stage counts as done.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn is_final(&self) -> bool {
        self.completed >= self.total
    }

    pub fn metadata(&self) -> &FxHashMap<String, Value> {
        &self.metadata
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn with_metadata(mut self, metadata: FxHashMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Free-form note from a pipeline stage, such as the reducer's per-level
/// merge summary.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosticEvent {
    scope: String,
    message: String,
}

impl DiagnosticEvent {
    pub fn new(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            message: message.into(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
