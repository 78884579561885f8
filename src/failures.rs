//! Serializable failure records for batch items.
//!
//! A worker that exhausts its retry budget produces an [`ItemFailure`]: the
//! item's position, how many attempts were made, when it gave up, and the
//! [`TaskError`] chain that ended it. Records are plain data so they can be
//! logged, shipped, or attached to a pipeline outcome.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::telemetry::{EventRender, FormatterMode, PlainFormatter, TelemetryFormatter};

/// Terminal failure record for one batch item.
///
/// # JSON Serialization Format
///
/// ```json
/// {
///   "when": "2025-11-02T10:30:00Z",
///   "index": 7,
///   "attempts": 3,
///   "error": {
///     "message": "provider returned status 429",
///     "cause": {
///       "message": "rate limit exceeded",
///       "details": {"retry_after": "20s"}
///     },
///     "details": {"model": "gpt-4o-mini"}
///   }
/// }
/// ```
///
/// # Examples
///
/// ```
/// use sumweave::failures::{ItemFailure, TaskError};
///
/// let failure = ItemFailure::new(7, 3, TaskError::msg("provider returned status 429"));
/// let json_str = serde_json::to_string(&failure).unwrap();
/// assert!(json_str.contains("\"index\":7"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemFailure {
    #[serde(default = "chrono::Utc::now")]
    pub when: DateTime<Utc>,
    pub index: usize,
    pub attempts: u32,
    #[serde(default)]
    pub error: TaskError,
}

impl ItemFailure {
    pub fn new(index: usize, attempts: u32, error: TaskError) -> Self {
        Self {
            when: Utc::now(),
            index,
            attempts,
            error,
        }
    }
}

/// Structured, chainable error value carried by failed work items.
///
/// Unlike the crate's `thiserror` enums, `TaskError` is data: it survives
/// serialization and crossing task boundaries, and it nests an optional
/// `cause` so the original error chain stays readable after the fact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<TaskError>>,
    #[serde(default)]
    pub details: Value,
}

impl TaskError {
    pub fn msg<M: Into<String>>(m: M) -> Self {
        Self {
            message: m.into(),
            cause: None,
            details: Value::Null,
        }
    }

    /// Capture a std error and its `source()` chain as nested causes.
    ///
    /// # Example
    /// ```
    /// use sumweave::failures::TaskError;
    ///
    /// let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "socket timeout");
    /// let err = TaskError::from_error(&io);
    /// assert_eq!(err.message, "socket timeout");
    /// ```
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut this = TaskError::msg(err.to_string());
        if let Some(source) = err.source() {
            this.cause = Some(Box::new(TaskError::from_error(source)));
        }
        this
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    pub fn with_cause(mut self, cause: TaskError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

impl Default for TaskError {
    fn default() -> Self {
        Self::msg(String::new())
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TaskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_deref().map(|c| c as &dyn std::error::Error)
    }
}

/// Render failure records as human-readable text, with the color mode chosen
/// by the caller.
///
/// Records are separated by a blank line. [`FormatterMode::Plain`] is the
/// right choice for log files; [`FormatterMode::Auto`] matches stderr.
///
/// # Examples
///
/// ```
/// use sumweave::failures::{pretty_print_with_mode, ItemFailure, TaskError};
/// use sumweave::telemetry::FormatterMode;
///
/// let failures = vec![ItemFailure::new(2, 3, TaskError::msg("completion was empty"))];
/// let plain = pretty_print_with_mode(&failures, FormatterMode::Plain);
/// assert!(!plain.contains("\x1b["));
/// assert!(plain.contains("item 2 (3 attempts)"));
/// ```
pub fn pretty_print_with_mode(failures: &[ItemFailure], mode: FormatterMode) -> String {
    PlainFormatter::with_mode(mode)
        .render_failures(failures)
        .iter()
        .map(EventRender::join_lines)
        .collect::<Vec<_>>()
        .join("\n")
}

/// [`pretty_print_with_mode`] with auto-detected color support: colored when
/// stderr is a TTY, plain otherwise.
pub fn pretty_print(failures: &[ItemFailure]) -> String {
    pretty_print_with_mode(failures, FormatterMode::Auto)
}
