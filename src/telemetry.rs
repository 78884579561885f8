use std::io::{self, IsTerminal};

use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::events::Event;
use crate::failures::{ItemFailure, TaskError};

pub const CONTEXT_COLOR: &str = "\x1b[32m"; // green
pub const LINE_COLOR: &str = "\x1b[35m"; // magenta
pub const RESET_COLOR: &str = "\x1b[0m";

/// Install the crate's default `tracing` subscriber.
///
/// Wires an env-filtered fmt layer (span open/close events, no targets or file
/// locations) together with `tracing-error`'s [`ErrorLayer`] so spans are
/// captured alongside errors. The filter honors `RUST_LOG` and falls back to
/// `info,sumweave=info`.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing() {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        // Log when spans are created/closed so instrumented async boundaries show up
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sumweave=info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init();
}

/// Whether rendered telemetry carries ANSI color codes.
///
/// `Auto` resolves against stderr on every check, so output piped to a file
/// stays clean while an interactive run stays readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatterMode {
    #[default]
    Auto,
    Colored,
    Plain,
}

impl FormatterMode {
    /// Resolve `Auto` once: `Colored` when stderr is a terminal, `Plain`
    /// otherwise.
    pub fn auto_detect() -> Self {
        if io::stderr().is_terminal() {
            Self::Colored
        } else {
            Self::Plain
        }
    }

    pub fn is_colored(&self) -> bool {
        match self {
            Self::Auto => io::stderr().is_terminal(),
            Self::Colored => true,
            Self::Plain => false,
        }
    }
}

/// One rendered telemetry item, ready for a sink to write out.
///
/// `context` names where the item came from (an event scope, a failed item);
/// `lines` are newline-terminated output lines.
#[derive(Clone, Debug, Default)]
pub struct EventRender {
    pub context: Option<String>,
    pub lines: Vec<String>,
}

impl EventRender {
    pub fn join_lines(&self) -> String {
        self.lines.join("")
    }
}

pub trait TelemetryFormatter: Send + Sync {
    fn render_event(&self, event: &Event) -> EventRender;
    fn render_failures(&self, failures: &[ItemFailure]) -> Vec<EventRender>;
}

/// Text formatter with [`FormatterMode`]-controlled coloring.
///
/// # Examples
/// ```
/// use sumweave::telemetry::{FormatterMode, PlainFormatter};
///
/// let interactive = PlainFormatter::new();
/// let for_logs = PlainFormatter::with_mode(FormatterMode::Plain);
/// ```
pub struct PlainFormatter {
    mode: FormatterMode,
}

impl PlainFormatter {
    pub fn new() -> Self {
        Self::with_mode(FormatterMode::Auto)
    }

    pub fn with_mode(mode: FormatterMode) -> Self {
        Self { mode }
    }

    /// Wrap `text` in the given ANSI code when the mode calls for color.
    fn paint(&self, code: &str, text: &str) -> String {
        if self.mode.is_colored() {
            format!("{code}{text}{RESET_COLOR}")
        } else {
            text.to_string()
        }
    }

    fn render_failure(&self, position: usize, failure: &ItemFailure) -> EventRender {
        let item = self.paint(
            CONTEXT_COLOR,
            &format!("item {} ({} attempts)", failure.index, failure.attempts),
        );

        let mut lines = vec![format!("[{position}] {} | {item}\n", failure.when)];
        lines.push(format!(
            "{}\n",
            self.paint(LINE_COLOR, &format!("  error: {}", failure.error.message))
        ));
        lines.extend(self.cause_lines(&failure.error));
        if !failure.error.details.is_null() {
            lines.push(format!(
                "{}\n",
                self.paint(
                    LINE_COLOR,
                    &format!("  details: {}", failure.error.details)
                )
            ));
        }

        EventRender {
            context: Some(format!("item {}", failure.index)),
            lines,
        }
    }

    /// One line per nested cause, indented a step deeper at each level.
    fn cause_lines(&self, error: &TaskError) -> Vec<String> {
        let mut lines = Vec::new();
        let mut depth = 1;
        let mut next = error.cause.as_deref();
        while let Some(cause) = next {
            let indented = format!("{}cause: {}", "  ".repeat(depth), cause.message);
            lines.push(format!("{}\n", self.paint(LINE_COLOR, &indented)));
            depth += 1;
            next = cause.cause.as_deref();
        }
        lines
    }
}

impl Default for PlainFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryFormatter for PlainFormatter {
    fn render_event(&self, event: &Event) -> EventRender {
        EventRender {
            context: event.scope_label().map(str::to_string),
            lines: vec![format!("{}\n", self.paint(LINE_COLOR, &event.to_string()))],
        }
    }

    fn render_failures(&self, failures: &[ItemFailure]) -> Vec<EventRender> {
        failures
            .iter()
            .enumerate()
            .map(|(position, failure)| self.render_failure(position, failure))
            .collect()
    }
}
