//! Structured runtime events: worker messages, progress snapshots, diagnostics.
//!
//! The module is organised around an [`EventBus`] that fans events out to
//! configured [`EventSink`]s from a background listener task. Producers hold a
//! cloned `flume::Sender<Event>` and never block on slow sinks.

pub mod bus;
pub mod event;
pub mod sink;

pub use bus::EventBus;
pub use event::{DiagnosticEvent, Event, ProgressEvent, TaskEvent};
pub use sink::{ChannelSink, EventSink, MemorySink, StdOutSink};
