use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use super::event::Event;
use crate::telemetry::{PlainFormatter, TelemetryFormatter};

/// Consumer of bus events.
///
/// A sink owns its output target and decides how an event is rendered.
/// Errors surface to the bus listener, which logs them and keeps going; one
/// misbehaving sink never stops delivery to the others.
pub trait EventSink: Send + Sync {
    fn handle(&mut self, event: &Event) -> io::Result<()>;
}

/// Captures events in memory.
///
/// Clones share the same buffer, so a test can register one handle with the
/// bus and inspect the other.
#[derive(Clone, Default)]
pub struct MemorySink {
    captured: Arc<Mutex<Vec<Event>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything captured so far, in delivery order.
    pub fn snapshot(&self) -> Vec<Event> {
        self.captured.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.captured.lock().unwrap().clear();
    }
}

impl EventSink for MemorySink {
    fn handle(&mut self, event: &Event) -> io::Result<()> {
        self.captured.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Forwards events into a flume channel for async consumers.
///
/// Sends never block. Once the receiving side is dropped, `handle` reports
/// [`io::ErrorKind::BrokenPipe`] so the bus can log the dead consumer.
pub struct ChannelSink {
    sender: flume::Sender<Event>,
}

impl ChannelSink {
    /// # Example
    /// ```no_run
    /// use sumweave::events::{ChannelSink, EventBus};
    ///
    /// let (tx, rx) = flume::unbounded();
    /// let bus = EventBus::default();
    /// bus.add_sink(ChannelSink::new(tx));
    ///
    /// tokio::spawn(async move {
    ///     while let Ok(event) = rx.recv_async().await {
    ///         println!("{event}");
    ///     }
    /// });
    /// ```
    pub fn new(sender: flume::Sender<Event>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelSink {
    fn handle(&mut self, event: &Event) -> io::Result<()> {
        self.sender
            .send(event.clone())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "event receiver dropped"))
    }
}

/// Renders events to stdout through a [`TelemetryFormatter`].
pub struct StdOutSink<F: TelemetryFormatter = PlainFormatter> {
    formatter: F,
}

impl Default for StdOutSink {
    fn default() -> Self {
        Self::with_formatter(PlainFormatter::new())
    }
}

impl<F: TelemetryFormatter> StdOutSink<F> {
    pub fn with_formatter(formatter: F) -> Self {
        Self { formatter }
    }
}

impl<F: TelemetryFormatter> EventSink for StdOutSink<F> {
    fn handle(&mut self, event: &Event) -> io::Result<()> {
        let rendered = self.formatter.render_event(event).join_lines();
        let mut out = io::stdout().lock();
        out.write_all(rendered.as_bytes())?;
        out.flush()
    }
}
