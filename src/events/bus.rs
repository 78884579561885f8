use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::event::Event;
use super::sink::{EventSink, StdOutSink};

type SharedSinks = Arc<Mutex<Vec<Box<dyn EventSink>>>>;

/// Fans events from one channel out to every registered [`EventSink`].
///
/// Producers hold cloned senders from [`EventBus::get_sender`] and never
/// touch sink I/O themselves: a background listener task drains the channel
/// and hands each event to the sinks in registration order. The channel is
/// unbounded, so events sent before [`EventBus::listen_for_events`] are
/// buffered rather than lost.
pub struct EventBus {
    sender: flume::Sender<Event>,
    receiver: flume::Receiver<Event>,
    sinks: SharedSinks,
    listener: Mutex<Option<Listener>>,
}

struct Listener {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl Default for EventBus {
    /// Bus that renders every event to stdout.
    fn default() -> Self {
        Self::with_sink(StdOutSink::default())
    }
}

impl EventBus {
    pub fn with_sink<T: EventSink + 'static>(sink: T) -> Self {
        Self::with_sinks(vec![Box::new(sink)])
    }

    pub fn with_sinks(sinks: Vec<Box<dyn EventSink>>) -> Self {
        let (sender, receiver) = flume::unbounded();
        Self {
            sender,
            receiver,
            sinks: Arc::new(Mutex::new(sinks)),
            listener: Mutex::new(None),
        }
    }

    /// Register another sink while the bus is running.
    ///
    /// # Example
    /// ```no_run
    /// use sumweave::events::{ChannelSink, EventBus};
    ///
    /// let bus = EventBus::default();
    /// bus.listen_for_events();
    ///
    /// let (tx, rx) = flume::unbounded();
    /// bus.add_sink(ChannelSink::new(tx));
    /// // Events now reach stdout and the channel.
    /// ```
    pub fn add_sink<T: EventSink + 'static>(&self, sink: T) {
        self.sinks.lock().unwrap().push(Box::new(sink));
    }

    /// Cloned sender side for producers.
    pub fn get_sender(&self) -> flume::Sender<Event> {
        self.sender.clone()
    }

    /// Start the background listener task. Calling this again while a
    /// listener is already running is a no-op.
    pub fn listen_for_events(&self) {
        let mut listener = self.listener.lock().expect("listener poisoned");
        if listener.is_some() {
            return;
        }

        let (stop, stopped) = oneshot::channel();
        let task = tokio::spawn(drain(
            self.receiver.clone(),
            Arc::clone(&self.sinks),
            stopped,
        ));
        *listener = Some(Listener { stop, task });
    }

    /// Stop the listener, delivering anything still queued first.
    pub async fn stop_listener(&self) {
        let running = self.listener.lock().expect("listener poisoned").take();
        if let Some(Listener { stop, task }) = running {
            let _ = stop.send(());
            let _ = task.await;
        }
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        if let Ok(mut listener) = self.listener.lock() {
            if let Some(running) = listener.take() {
                running.task.abort();
            }
        }
    }
}

async fn drain(
    receiver: flume::Receiver<Event>,
    sinks: SharedSinks,
    mut stopped: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut stopped => break,
            received = receiver.recv_async() => match received {
                Ok(event) => deliver(&sinks, &event),
                Err(_) => return,
            }
        }
    }

    // Stop was requested. Flush what producers had already queued.
    while let Ok(event) = receiver.try_recv() {
        deliver(&sinks, &event);
    }
}

fn deliver(sinks: &SharedSinks, event: &Event) {
    let mut sinks = sinks.lock().unwrap();
    for sink in sinks.iter_mut() {
        if let Err(error) = sink.handle(event) {
            tracing::warn!(%error, "event sink rejected an event");
        }
    }
}
