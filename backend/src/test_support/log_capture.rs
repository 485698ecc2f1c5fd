//! Scoped capture of `tracing` events.
//!
//! The capture is a [`Layer`] over a bare [`Registry`]: events are recorded
//! and nothing is written anywhere. It is installed only while a future runs
//! (see [`LogCapture::capture`]) so the previous dispatcher is restored on
//! every exit path, including panics and early returns.

use std::fmt;
use std::future::IntoFuture;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::field::{Field, Visit};
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// An event seen by a [`LogCapture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    /// Event level.
    pub level: Level,
    /// Event target, usually the emitting module path.
    pub target: String,
    /// The formatted `message` field, or empty when absent.
    pub message: String,
}

/// Silent recorder for `tracing` events.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LogCapture {
    /// A capture with no events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A dispatcher that feeds this capture.
    #[must_use]
    pub fn dispatch(&self) -> Dispatch {
        Dispatch::new(Registry::default().with(self.clone()))
    }

    /// Drive `future` to completion with this capture as the current
    /// dispatcher.
    pub async fn capture<F: IntoFuture>(&self, future: F) -> F::Output {
        future.into_future().with_subscriber(self.dispatch()).await
    }

    /// Every captured event, in order.
    #[must_use]
    pub fn events(&self) -> Vec<CapturedEvent> {
        lock(&self.events).clone()
    }

    /// Number of captured events at exactly `level`.
    #[must_use]
    pub fn count_at(&self, level: Level) -> usize {
        lock(&self.events)
            .iter()
            .filter(|event| event.level == level)
            .count()
    }

    /// Number of captured `ERROR` events.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count_at(Level::ERROR)
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let metadata = event.metadata();
        lock(&self.events).push(CapturedEvent {
            level: *metadata.level(),
            target: metadata.target().to_owned(),
            message: visitor.message,
        });
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.message);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}
