//! The intake loop feeding events into the dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use dockhook_common::event::Event;
use dockhook_runtime::{ContainerApi, EventStream, Result};

use crate::dispatcher::EventDispatcher;

/// A source of runtime events.
///
/// `Ok(None)` marks the end of the stream; an error is terminal.
#[async_trait]
pub trait EventFeed: Send {
    /// Waits for the next event.
    ///
    /// # Errors
    ///
    /// Returns the feed's transport error; the runner stops on it.
    async fn next_event(&mut self) -> Result<Option<Event>>;
}

#[async_trait]
impl EventFeed for EventStream {
    async fn next_event(&mut self) -> Result<Option<Event>> {
        self.next().await
    }
}

/// The outermost loop: pulls events and hands each to the dispatcher.
///
/// Each dispatch runs as a detached task, so the loop blocks only while
/// waiting for the next event — an outstanding fan-out (even a hung plugin
/// call) never delays intake. In-flight calls are not drained on shutdown.
pub struct Runner<C> {
    dispatcher: Arc<EventDispatcher<C>>,
}

impl<C> Runner<C>
where
    C: ContainerApi + 'static,
{
    /// Creates a runner over a shared dispatcher.
    pub const fn new(dispatcher: Arc<EventDispatcher<C>>) -> Self {
        Self { dispatcher }
    }

    /// Consumes `feed` until it ends or fails.
    ///
    /// # Errors
    ///
    /// Propagates the feed's terminal error; the caller treats it as fatal.
    pub async fn run<F: EventFeed>(&self, mut feed: F) -> Result<()> {
        while let Some(event) = feed.next_event().await? {
            tracing::debug!(id = %event.id, status = %event.status, "event received");
            let dispatcher = Arc::clone(&self.dispatcher);
            let _ = tokio::spawn(async move { dispatcher.dispatch(event).await });
        }
        tracing::info!("event stream closed by runtime");
        Ok(())
    }
}
