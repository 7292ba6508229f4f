//! Per-event plugin fan-out.

use std::sync::Arc;

use dockhook_common::container::ContainerInfo;
use dockhook_common::event::{Event, EventStatus, PayloadKind};
use dockhook_plugin::{CallOutcome, PluginRegistry};
use dockhook_runtime::{ContainerApi, ContainerInspector};
use serde_json::Value;
use tokio::task::JoinSet;

/// Dispatches one event to every registered plugin.
///
/// All effects are side effects: RPC calls and log records. Per-plugin
/// failures are captured inside their own fan-out task and never reach the
/// caller; an inspect failure abandons the current event only.
pub struct EventDispatcher<C> {
    inspector: ContainerInspector<C>,
    registry: Arc<PluginRegistry>,
}

impl<C: ContainerApi> EventDispatcher<C> {
    /// Wires the dispatcher to its inspector and registry.
    pub const fn new(inspector: ContainerInspector<C>, registry: Arc<PluginRegistry>) -> Self {
        Self {
            inspector,
            registry,
        }
    }

    /// Runs the full dispatch pipeline for one event.
    ///
    /// Inspection happens at most once; the resulting payload is serialized
    /// once and shared read-only across all fan-out tasks, so every plugin
    /// sees identical content for this event.
    pub async fn dispatch(&self, event: Event) {
        let Some(status) = EventStatus::parse(&event.status) else {
            tracing::warn!(
                id = %event.id,
                status = %event.status,
                "unrecognized event status, no plugins invoked"
            );
            return;
        };

        let inspected = match self.inspector.inspect(&event).await {
            Ok(inspected) => inspected,
            Err(err) => {
                tracing::error!(
                    id = %event.id,
                    status = %status,
                    error = %err,
                    "inspect failed, abandoning dispatch for this event"
                );
                return;
            }
        };
        let container = inspected
            .as_ref()
            .map(|info| info.summary().to_owned())
            .unwrap_or_default();

        let payload = match build_payload(status, &event, inspected.as_ref()) {
            Ok(payload) => Arc::new(payload),
            Err(err) => {
                tracing::error!(
                    id = %event.id,
                    status = %status,
                    error = %err,
                    "payload serialization failed, abandoning dispatch"
                );
                return;
            }
        };

        let method = status.method_name();
        let mut calls = JoinSet::new();
        for entry in self.registry.entries() {
            let plugin = entry.name().to_owned();
            let channel = entry.channel();
            let payload = Arc::clone(&payload);
            let _ = calls.spawn(async move {
                let result = channel.invoke(method, &payload).await;
                CallOutcome {
                    plugin,
                    method,
                    result,
                }
            });
        }

        while let Some(joined) = calls.join_next().await {
            match joined {
                Ok(outcome) => log_outcome(&event, status, &container, &outcome),
                // A panicking plugin task is contained here; the other tasks
                // and the next event are unaffected.
                Err(err) => {
                    tracing::error!(
                        id = %event.id,
                        status = %status,
                        error = %err,
                        "plugin call task failed"
                    );
                }
            }
        }
    }
}

fn build_payload(
    status: EventStatus,
    event: &Event,
    inspected: Option<&ContainerInfo>,
) -> serde_json::Result<Value> {
    match status.payload() {
        PayloadKind::RawEvent => serde_json::to_value(event),
        // `None` serializes as JSON null; plugins tolerate an absent
        // container payload.
        PayloadKind::Inspected => serde_json::to_value(inspected),
    }
}

fn log_outcome(event: &Event, status: EventStatus, container: &str, outcome: &CallOutcome) {
    match &outcome.result {
        Ok(response) => {
            tracing::info!(
                id = %event.id,
                status = %status,
                plugin = %outcome.plugin,
                container = %container,
                method = %outcome.method,
                result = %response,
                "plugin notified"
            );
        }
        Err(err) => {
            tracing::error!(
                id = %event.id,
                status = %status,
                plugin = %outcome.plugin,
                container = %container,
                method = %outcome.method,
                error = %err,
                "plugin call failed"
            );
        }
    }
}
