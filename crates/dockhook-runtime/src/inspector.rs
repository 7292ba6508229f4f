//! The per-event inspection policy.

use dockhook_common::container::ContainerInfo;
use dockhook_common::event::{Event, EventStatus, PayloadKind};

use crate::client::ContainerApi;
use crate::error::Result;

/// Decides, per event, whether container metadata can still be fetched and
/// fetches it when it can.
///
/// `delete`, `destroy`, and `untag` describe objects that no longer exist in
/// the runtime; for those inspection is skipped and `None` returned without
/// error. Everything else delegates to the runtime, and a fetch failure
/// (object vanished between emission and inspection) propagates to the
/// caller, which abandons dispatch for that event.
pub struct ContainerInspector<C> {
    client: C,
}

impl<C: ContainerApi> ContainerInspector<C> {
    /// Wraps a runtime client.
    pub const fn new(client: C) -> Self {
        Self { client }
    }

    /// Fetches the container snapshot for `event`, or `None` under the
    /// no-inspect rule.
    ///
    /// # Errors
    ///
    /// Propagates the runtime's fetch error for inspectable statuses.
    pub async fn inspect(&self, event: &Event) -> Result<Option<ContainerInfo>> {
        match EventStatus::parse(&event.status) {
            Some(status) if status.payload() == PayloadKind::RawEvent => {
                tracing::debug!(id = %event.id, status = %status, "object gone, inspection skipped");
                Ok(None)
            }
            _ => Ok(Some(self.client.inspect_container(&event.id).await?)),
        }
    }
}
