//! Runtime lifecycle events and the status-to-RPC-method mapping.
//!
//! Field names mirror the Docker `/events` wire schema so a raw event can be
//! forwarded to plugins unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A lifecycle event emitted by the container runtime.
///
/// Immutable after receipt; consumed exactly once by the runner and discarded
/// when dispatch completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Lifecycle status string (`start`, `die`, `destroy`, ...).
    #[serde(default)]
    pub status: String,
    /// Identifier of the container (or image, for tag events).
    #[serde(default)]
    pub id: String,
    /// Image or source the event originated from.
    #[serde(default)]
    pub from: String,
    /// Unix timestamp of the event.
    #[serde(default)]
    pub time: i64,
}

/// How the payload for an event is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// The raw event record is sent; the object no longer exists in the
    /// runtime, so container metadata is unavailable by design.
    RawEvent,
    /// The inspected container snapshot is sent (which may legitimately be
    /// absent if the container vanished between emission and inspection).
    Inspected,
}

/// The recognized event status vocabulary.
///
/// The mapping from status to RPC method name is an explicit enumeration:
/// a status string the runtime introduces that is not listed here takes the
/// unrecognized branch in the dispatcher instead of turning into a
/// meaningless RPC call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventStatus {
    /// A client attached to the container.
    Attach,
    /// The container was created.
    Create,
    /// The container (or image) was deleted.
    Delete,
    /// The container was destroyed.
    Destroy,
    /// The container's process exited.
    Die,
    /// The container's TTY was resized.
    Resize,
    /// The container was started.
    Start,
    /// An image tag was removed.
    Untag,
}

impl EventStatus {
    /// Parses a runtime status string into the recognized vocabulary.
    ///
    /// Returns `None` for any status outside the recognized set.
    #[must_use]
    pub fn parse(status: &str) -> Option<Self> {
        match status {
            "attach" => Some(Self::Attach),
            "create" => Some(Self::Create),
            "delete" => Some(Self::Delete),
            "destroy" => Some(Self::Destroy),
            "die" => Some(Self::Die),
            "resize" => Some(Self::Resize),
            "start" => Some(Self::Start),
            "untag" => Some(Self::Untag),
            _ => None,
        }
    }

    /// The RPC method name invoked on every plugin for this status.
    #[must_use]
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::Attach => "Attach",
            Self::Create => "Create",
            Self::Delete => "Delete",
            Self::Destroy => "Destroy",
            Self::Die => "Die",
            Self::Resize => "Resize",
            Self::Start => "Start",
            Self::Untag => "Untag",
        }
    }

    /// Which payload plugins receive for this status.
    ///
    /// `delete`, `destroy`, and `untag` describe objects that no longer
    /// exist, so the raw event is sent and inspection is skipped.
    #[must_use]
    pub const fn payload(self) -> PayloadKind {
        match self {
            Self::Delete | Self::Destroy | Self::Untag => PayloadKind::RawEvent,
            Self::Attach | Self::Create | Self::Die | Self::Resize | Self::Start => {
                PayloadKind::Inspected
            }
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attach => write!(f, "attach"),
            Self::Create => write!(f, "create"),
            Self::Delete => write!(f, "delete"),
            Self::Destroy => write!(f, "destroy"),
            Self::Die => write!(f, "die"),
            Self::Resize => write!(f, "resize"),
            Self::Start => write!(f, "start"),
            Self::Untag => write!(f, "untag"),
        }
    }
}
