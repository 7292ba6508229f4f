//! Docker Engine API client: event stream and container inspection.

use async_trait::async_trait;
use dockhook_common::container::ContainerInfo;
use dockhook_common::event::Event;
use tokio::io::BufReader;

use crate::endpoint::{Connection, Endpoint};
use crate::error::{Result, RuntimeError};
use crate::http;

/// Read access to container metadata.
///
/// Seam between the dispatcher and the concrete runtime so dispatch policy
/// can be exercised against stub runtimes.
#[async_trait]
pub trait ContainerApi: Send + Sync {
    /// Fetches the metadata snapshot for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::NotFound`] when the container has already
    /// vanished, or a transport error.
    async fn inspect_container(&self, id: &str) -> Result<ContainerInfo>;
}

/// Client for one Docker daemon endpoint.
///
/// Holds no connection state; each request opens a fresh socket, and the
/// event stream keeps its own socket for the process lifetime.
#[derive(Debug, Clone)]
pub struct DockerClient {
    endpoint: Endpoint,
    version: Option<String>,
}

impl DockerClient {
    /// Creates a client for `endpoint`, optionally pinning an API version.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidEndpoint`] if the endpoint string does
    /// not parse.
    pub fn new(endpoint: &str, version: Option<String>) -> Result<Self> {
        Ok(Self {
            endpoint: Endpoint::parse(endpoint)?,
            version,
        })
    }

    /// A pinned version produces `/v{version}`-prefixed paths; without one
    /// the daemon negotiates its default.
    fn path(&self, suffix: &str) -> String {
        match &self.version {
            Some(version) => format!("/v{version}{suffix}"),
            None => suffix.to_owned(),
        }
    }

    async fn get(&self, suffix: &str) -> Result<(http::ResponseHead, BufReader<Box<dyn Connection>>)> {
        let path = self.path(suffix);
        let mut conn = self.endpoint.connect().await?;
        http::write_request(&mut conn, "GET", &path, self.endpoint.host_header()).await?;
        let mut reader = BufReader::new(conn);
        let head = http::read_head(&mut reader).await?;
        Ok((head, reader))
    }

    /// Verifies the daemon is reachable.
    ///
    /// # Errors
    ///
    /// Returns a connect or HTTP error when the endpoint is unreachable or
    /// unhealthy. Used at startup, where either is fatal.
    pub async fn ping(&self) -> Result<()> {
        let (head, mut reader) = self.get("/_ping").await?;
        let _ = http::read_body(&mut reader, &head).await?;
        if !(200..300).contains(&head.status) {
            return Err(RuntimeError::Http {
                status: head.status,
                path: self.path("/_ping"),
            });
        }
        Ok(())
    }

    /// Subscribes to the daemon's lifecycle event stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription request fails; the returned
    /// stream then yields events until the daemon closes it.
    pub async fn events(&self) -> Result<EventStream> {
        let (head, reader) = self.get("/events").await?;
        if !(200..300).contains(&head.status) {
            return Err(RuntimeError::Http {
                status: head.status,
                path: self.path("/events"),
            });
        }
        Ok(EventStream {
            reader,
            chunked: head.chunked,
        })
    }
}

#[async_trait]
impl ContainerApi for DockerClient {
    async fn inspect_container(&self, id: &str) -> Result<ContainerInfo> {
        let suffix = format!("/containers/{id}/json");
        let (head, mut reader) = self.get(&suffix).await?;
        let body = http::read_body(&mut reader, &head).await?;
        if head.status == 404 {
            return Err(RuntimeError::NotFound { id: id.to_owned() });
        }
        if !(200..300).contains(&head.status) {
            return Err(RuntimeError::Http {
                status: head.status,
                path: self.path(&suffix),
            });
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

/// An open subscription to the runtime's event stream.
///
/// The daemon frames each event as its own chunk; some proxies re-frame the
/// stream as newline-delimited JSON, and both forms are accepted.
pub struct EventStream {
    reader: BufReader<Box<dyn Connection>>,
    chunked: bool,
}

impl EventStream {
    /// Waits for the next event; `Ok(None)` when the daemon closes the
    /// stream.
    ///
    /// # Errors
    ///
    /// Returns transport or decode errors; both are terminal for the stream.
    pub async fn next(&mut self) -> Result<Option<Event>> {
        loop {
            let frame = if self.chunked {
                http::read_chunk(&mut self.reader).await?
            } else {
                http::read_line(&mut self.reader)
                    .await?
                    .map(String::into_bytes)
            };
            let Some(frame) = frame else {
                return Ok(None);
            };
            let text = String::from_utf8_lossy(&frame);
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let event: Event = serde_json::from_str(text)?;
            return Ok(Some(event));
        }
    }
}
