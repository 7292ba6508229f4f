//! Runtime endpoint parsing and connection establishment.

use std::path::PathBuf;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, UnixStream};

use crate::error::{Result, RuntimeError};

/// A bidirectional byte stream to the runtime, socket family erased.
pub trait Connection: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Connection for T {}

/// A parsed runtime endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Local Unix domain socket (`unix:///var/run/docker.sock`).
    Unix(PathBuf),
    /// TCP authority (`tcp://127.0.0.1:2375`).
    Tcp(String),
}

impl Endpoint {
    /// Parses an endpoint string of the form `unix://<path>` or
    /// `tcp://<host>:<port>`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidEndpoint`] for any other scheme or an
    /// empty address.
    pub fn parse(endpoint: &str) -> Result<Self> {
        if let Some(path) = endpoint.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(RuntimeError::InvalidEndpoint {
                    endpoint: endpoint.to_owned(),
                });
            }
            return Ok(Self::Unix(PathBuf::from(path)));
        }
        if let Some(authority) = endpoint.strip_prefix("tcp://") {
            if authority.is_empty() || !authority.contains(':') {
                return Err(RuntimeError::InvalidEndpoint {
                    endpoint: endpoint.to_owned(),
                });
            }
            return Ok(Self::Tcp(authority.to_owned()));
        }
        Err(RuntimeError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
        })
    }

    /// Opens a fresh connection to the runtime.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Connect`] when the socket cannot be reached.
    pub async fn connect(&self) -> Result<Box<dyn Connection>> {
        match self {
            Self::Unix(path) => {
                let stream =
                    UnixStream::connect(path)
                        .await
                        .map_err(|source| RuntimeError::Connect {
                            endpoint: format!("unix://{}", path.display()),
                            source,
                        })?;
                Ok(Box::new(stream))
            }
            Self::Tcp(authority) => {
                let stream = TcpStream::connect(authority).await.map_err(|source| {
                    RuntimeError::Connect {
                        endpoint: format!("tcp://{authority}"),
                        source,
                    }
                })?;
                Ok(Box::new(stream))
            }
        }
    }

    /// Value for the HTTP `Host` header on this endpoint.
    #[must_use]
    pub fn host_header(&self) -> &str {
        match self {
            Self::Unix(_) => "localhost",
            Self::Tcp(authority) => authority,
        }
    }
}
