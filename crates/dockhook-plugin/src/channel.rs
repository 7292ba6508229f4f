//! The JSON-RPC stdio channel to one plugin subprocess.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

use crate::error::{PluginError, Result};

/// A callable request/response handle to one plugin.
///
/// Dyn-safe so the registry can hold real subprocess channels and tests can
/// substitute stubs.
#[async_trait]
pub trait PluginCall: Send + Sync {
    /// Invokes `method` with `payload`, blocking until the plugin responds
    /// or the call deadline expires.
    ///
    /// # Errors
    ///
    /// Returns the call's failure; see [`PluginError`] for the taxonomy.
    async fn invoke(&self, method: &str, payload: &Value) -> Result<String>;
}

/// One JSON-RPC request line on the wire.
#[derive(Serialize)]
struct Request<'a> {
    method: &'a str,
    params: [&'a Value; 1],
    id: u64,
}

/// One JSON-RPC response line on the wire.
#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    id: u64,
}

/// The live pipe pair to a connected plugin process.
#[derive(Debug)]
struct Wire {
    // Held so the subprocess is killed when the wire is dropped.
    _child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
}

/// Explicit connection state. The policy is fail-fast: once broken, the
/// channel stays broken and is never re-established.
#[derive(Debug)]
enum ChannelState {
    Connected(Wire),
    Broken,
}

/// The RPC channel to one plugin subprocess.
///
/// Calls on one channel are serialized (the wire carries one outstanding
/// request at a time); distinct channels share nothing. Any mid-wire failure
/// (I/O error, EOF, undecodable bytes, deadline expiry) marks the channel
/// [`ChannelState::Broken`] and drops the subprocess, because a late or
/// partial response would desynchronize the newline-delimited framing.
#[derive(Debug)]
pub struct PluginChannel {
    name: String,
    call_timeout: Duration,
    state: Mutex<ChannelState>,
}

impl PluginChannel {
    /// Spawns `program` as a plugin subprocess and wires up its stdio.
    ///
    /// Bare program names are resolved on `$PATH`; anything containing a path
    /// separator is used as given. The child's stderr is inherited so plugin
    /// diagnostics land in the daemon's own stderr.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Resolve`] or [`PluginError::Spawn`]; both are
    /// fatal at startup.
    pub fn connect(program: &str, call_timeout: Duration) -> Result<Self> {
        let path = resolve_program(program)?;
        let mut child = Command::new(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PluginError::Spawn {
                path: path.clone(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| PluginError::Spawn {
            path: path.clone(),
            source: std::io::Error::other("child stdin was not captured"),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| PluginError::Spawn {
            path: path.clone(),
            source: std::io::Error::other("child stdout was not captured"),
        })?;

        Ok(Self {
            name: program.to_owned(),
            call_timeout,
            state: Mutex::new(ChannelState::Connected(Wire {
                _child: child,
                stdin,
                stdout: BufReader::new(stdout),
                next_id: 0,
            })),
        })
    }

    /// Display name of the plugin (the configured path string).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One request/response exchange on an already-locked wire.
    async fn exchange(wire: &mut Wire, plugin: &str, method: &str, payload: &Value) -> Result<String> {
        let id = wire.next_id;
        wire.next_id += 1;

        let request = Request {
            method,
            params: [payload],
            id,
        };
        let mut line = serde_json::to_vec(&request).map_err(|source| PluginError::Codec {
            plugin: plugin.to_owned(),
            source,
        })?;
        line.push(b'\n');

        let io_err = |source| PluginError::Io {
            plugin: plugin.to_owned(),
            source,
        };
        wire.stdin.write_all(&line).await.map_err(io_err)?;
        wire.stdin.flush().await.map_err(io_err)?;

        let mut reply = String::new();
        let read = wire.stdout.read_line(&mut reply).await.map_err(io_err)?;
        if read == 0 {
            return Err(PluginError::ChannelClosed {
                plugin: plugin.to_owned(),
            });
        }

        let response: Response =
            serde_json::from_str(reply.trim()).map_err(|source| PluginError::Codec {
                plugin: plugin.to_owned(),
                source,
            })?;
        // Calls on one channel are serialized, so the response must answer
        // the one outstanding request; anything else is a framing failure.
        if response.id != id {
            return Err(PluginError::OutOfOrder {
                plugin: plugin.to_owned(),
                expected: id,
                got: response.id,
            });
        }
        if let Some(error) = response.error {
            if !error.is_null() {
                return Err(PluginError::Rpc {
                    plugin: plugin.to_owned(),
                    message: error.to_string(),
                });
            }
        }
        Ok(response.result.unwrap_or_default())
    }
}

#[async_trait]
impl PluginCall for PluginChannel {
    async fn invoke(&self, method: &str, payload: &Value) -> Result<String> {
        let mut state = self.state.lock().await;
        let ChannelState::Connected(wire) = &mut *state else {
            return Err(PluginError::ChannelBroken {
                plugin: self.name.clone(),
            });
        };

        match tokio::time::timeout(
            self.call_timeout,
            Self::exchange(wire, &self.name, method, payload),
        )
        .await
        {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err)) => {
                if err.breaks_channel() {
                    *state = ChannelState::Broken;
                }
                Err(err)
            }
            Err(_elapsed) => {
                *state = ChannelState::Broken;
                Err(PluginError::Timeout {
                    plugin: self.name.clone(),
                    deadline: self.call_timeout,
                })
            }
        }
    }
}

fn resolve_program(program: &str) -> Result<PathBuf> {
    if program.contains(std::path::MAIN_SEPARATOR) {
        return Ok(PathBuf::from(program));
    }
    which::which(program).map_err(|source| PluginError::Resolve {
        program: program.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    /// Writes an executable `/bin/sh` script acting as a plugin.
    fn script_plugin(dir: &tempfile::TempDir, body: &str) -> String {
        let path = dir.path().join("plugin.sh");
        let mut file = std::fs::File::create(&path).expect("create script");
        writeln!(file, "#!/bin/sh\n{body}").expect("write script");
        drop(file);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod script");
        path.to_string_lossy().into_owned()
    }

    fn payload() -> Value {
        serde_json::json!({"status": "start", "id": "c1"})
    }

    #[tokio::test]
    async fn invoke_round_trips_result() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = script_plugin(
            &dir,
            r#"read -r line
echo '{"id":0,"result":"done","error":null}'"#,
        );
        let channel =
            PluginChannel::connect(&path, Duration::from_secs(5)).expect("channel should connect");

        let result = channel
            .invoke("Start", &payload())
            .await
            .expect("invoke should succeed");
        assert_eq!(result, "done");
    }

    #[tokio::test]
    async fn plugin_reported_error_does_not_break_channel() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = script_plugin(
            &dir,
            r#"i=0
while read -r line; do
  echo "{\"id\":$i,\"result\":null,\"error\":\"boom\"}"
  i=$((i+1))
done"#,
        );
        let channel =
            PluginChannel::connect(&path, Duration::from_secs(5)).expect("channel should connect");

        let err = channel
            .invoke("Start", &payload())
            .await
            .expect_err("plugin error should surface");
        assert!(matches!(err, PluginError::Rpc { .. }));

        // The channel answered in well-formed frames; it stays usable.
        let err = channel
            .invoke("Die", &payload())
            .await
            .expect_err("plugin error should surface again");
        assert!(matches!(err, PluginError::Rpc { .. }));
    }

    #[tokio::test]
    async fn eof_marks_channel_broken() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = script_plugin(&dir, "exit 0");
        let channel =
            PluginChannel::connect(&path, Duration::from_secs(5)).expect("channel should connect");

        let err = channel
            .invoke("Start", &payload())
            .await
            .expect_err("dead plugin should fail");
        assert!(
            matches!(err, PluginError::ChannelClosed { .. } | PluginError::Io { .. }),
            "unexpected error: {err}"
        );

        let err = channel
            .invoke("Start", &payload())
            .await
            .expect_err("broken channel should fail fast");
        assert!(matches!(err, PluginError::ChannelBroken { .. }));
    }

    #[tokio::test]
    async fn deadline_expiry_is_a_distinct_timeout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = script_plugin(&dir, "sleep 30");
        let channel = PluginChannel::connect(&path, Duration::from_millis(100))
            .expect("channel should connect");

        let err = channel
            .invoke("Start", &payload())
            .await
            .expect_err("hung plugin should time out");
        assert!(matches!(err, PluginError::Timeout { .. }), "unexpected error: {err}");

        let err = channel
            .invoke("Start", &payload())
            .await
            .expect_err("timed-out channel should fail fast");
        assert!(matches!(err, PluginError::ChannelBroken { .. }));
    }

    #[tokio::test]
    async fn undecodable_response_marks_channel_broken() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = script_plugin(
            &dir,
            r#"read -r line
echo 'this is not json'"#,
        );
        let channel =
            PluginChannel::connect(&path, Duration::from_secs(5)).expect("channel should connect");

        let err = channel
            .invoke("Start", &payload())
            .await
            .expect_err("garbage response should fail");
        assert!(matches!(err, PluginError::Codec { .. }));

        let err = channel
            .invoke("Start", &payload())
            .await
            .expect_err("broken channel should fail fast");
        assert!(matches!(err, PluginError::ChannelBroken { .. }));
    }

    #[tokio::test]
    async fn mismatched_response_id_marks_channel_broken() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = script_plugin(
            &dir,
            r#"read -r line
echo '{"id":42,"result":"late","error":null}'"#,
        );
        let channel =
            PluginChannel::connect(&path, Duration::from_secs(5)).expect("channel should connect");

        let err = channel
            .invoke("Start", &payload())
            .await
            .expect_err("wrong response id should fail");
        assert!(
            matches!(err, PluginError::OutOfOrder { expected: 0, got: 42, .. }),
            "unexpected error: {err}"
        );

        let err = channel
            .invoke("Start", &payload())
            .await
            .expect_err("broken channel should fail fast");
        assert!(matches!(err, PluginError::ChannelBroken { .. }));
    }

    #[tokio::test]
    async fn missing_executable_fails_to_connect() {
        let err = PluginChannel::connect("/nonexistent/dockhook-plugin", Duration::from_secs(1))
            .expect_err("spawn should fail");
        assert!(matches!(err, PluginError::Spawn { .. }));

        let err = PluginChannel::connect("definitely-not-on-path-dockhook", Duration::from_secs(1))
            .expect_err("resolution should fail");
        assert!(matches!(err, PluginError::Resolve { .. }));
    }

    #[test]
    fn request_framing_matches_wire_protocol() {
        let payload = payload();
        let request = Request {
            method: "Start",
            params: [&payload],
            id: 7,
        };
        let json = serde_json::to_value(&request).expect("request should serialize");
        assert_eq!(json["method"], "Start");
        assert_eq!(json["id"], 7);
        assert_eq!(json["params"][0]["id"], "c1");
    }
}
