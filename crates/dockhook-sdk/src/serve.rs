//! The plugin-side request loop.

use std::io::{BufRead, Write};

use dockhook_common::container::ContainerInfo;
use dockhook_common::event::Event;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-status callbacks for a plugin.
///
/// Statuses whose container still exists receive the inspected snapshot
/// (`None` when the daemon could not provide one); `delete`, `destroy`, and
/// `untag` receive the raw event. Every method defaults to an empty result,
/// so a plugin only implements what it cares about. Returning `Err` surfaces
/// as an RPC-level error in the daemon's outcome log.
#[allow(unused_variables)]
pub trait EventHooks {
    /// A client attached to a container.
    fn attach(&mut self, container: Option<&ContainerInfo>) -> Result<String, String> {
        Ok(String::new())
    }
    /// A container was created.
    fn create(&mut self, container: Option<&ContainerInfo>) -> Result<String, String> {
        Ok(String::new())
    }
    /// A container's process exited.
    fn die(&mut self, container: Option<&ContainerInfo>) -> Result<String, String> {
        Ok(String::new())
    }
    /// A container's TTY was resized.
    fn resize(&mut self, container: Option<&ContainerInfo>) -> Result<String, String> {
        Ok(String::new())
    }
    /// A container was started.
    fn start(&mut self, container: Option<&ContainerInfo>) -> Result<String, String> {
        Ok(String::new())
    }
    /// A container (or image) was deleted.
    fn delete(&mut self, event: &Event) -> Result<String, String> {
        Ok(String::new())
    }
    /// A container was destroyed.
    fn destroy(&mut self, event: &Event) -> Result<String, String> {
        Ok(String::new())
    }
    /// An image tag was removed.
    fn untag(&mut self, event: &Event) -> Result<String, String> {
        Ok(String::new())
    }
}

#[derive(Deserialize)]
struct Request {
    #[serde(default)]
    method: String,
    #[serde(default)]
    params: Vec<Value>,
    #[serde(default)]
    id: Value,
}

#[derive(Serialize)]
struct Response<'a> {
    result: Option<String>,
    error: Option<String>,
    id: &'a Value,
}

/// Routes one decoded call to the matching hook.
fn handle(hooks: &mut impl EventHooks, method: &str, payload: &Value) -> Result<String, String> {
    // Go-era plugins were registered under an `Api` receiver; accept both
    // the bare and the prefixed method form.
    let method = method.strip_prefix("Api.").unwrap_or(method);
    match method {
        "Attach" | "Create" | "Die" | "Resize" | "Start" => {
            let container: Option<ContainerInfo> = serde_json::from_value(payload.clone())
                .map_err(|e| format!("undecodable container payload: {e}"))?;
            let container = container.as_ref();
            match method {
                "Attach" => hooks.attach(container),
                "Create" => hooks.create(container),
                "Die" => hooks.die(container),
                "Resize" => hooks.resize(container),
                _ => hooks.start(container),
            }
        }
        "Delete" | "Destroy" | "Untag" => {
            let event: Event = serde_json::from_value(payload.clone())
                .map_err(|e| format!("undecodable event payload: {e}"))?;
            match method {
                "Delete" => hooks.delete(&event),
                "Destroy" => hooks.destroy(&event),
                _ => hooks.untag(&event),
            }
        }
        other => Err(format!("unknown method: {other}")),
    }
}

/// Serves `hooks` over arbitrary reader/writer pairs.
///
/// One request line in, one response line out, until the reader ends,
/// which is how the daemon shuts plugins down (it closes their stdin).
///
/// # Errors
///
/// Returns the first I/O error on either side of the loop.
pub fn serve_on<R, W>(hooks: &mut impl EventHooks, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: BufRead,
    W: Write,
{
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (result, error, id) = match serde_json::from_str::<Request>(&line) {
            Ok(request) => {
                let payload = request.params.first().cloned().unwrap_or(Value::Null);
                match handle(hooks, &request.method, &payload) {
                    Ok(result) => (Some(result), None, request.id),
                    Err(error) => (None, Some(error), request.id),
                }
            }
            Err(e) => (None, Some(format!("undecodable request: {e}")), Value::Null),
        };
        let response = Response {
            result,
            error,
            id: &id,
        };
        serde_json::to_writer(&mut writer, &response).map_err(std::io::Error::other)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    Ok(())
}

/// Serves `hooks` on the process's stdin/stdout.
///
/// # Errors
///
/// Returns the first I/O error on either pipe.
pub fn serve(hooks: &mut impl EventHooks) -> std::io::Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve_on(hooks, stdin.lock(), stdout.lock())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        started: Vec<Option<String>>,
        destroyed: Vec<String>,
    }

    impl EventHooks for Recorder {
        fn start(&mut self, container: Option<&ContainerInfo>) -> Result<String, String> {
            self.started
                .push(container.map(|c| c.config.image.clone()));
            Ok("done".to_owned())
        }

        fn destroy(&mut self, event: &Event) -> Result<String, String> {
            self.destroyed.push(event.id.clone());
            Ok(String::new())
        }

        fn die(&mut self, _container: Option<&ContainerInfo>) -> Result<String, String> {
            Err("refusing to accept death".to_owned())
        }
    }

    fn run(requests: &str) -> (Recorder, Vec<Value>) {
        let mut hooks = Recorder::default();
        let mut output = Vec::new();
        serve_on(&mut hooks, requests.as_bytes(), &mut output).expect("serve should not fail");
        let responses = String::from_utf8(output)
            .expect("responses should be utf-8")
            .lines()
            .map(|line| serde_json::from_str(line).expect("response should be JSON"))
            .collect();
        (hooks, responses)
    }

    #[test]
    fn start_call_reaches_hook_and_answers_result() {
        let (hooks, responses) = run(
            r#"{"method":"Start","params":[{"Id":"c1","Config":{"Image":"nginx"}}],"id":0}
"#,
        );
        assert_eq!(hooks.started, vec![Some("nginx".to_owned())]);
        assert_eq!(responses[0]["result"], "done");
        assert_eq!(responses[0]["error"], Value::Null);
        assert_eq!(responses[0]["id"], 0);
    }

    #[test]
    fn null_container_payload_is_tolerated() {
        let (hooks, responses) = run(
            r#"{"method":"Start","params":[null],"id":1}
"#,
        );
        assert_eq!(hooks.started, vec![None]);
        assert_eq!(responses[0]["result"], "done");
    }

    #[test]
    fn destroy_call_decodes_the_raw_event() {
        let (hooks, responses) = run(
            r#"{"method":"Destroy","params":[{"status":"destroy","id":"c9"}],"id":2}
"#,
        );
        assert_eq!(hooks.destroyed, vec!["c9".to_owned()]);
        assert_eq!(responses[0]["result"], "");
    }

    #[test]
    fn go_era_method_prefix_is_accepted() {
        let (hooks, _) = run(
            r#"{"method":"Api.Start","params":[{"Id":"c1","Config":{"Image":"nginx"}}],"id":3}
"#,
        );
        assert_eq!(hooks.started.len(), 1);
    }

    #[test]
    fn hook_error_becomes_an_rpc_error() {
        let (_, responses) = run(
            r#"{"method":"Die","params":[null],"id":4}
"#,
        );
        assert_eq!(responses[0]["result"], Value::Null);
        assert_eq!(responses[0]["error"], "refusing to accept death");
    }

    #[test]
    fn unknown_method_answers_an_error_and_loop_continues() {
        let (hooks, responses) = run(
            r#"{"method":"Pause","params":[null],"id":5}
{"method":"Start","params":[null],"id":6}
"#,
        );
        assert_eq!(responses[0]["error"], "unknown method: Pause");
        assert_eq!(responses[1]["result"], "done");
        assert_eq!(hooks.started.len(), 1);
    }
}
