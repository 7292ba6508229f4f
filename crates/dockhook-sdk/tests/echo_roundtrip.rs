//! Round trip between the daemon-side channel and the real echo plugin
//! binary over its actual pipes.

use std::time::Duration;

use dockhook_plugin::{PluginCall, PluginChannel, PluginError};

const ECHO_BIN: &str = env!("CARGO_BIN_EXE_dockhook-echo");

#[tokio::test]
async fn channel_and_echo_plugin_speak_the_same_wire() {
    let channel = PluginChannel::connect(ECHO_BIN, Duration::from_secs(10))
        .expect("echo plugin should spawn");

    let container = serde_json::json!({
        "Id": "c1",
        "Config": {"Image": "nginx"},
        "HostConfig": {"NetworkMode": "default"}
    });
    let result = channel
        .invoke("Start", &container)
        .await
        .expect("Start should succeed");
    assert_eq!(result, "done");

    // Default hooks answer with an empty result.
    let result = channel
        .invoke("Resize", &container)
        .await
        .expect("Resize should succeed");
    assert_eq!(result, "");

    // Absent container payloads are tolerated.
    let result = channel
        .invoke("Start", &serde_json::Value::Null)
        .await
        .expect("Start with null payload should succeed");
    assert_eq!(result, "done");

    // Raw-event methods decode the event schema.
    let event = serde_json::json!({"status": "destroy", "id": "c1", "from": "nginx", "time": 7});
    let result = channel
        .invoke("Destroy", &event)
        .await
        .expect("Destroy should succeed");
    assert_eq!(result, "");

    // Unknown methods come back as RPC errors and leave the channel usable.
    let err = channel
        .invoke("Pause", &event)
        .await
        .expect_err("unknown method should error");
    assert!(matches!(err, PluginError::Rpc { .. }));

    let result = channel
        .invoke("Start", &container)
        .await
        .expect("channel should still be usable");
    assert_eq!(result, "done");
}
