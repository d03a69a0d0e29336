//! Integration tests for tool listing and invocation.

use std::time::Duration;

use mcp_gateway::gateway::{
    domain::{BackendOperation, ToolArguments},
    ports::{BackendCallError, BackendError},
    services::DispatchError,
};
use rstest::{fixture, rstest};
use serde_json::json;

use super::helpers::{GatewayHarness, server_name, tool, tool_names};

#[fixture]
fn harness() -> GatewayHarness {
    let harness = GatewayHarness::with_servers(&["notes", "broken"]);
    harness.offer_tools("notes", &["echo", "append"]);
    harness.fail_to_start("broken");
    harness
}

fn message(text: &str) -> ToolArguments {
    let mut arguments = ToolArguments::new();
    arguments.insert("msg".to_owned(), json!(text));
    arguments
}

#[rstest]
#[tokio::test]
async fn invocation_returns_backend_result(harness: GatewayHarness) {
    harness.bring_up().await;

    let result = harness
        .dispatch()
        .invoke("notes", "echo", message("hi"))
        .await
        .expect("invocation should succeed");

    assert_eq!(result, json!({"msg": "hi"}));
}

#[rstest]
#[tokio::test]
async fn tool_error_is_preserved_in_invocation_failure(harness: GatewayHarness) {
    harness
        .registry
        .set_tool_error(
            &server_name("notes"),
            "append",
            json!({"content": [{"type": "text", "text": "disk full"}], "isError": true}),
        )
        .expect("tool error setup should succeed");
    harness.bring_up().await;

    let result = harness
        .dispatch()
        .invoke("notes", "append", message("hi"))
        .await;

    let Err(DispatchError::InvocationFailed {
        server,
        tool,
        source,
    }) = result
    else {
        panic!("expected invocation failure, got {result:?}");
    };
    assert_eq!((server.as_str(), tool.as_str()), ("notes", "append"));
    assert!(matches!(
        source,
        BackendCallError::Backend(BackendError::ToolReported { detail, .. })
            if detail["content"][0]["text"] == "disk full"
    ));
}

#[rstest]
#[tokio::test]
async fn unknown_tool_fails_at_backend(harness: GatewayHarness) {
    harness.bring_up().await;

    let result = harness
        .dispatch()
        .invoke("notes", "delete", ToolArguments::new())
        .await;

    assert!(matches!(
        result,
        Err(DispatchError::InvocationFailed { tool, .. }) if tool == "delete"
    ));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn invocation_is_bounded_by_deadline(harness: GatewayHarness) {
    harness
        .registry
        .set_latency(
            &server_name("notes"),
            BackendOperation::Invoke,
            Duration::from_secs(31),
        )
        .expect("latency setup should succeed");
    harness.bring_up().await;

    let result = harness
        .dispatch()
        .invoke("notes", "echo", message("hi"))
        .await;

    assert!(matches!(
        result,
        Err(DispatchError::InvocationFailed { source, .. }) if source.is_deadline_exceeded()
    ));
}

#[rstest]
#[case::failed_to_start("broken")]
#[case::not_configured("missing")]
#[case::padded_name(" notes")]
#[case::trailing_space("notes ")]
#[tokio::test]
async fn invocation_on_unregistered_server_is_unknown(
    harness: GatewayHarness,
    #[case] server: &str,
) {
    harness.bring_up().await;

    let result = harness
        .dispatch()
        .invoke(server, "echo", message("hi"))
        .await;

    assert!(matches!(result, Err(DispatchError::UnknownServer { server: name }) if name == server));
}

#[rstest]
#[tokio::test]
async fn listing_and_invocation_agree_on_padded_names(harness: GatewayHarness) {
    harness.bring_up().await;
    let dispatch = harness.dispatch();

    let listed = dispatch.list_tools(" notes").await;
    let invoked = dispatch.invoke(" notes", "echo", message("hi")).await;

    assert!(matches!(listed, Err(DispatchError::ServerUnavailable { .. })));
    assert!(matches!(invoked, Err(DispatchError::UnknownServer { .. })));
}

#[rstest]
#[tokio::test]
async fn cache_miss_is_refreshed_on_demand(harness: GatewayHarness) {
    harness
        .registry
        .fail_discovery(&server_name("notes"), Some("still starting".to_owned()))
        .expect("failure setup should succeed");
    harness.bring_up().await;
    assert!(harness.cache.get("notes").is_none());
    harness
        .registry
        .fail_discovery(&server_name("notes"), None)
        .expect("recovery setup should succeed");

    let tools = harness
        .dispatch()
        .list_tools("notes")
        .await
        .expect("tools after on-demand refresh");

    assert_eq!(tool_names(tools.tools()), ["echo", "append"]);
}

#[rstest]
#[tokio::test]
async fn cached_tools_are_served_until_refreshed(harness: GatewayHarness) {
    harness.bring_up().await;
    harness
        .registry
        .set_tool_catalog(&server_name("notes"), vec![tool("archive")])
        .expect("catalog update should succeed");

    let tools = harness
        .dispatch()
        .list_tools("notes")
        .await
        .expect("cached tools");

    assert_eq!(tool_names(tools.tools()), ["echo", "append"]);
}

#[rstest]
#[tokio::test]
async fn empty_tool_list_is_not_a_success(harness: GatewayHarness) {
    harness
        .registry
        .set_tool_catalog(&server_name("notes"), Vec::new())
        .expect("catalog update should succeed");
    harness.bring_up().await;

    let result = harness.dispatch().list_tools("notes").await;

    assert!(matches!(
        result,
        Err(DispatchError::NoToolsAvailable { server }) if server == "notes"
    ));
}

#[rstest]
#[tokio::test]
async fn server_listing_covers_every_configured_server(harness: GatewayHarness) {
    harness.bring_up().await;

    let servers = harness.dispatch().list_servers();

    let names: Vec<_> = servers.iter().map(|summary| summary.name.as_str()).collect();
    assert_eq!(names, ["broken", "notes"]);
    let cached: Vec<_> = servers.iter().map(|summary| summary.cached_tools).collect();
    assert_eq!(cached, [None, Some(2)]);
}
