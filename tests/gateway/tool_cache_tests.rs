//! Integration tests for tool cache refresh semantics.

use std::sync::Arc;
use std::time::Duration;

use mcp_gateway::gateway::{
    domain::BackendOperation,
    services::ToolCacheError,
};
use rstest::{fixture, rstest};

use super::helpers::{GatewayHarness, server_name, tool, tool_names};

#[fixture]
fn harness() -> GatewayHarness {
    let harness = GatewayHarness::with_servers(&["library"]);
    harness.offer_tools("library", &["search", "borrow"]);
    harness
}

#[rstest]
#[tokio::test]
async fn refresh_replaces_entry_with_latest_list(harness: GatewayHarness) {
    harness.bring_up().await;
    harness
        .registry
        .set_tool_catalog(
            &server_name("library"),
            vec![tool("search"), tool("borrow"), tool("renew")],
        )
        .expect("catalog update should succeed");

    let count = harness
        .cache
        .refresh("library", Duration::from_secs(10))
        .await
        .expect("refresh should succeed");

    let entry = harness.cache.get("library").expect("entry should exist");
    assert_eq!(count, 3);
    assert_eq!(tool_names(entry.tools()), ["search", "borrow", "renew"]);
}

#[rstest]
#[tokio::test]
async fn empty_list_is_cached_as_a_real_entry(harness: GatewayHarness) {
    harness.bring_up().await;
    harness
        .registry
        .set_tool_catalog(&server_name("library"), Vec::new())
        .expect("catalog update should succeed");

    harness
        .cache
        .refresh("library", Duration::from_secs(10))
        .await
        .expect("refresh should succeed");

    let entry = harness.cache.get("library").expect("empty entry should exist");
    assert!(entry.is_empty());
}

#[rstest]
#[tokio::test]
async fn failed_refresh_leaves_stale_entry(harness: GatewayHarness) {
    harness.bring_up().await;
    let before = harness.cache.get("library").expect("entry after bring-up");
    harness
        .registry
        .fail_discovery(&server_name("library"), Some("server crashed".to_owned()))
        .expect("failure setup should succeed");

    let result = harness.cache.refresh("library", Duration::from_secs(10)).await;

    assert!(matches!(result, Err(ToolCacheError::Discovery { .. })));
    let after = harness.cache.get("library").expect("entry should survive");
    assert!(Arc::ptr_eq(&before, &after));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn readers_never_observe_a_partial_list(harness: GatewayHarness) {
    harness.bring_up().await;
    harness
        .registry
        .set_tool_catalog(
            &server_name("library"),
            vec![tool("search"), tool("borrow"), tool("renew"), tool("return")],
        )
        .expect("catalog update should succeed");
    harness
        .registry
        .set_latency(
            &server_name("library"),
            BackendOperation::ListTools,
            Duration::from_secs(2),
        )
        .expect("latency setup should succeed");

    let cache = Arc::clone(&harness.cache);
    let refresh =
        tokio::spawn(async move { cache.refresh("library", Duration::from_secs(10)).await });

    let mut observed = Vec::new();
    while !refresh.is_finished() {
        let entry = harness.cache.get("library").expect("entry is never removed");
        observed.push(entry.len());
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
    let count = refresh
        .await
        .expect("refresh task should not panic")
        .expect("refresh should succeed");

    assert_eq!(count, 4);
    assert!(observed.iter().all(|len| *len == 2 || *len == 4));
    assert!(observed.contains(&2));
    let entry = harness.cache.get("library").expect("entry should exist");
    assert_eq!(tool_names(entry.tools()), ["search", "borrow", "renew", "return"]);
}

#[rstest]
#[tokio::test]
async fn unconfigured_names_have_no_entry(harness: GatewayHarness) {
    harness.bring_up().await;

    let result = harness.cache.refresh("archive", Duration::from_secs(10)).await;

    assert!(matches!(result, Err(ToolCacheError::UnknownServer(name)) if name == "archive"));
    assert!(harness.cache.get("archive").is_none());
}
