//! Integration tests for startup bring-up.

use std::time::Duration;

use mcp_gateway::gateway::{
    adapters::ObservedCall,
    domain::{BackendOperation, ServerDescriptor, TransportKind},
    ports::ConnectionRegistry,
    services::{BringUpError, DispatchError, ToolCacheError},
};

use super::helpers::{GatewayHarness, server_name, tool_names};

#[tokio::test]
async fn healthy_servers_survive_failed_neighbours() {
    let harness = GatewayHarness::with_servers(&["alpha", "beta", "gamma", "delta"]);
    harness.offer_tools("alpha", &["search"]);
    harness.offer_tools("gamma", &["read", "write"]);
    harness.fail_to_start("beta");
    harness.fail_to_start("delta");

    let report = harness.bring_up().await;

    let mut connected: Vec<_> = report.connected().map(|name| name.as_str()).collect();
    connected.sort_unstable();
    assert_eq!(connected, ["alpha", "gamma"]);

    let dispatch = harness.dispatch();
    let alpha = dispatch.list_tools("alpha").await.expect("alpha tools");
    let gamma = dispatch.list_tools("gamma").await.expect("gamma tools");
    assert_eq!(tool_names(alpha.tools()), ["search"]);
    assert_eq!(tool_names(gamma.tools()), ["read", "write"]);

    for failed in ["beta", "delta"] {
        let result = dispatch.list_tools(failed).await;
        assert!(matches!(
            result,
            Err(DispatchError::ServerUnavailable {
                source: ToolCacheError::UnknownServer(_),
                ..
            })
        ));
    }
}

#[tokio::test(start_paused = true)]
async fn slow_registration_batch_is_fatal() {
    let harness = GatewayHarness::with_servers(&["alpha", "slowpoke"]);
    harness
        .registry
        .set_latency(
            &server_name("slowpoke"),
            BackendOperation::Register,
            Duration::from_secs(90),
        )
        .expect("latency setup should succeed");

    let result = harness.orchestrator().bring_up(&harness.catalog).await;

    assert_eq!(
        result.err(),
        Some(BringUpError::RegistrationTimeout {
            timeout: Duration::from_secs(60),
        })
    );
    assert!(harness.registry.lookup(&server_name("alpha")).is_none());
}

#[tokio::test(start_paused = true)]
async fn registration_within_deadline_succeeds() {
    let harness = GatewayHarness::with_servers(&["alpha"]);
    harness.offer_tools("alpha", &["search"]);
    harness
        .registry
        .set_latency(
            &server_name("alpha"),
            BackendOperation::Register,
            Duration::from_secs(45),
        )
        .expect("latency setup should succeed");

    let report = harness.bring_up().await;

    assert_eq!(report.connected().count(), 1);
    assert_eq!(report.discovered().count(), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_discovery_only_affects_its_own_server() {
    let harness = GatewayHarness::with_servers(&["alpha", "sluggish"]);
    harness.offer_tools("alpha", &["search"]);
    harness.offer_tools("sluggish", &["crawl"]);
    harness
        .registry
        .set_latency(
            &server_name("sluggish"),
            BackendOperation::ListTools,
            Duration::from_secs(15),
        )
        .expect("latency setup should succeed");

    let report = harness.bring_up().await;

    let sluggish = report
        .discoveries
        .iter()
        .find(|outcome| outcome.server.as_str() == "sluggish")
        .expect("sluggish discovery outcome");
    assert!(matches!(
        &sluggish.result,
        Err(ToolCacheError::Discovery { source, .. }) if source.is_deadline_exceeded()
    ));
    assert!(harness.cache.get("alpha").is_some());
    assert!(harness.cache.get("sluggish").is_none());
}

#[tokio::test]
async fn collaborators_receive_configured_deadlines() {
    let harness = GatewayHarness::with_servers(&["alpha"]);
    harness.offer_tools("alpha", &["search"]);

    harness.bring_up().await;

    let calls = harness
        .registry
        .observed_calls()
        .expect("observed calls should be readable");
    assert_eq!(
        calls,
        [
            ObservedCall {
                server: server_name("alpha"),
                operation: BackendOperation::Register,
                budget: Duration::from_secs(60),
            },
            ObservedCall {
                server: server_name("alpha"),
                operation: BackendOperation::ListTools,
                budget: Duration::from_secs(10),
            },
        ]
    );
}

#[tokio::test]
async fn unsupported_transports_are_skipped() {
    let harness = GatewayHarness::with_descriptors([
        ServerDescriptor::stdio(server_name("alpha"), "mcp-alpha"),
        ServerDescriptor::new(
            server_name("remote"),
            TransportKind::from("sse"),
            "http://localhost:8000/sse",
        ),
    ]);
    harness.offer_tools("alpha", &["search"]);

    let report = harness.bring_up().await;

    let skipped: Vec<_> = report
        .skipped
        .iter()
        .map(|skipped| skipped.server.as_str())
        .collect();
    assert_eq!(skipped, ["remote"]);
    assert_eq!(report.registrations.len(), 1);
    assert_eq!(report.discoveries.len(), 2);
}
