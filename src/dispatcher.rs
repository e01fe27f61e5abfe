//! Dispatcher: resolves the active URL (with cross-kind fallback), forwards
//! calls to the HTTP transport, and fails over on error.
//!
//! The retry here is an explicit bounded loop rather than recursion, capped
//! at the total endpoint count across both kinds — the observable contract
//! (retry until both pools are exhausted) is unchanged, only the
//! stack-growth behavior is fixed.

use crate::errors::{Error, Result};
use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use crate::registry::{NodeKind, Registry};
use crate::transport::HttpTransport;
use serde_json::Value;
use tracing::warn;
use url::Url;

/// Which kind's active endpoint to try first, and the fallback kind if it
/// has none. `rawRpcCall` uses `archive` as given; `rawBatchRpcCall` always
/// passes `true` regardless of caller intent, preserved deliberately since
/// batch calls may reference historical state.
fn resolve_url(registry: &Registry, archive_first: bool) -> Option<(NodeKind, Url)> {
    let primary = if archive_first {
        NodeKind::Archive
    } else {
        NodeKind::Normal
    };
    let secondary = primary.other();

    if let Some(active) = registry.active(primary) {
        return Some((primary, active.url));
    }
    if let Some(active) = registry.active(secondary) {
        return Some((secondary, active.url));
    }
    None
}

async fn dispatch_with_retry(
    registry: &Registry,
    transport: &HttpTransport,
    allowed_blocks_behind: i64,
    body: &Value,
    archive_first: bool,
    verbose: bool,
) -> Result<JsonRpcResponse> {
    let attempts = registry.total_endpoints().max(1);
    let mut last_error: Option<String> = None;

    for _ in 0..=attempts {
        // A `None` here can mean two different things depending on whether
        // we've already failed an attempt: on the very first resolution it's
        // "neither kind ever had an active endpoint" (NoActiveNode); on a
        // retry it's "both kinds are now exhausted" (AllNodesUnavailable).
        let Some((kind, url)) = resolve_url(registry, archive_first) else {
            return match last_error {
                Some(last_error) => Err(Error::AllNodesUnavailable { last_error }),
                None => Err(Error::NoActiveNode),
            };
        };

        match transport.post_json(&url, body, None).await {
            Ok(response) => return Ok(response),
            Err(err) => {
                if verbose {
                    warn!(%url, ?kind, %err, "dispatcher: call failed, failing over");
                }
                last_error = Some(err.to_string());

                registry.mark_active_failed(kind);
                registry.reselect(kind, allowed_blocks_behind);
                // Don't give up just because `kind`'s own pool is now
                // exhausted: the next `resolve_url` call falls back to the
                // other kind on its own, and only returns `None` once both
                // are exhausted.
            }
        }
    }

    Err(Error::AllNodesUnavailable {
        last_error: last_error.unwrap_or_else(|| "retries exhausted".to_string()),
    })
}

/// `rawRpcCall`: resolve NORMAL-first (or ARCHIVE-first when `archive` is
/// set), POST, retry with failover until the call succeeds or both pools
/// are exhausted.
pub async fn raw_rpc_call(
    registry: &Registry,
    transport: &HttpTransport,
    allowed_blocks_behind: i64,
    request: JsonRpcRequest,
    archive: bool,
    verbose: bool,
) -> Result<JsonRpcResponse> {
    let body = serde_json::to_value(&request)?;
    dispatch_with_retry(
        registry,
        transport,
        allowed_blocks_behind,
        &body,
        archive,
        verbose,
    )
    .await
}

/// `rawBatchRpcCall`: identical retry semantics, but always resolves
/// ARCHIVE-first since batch calls may reference historical state,
/// regardless of what the caller asked for.
pub async fn raw_batch_rpc_call(
    registry: &Registry,
    transport: &HttpTransport,
    allowed_blocks_behind: i64,
    requests: Vec<JsonRpcRequest>,
    verbose: bool,
) -> Result<JsonRpcResponse> {
    let body = serde_json::to_value(&requests)?;
    dispatch_with_retry(
        registry,
        transport,
        allowed_blocks_behind,
        &body,
        true,
        verbose,
    )
    .await
}

/// `post`: plain HTTP POST to `activeNormalUrl + path`, used by non-RPC
/// chain endpoints (Tron's HTTP API, Solana's JSON REST surface). No retry,
/// no failover — on error this logs (verbose-gated) and propagates.
pub async fn post(
    registry: &Registry,
    transport: &HttpTransport,
    path: &str,
    body: Value,
    verbose: bool,
) -> Result<Value> {
    let active = registry
        .active(NodeKind::Normal)
        .ok_or(Error::NoActiveNode)?;
    let url = Url::parse(&format!("{}{}", active.url, path))?;

    transport.post_json(&url, &body, None).await.map_err(|err| {
        if verbose {
            warn!(%url, %err, "dispatcher: post failed");
        }
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ActiveEndpoint, Endpoint};
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn url(server: &MockServer) -> Url {
        Url::parse(&server.uri()).unwrap()
    }

    async fn make_server_with_status(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": "ok",
            })))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn basic_failover_retries_against_the_surviving_endpoint() {
        // scenario 1
        let dead = MockServer::start().await;
        // no mock registered: any request gets a 404 from wiremock
        let alive = make_server_with_status(200).await;

        let registry = Registry::new();
        registry.push(Endpoint::new(url(&dead), NodeKind::Normal));
        registry.push(Endpoint::new(url(&alive), NodeKind::Normal));
        registry.set_active(
            NodeKind::Normal,
            Some(ActiveEndpoint {
                url: url(&dead),
                index: 0,
            }),
        );
        // seed heights so reselect after failure has a clear winner
        registry.record_probe(NodeKind::Normal, 0, 100, 50, false);
        registry.record_probe(NodeKind::Normal, 1, 100, 200, false);

        let transport = HttpTransport::new(None, false);
        let request = JsonRpcRequest::new("eth_blockNumber", json!([]));

        let response = raw_rpc_call(&registry, &transport, 5, request, false, false)
            .await
            .unwrap();
        assert_eq!(response["result"], "ok");

        let snapshot = registry.snapshot(NodeKind::Normal);
        assert!(snapshot[0].failed);
        assert_eq!(registry.active(NodeKind::Normal).unwrap().url, url(&alive));
    }

    #[tokio::test]
    async fn archive_fallback_when_normal_is_empty() {
        // scenario 2
        let archive_server = make_server_with_status(200).await;

        let registry = Registry::new();
        registry.push(Endpoint::new(url(&archive_server), NodeKind::Archive));
        registry.set_active(
            NodeKind::Archive,
            Some(ActiveEndpoint {
                url: url(&archive_server),
                index: 0,
            }),
        );

        let transport = HttpTransport::new(None, false);
        let request = JsonRpcRequest::new("eth_blockNumber", json!([]));

        let response = raw_rpc_call(&registry, &transport, 5, request, false, false)
            .await
            .unwrap();
        assert_eq!(response["result"], "ok");
    }

    #[tokio::test]
    async fn total_exhaustion_raises_all_nodes_unavailable() {
        // scenario 6
        let registry = Registry::new();
        registry.push(Endpoint::new(
            Url::parse("https://dead.example/").unwrap(),
            NodeKind::Normal,
        ));
        registry.record_probe(NodeKind::Normal, 0, 100, 10, true);
        registry.set_active(
            NodeKind::Normal,
            Some(ActiveEndpoint {
                url: Url::parse("https://dead.example/").unwrap(),
                index: 0,
            }),
        );

        let transport = HttpTransport::new(None, false);
        let request = JsonRpcRequest::new("eth_blockNumber", json!([]));

        let err = raw_rpc_call(&registry, &transport, 5, request, false, false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AllNodesUnavailable { .. }));
    }

    #[tokio::test]
    async fn normal_pool_exhaustion_falls_back_to_archive() {
        // NORMAL has exactly one (dying) endpoint; ARCHIVE has a healthy
        // one. A NORMAL call should fail over to ARCHIVE rather than
        // raising AllNodesUnavailable as soon as NORMAL alone is exhausted.
        let dead = MockServer::start().await;
        let archive_alive = make_server_with_status(200).await;

        let registry = Registry::new();
        registry.push(Endpoint::new(url(&dead), NodeKind::Normal));
        registry.push(Endpoint::new(url(&archive_alive), NodeKind::Archive));
        registry.set_active(
            NodeKind::Normal,
            Some(ActiveEndpoint {
                url: url(&dead),
                index: 0,
            }),
        );
        registry.set_active(
            NodeKind::Archive,
            Some(ActiveEndpoint {
                url: url(&archive_alive),
                index: 0,
            }),
        );

        let transport = HttpTransport::new(None, false);
        let request = JsonRpcRequest::new("eth_blockNumber", json!([]));

        let response = raw_rpc_call(&registry, &transport, 5, request, false, false)
            .await
            .unwrap();
        assert_eq!(response["result"], "ok");
        assert!(registry.active(NodeKind::Normal).is_none());
    }

    #[tokio::test]
    async fn batch_call_always_resolves_archive_first() {
        let normal_server = make_server_with_status(200).await;
        let archive_server = make_server_with_status(200).await;

        let registry = Registry::new();
        registry.push(Endpoint::new(url(&normal_server), NodeKind::Normal));
        registry.push(Endpoint::new(url(&archive_server), NodeKind::Archive));
        registry.set_active(
            NodeKind::Normal,
            Some(ActiveEndpoint {
                url: url(&normal_server),
                index: 0,
            }),
        );
        registry.set_active(
            NodeKind::Archive,
            Some(ActiveEndpoint {
                url: url(&archive_server),
                index: 0,
            }),
        );

        let transport = HttpTransport::new(None, false);
        let requests = vec![JsonRpcRequest::new("eth_blockNumber", json!([]))];

        // both pools are healthy; archive-first resolution means the
        // archive server is the one actually hit.
        raw_batch_rpc_call(&registry, &transport, 5, requests, false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn no_active_node_when_both_kinds_empty() {
        let registry = Registry::new();
        let transport = HttpTransport::new(None, false);
        let request = JsonRpcRequest::new("eth_blockNumber", json!([]));

        let err = raw_rpc_call(&registry, &transport, 5, request, false, false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoActiveNode));
    }
}
