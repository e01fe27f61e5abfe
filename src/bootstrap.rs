//! Bootstrap: populates the [`Registry`] exactly once, either from
//! caller-supplied nodes (static mode, trusted) or from Tatum's remote
//! manifest (remote mode, SSRF-filtered).

use crate::config::{BalancerConfig, ConfigNode};
use crate::registry::{ActiveEndpoint, Endpoint, NodeKind, Registry};
use crate::transport::HttpTransport;
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, trace, warn};
use url::Url;

/// One node as returned by the remote manifest.
#[derive(Debug, Deserialize)]
struct ManifestNode {
    url: String,
    #[serde(rename = "type")]
    node_type: String,
}

impl ManifestNode {
    fn kind(&self) -> Option<NodeKind> {
        match self.node_type.as_str() {
            "normal" => Some(NodeKind::Normal),
            "archive" => Some(NodeKind::Archive),
            _ => None,
        }
    }
}

/// Allow-list check: the URL's host must end in `rpc.tatum.io`.
pub fn passes_ssrf_check(url: &Url) -> bool {
    match url.host_str() {
        Some(host) => host == "rpc.tatum.io" || host.ends_with(".rpc.tatum.io"),
        None => false,
    }
}

/// Populate `registry` per `config`. Idempotence is enforced by the caller
/// (`RpcLoadBalancer::init` rejects a second call outright).
pub async fn run(registry: &Registry, config: &BalancerConfig, transport: &HttpTransport) {
    match &config.nodes {
        Some(nodes) => bootstrap_static(registry, nodes, config.verbose),
        None => bootstrap_remote(registry, config, transport).await,
    }

    for kind in NodeKind::ALL {
        seed_random_active(registry, kind);
    }
}

/// Static mode: the caller's list is trusted, the SSRF check is bypassed
/// entirely. An empty supplied list leaves the registry empty for that run;
/// subsequent calls fail at dispatch time, not here.
fn bootstrap_static(registry: &Registry, nodes: &[ConfigNode], verbose: bool) {
    for node in nodes {
        if verbose {
            debug!(url = %node.url, kind = ?node.kind, "bootstrap: static node");
        }
        registry.push(Endpoint::new(node.url.clone(), node.kind));
    }
}

/// Remote mode: fetch both manifest URLs concurrently, merge their nodes,
/// SSRF-filter, then bucket each surviving node into the list matching its
/// own `type` field — not the manifest URL it happened to arrive from. A
/// manifest fetch failure is logged and non-fatal provided the other
/// manifest still yields endpoints.
async fn bootstrap_remote(registry: &Registry, config: &BalancerConfig, transport: &HttpTransport) {
    let segment = config.network.manifest_segment();
    let normal_url = format!("https://rpc.tatum.io/{segment}/list.json");
    let archive_url = format!("https://rpc.tatum.io/{segment}-archive/list.json");

    let (normal_result, archive_result) = tokio::join!(
        fetch_manifest(transport, &normal_url),
        fetch_manifest(transport, &archive_url),
    );

    let mut nodes = Vec::new();
    match normal_result {
        Ok(mut n) => nodes.append(&mut n),
        Err(err) => warn!(url = %normal_url, %err, "bootstrap: manifest fetch failed"),
    }
    match archive_result {
        Ok(mut n) => nodes.append(&mut n),
        Err(err) => warn!(url = %archive_url, %err, "bootstrap: manifest fetch failed"),
    }

    for node in nodes {
        let Ok(url) = Url::parse(&node.url) else {
            warn!(url = %node.url, "bootstrap: unparseable manifest url, dropping");
            continue;
        };
        if !passes_ssrf_check(&url) {
            warn!(url = %url, "bootstrap: url failed ssrf allow-list, dropping");
            continue;
        }
        let Some(kind) = node.kind() else {
            warn!(node_type = %node.node_type, "bootstrap: unknown node type, dropping");
            continue;
        };
        if config.verbose {
            trace!(%url, ?kind, "bootstrap: remote node admitted");
        }
        registry.push(Endpoint::new(url, kind));
    }
}

async fn fetch_manifest(
    transport: &HttpTransport,
    url: &str,
) -> Result<Vec<ManifestNode>, anyhow::Error> {
    let url = Url::parse(url)?;
    let body = transport.get_json(&url, None).await?;
    let nodes: Vec<ManifestNode> = serde_json::from_value(body)?;
    Ok(nodes)
}

/// Pick a uniformly random initial active index for `kind`, if it has any
/// endpoints. Genuine randomness (not a deterministic hash of the URL list)
/// spreads initial load across concurrent client instances.
fn seed_random_active(registry: &Registry, kind: NodeKind) {
    let len = registry.len(kind);
    if len == 0 {
        return;
    }
    let index = rand::thread_rng().gen_range(0..len);
    let url = registry.snapshot(kind)[index].url.clone();
    registry.set_active(kind, Some(ActiveEndpoint { url, index }));
}
