//! Status Probe: one health-check pass per tick.
//!
//! Kinds run sequentially (NORMAL then ARCHIVE); endpoints within a kind run
//! concurrently and the pass waits for all of them to settle via
//! `join_all` — a probe future never propagates an error to the aggregator,
//! a "wait for all, never reject" composition.

use crate::codec::StatusCodec;
use crate::errors::{Error, Result};
use crate::network::Network;
use crate::registry::{NodeKind, Registry};
use crate::transport::{HttpTransport, ProbeResponse};
use futures::future::join_all;
use std::time::Duration;
use tracing::trace;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Run one complete pass across both kinds and reselect each kind's active
/// endpoint. Returns `Err(Error::NoActiveNode)` if neither kind has an
/// active endpoint once the pass completes.
pub async fn run_pass(
    registry: &Registry,
    network: Network,
    transport: &HttpTransport,
    allowed_blocks_behind: i64,
    verbose: bool,
) -> Result<()> {
    let codec = crate::codec::codec_for(network)?;

    for kind in NodeKind::ALL {
        probe_kind(registry, kind, codec, transport, verbose).await;
        registry.reselect(kind, allowed_blocks_behind);
    }

    if registry.active(NodeKind::Normal).is_none() && registry.active(NodeKind::Archive).is_none()
    {
        return Err(Error::NoActiveNode);
    }

    Ok(())
}

async fn probe_kind(
    registry: &Registry,
    kind: NodeKind,
    codec: &dyn StatusCodec,
    transport: &HttpTransport,
    verbose: bool,
) {
    let snapshot = registry.snapshot(kind);
    if snapshot.is_empty() {
        return;
    }

    let request_body = codec.probe_request();
    let probes = snapshot.iter().enumerate().map(|(index, endpoint)| {
        let url = endpoint.url.clone();
        let request_body = request_body.clone();
        async move {
            let response = transport.probe(&url, &request_body, PROBE_TIMEOUT).await;
            (index, url, response)
        }
    });

    let results = join_all(probes).await;

    for (index, url, response) in results {
        match response {
            ProbeResponse::Arrived {
                elapsed_ms,
                status_ok,
                json,
            } => {
                let height = status_ok
                    .then(|| json.as_ref().map(|body| codec.decode_height(body)))
                    .flatten();

                match height {
                    Some(height) if height >= 0 => {
                        if verbose {
                            trace!(%url, ?kind, height, elapsed_ms, "probe: success");
                        }
                        registry.record_probe(kind, index, height as u64, elapsed_ms, false);
                    }
                    _ => {
                        if verbose {
                            trace!(%url, ?kind, status_ok, elapsed_ms, "probe: bad response");
                        }
                        registry.record_probe(kind, index, 0, elapsed_ms, true);
                    }
                }
            }
            ProbeResponse::NoResponse => {
                if verbose {
                    trace!(%url, ?kind, "probe: no response (timeout or transport error)");
                }
                registry.record_probe(kind, index, 0, 0, true);
            }
        }
    }
}
