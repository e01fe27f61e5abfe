//! The Endpoint Registry: per-[`NodeKind`] endpoint lists plus the currently
//! active selection for each kind.
//!
//! All access is serialized through a single [`parking_lot::RwLock`] around
//! the whole state rather than per-field locks or a `DashMap`. A reader must
//! never see a half-written endpoint record, and `active[kind]` must never
//! be observed as a mismatched `(url, index)` pair — both fall out for free
//! from one lock guarding one snapshot, whereas per-field atomics would need
//! careful ordering to get the same guarantee.

use parking_lot::RwLock;
use serde::Serialize;
use url::Url;

/// NORMAL (recent state) or ARCHIVE (full history) node pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Normal,
    Archive,
}

impl NodeKind {
    pub const ALL: [NodeKind; 2] = [NodeKind::Normal, NodeKind::Archive];

    fn idx(self) -> usize {
        match self {
            NodeKind::Normal => 0,
            NodeKind::Archive => 1,
        }
    }

    /// The other kind, used by the Dispatcher's fallback resolution.
    pub fn other(self) -> NodeKind {
        match self {
            NodeKind::Normal => NodeKind::Archive,
            NodeKind::Archive => NodeKind::Normal,
        }
    }
}

/// One health-tracked JSON-RPC endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Endpoint {
    pub url: Url,
    pub kind: NodeKind,
    /// Last observed chain height. `0` before the first successful probe.
    pub last_block: u64,
    /// Milliseconds of the last probe round-trip. `0` before first probe.
    pub last_response_time_ms: u64,
    /// Set by a failed probe or by the Dispatcher on call error; cleared by
    /// a subsequent successful probe.
    pub failed: bool,
}

impl Endpoint {
    pub fn new(url: Url, kind: NodeKind) -> Self {
        Self {
            url,
            kind,
            last_block: 0,
            last_response_time_ms: 0,
            failed: false,
        }
    }
}

/// The `(url, index)` pair naming the currently active endpoint of a kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEndpoint {
    pub url: Url,
    pub index: usize,
}

#[derive(Debug, Default)]
struct RegistryState {
    endpoints: [Vec<Endpoint>; 2],
    active: [Option<ActiveEndpoint>; 2],
}

/// Per-balancer-instance endpoint registry.
///
/// Populated exactly once by Bootstrap; mutated thereafter only by the
/// Status Probe (per tick) and the Dispatcher (on call failure).
#[derive(Debug, Default)]
pub struct Registry {
    state: RwLock<RegistryState>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
        }
    }

    /// Append an endpoint to `kind`'s list. Only called during Bootstrap;
    /// list order is fixed afterward.
    pub fn push(&self, endpoint: Endpoint) {
        let kind = endpoint.kind;
        self.state.write().endpoints[kind.idx()].push(endpoint);
    }

    /// A cloned snapshot of `kind`'s endpoint list, safe to iterate without
    /// holding the lock (e.g. across `.await` points in the probe pass).
    pub fn snapshot(&self, kind: NodeKind) -> Vec<Endpoint> {
        self.state.read().endpoints[kind.idx()].clone()
    }

    pub fn len(&self, kind: NodeKind) -> usize {
        self.state.read().endpoints[kind.idx()].len()
    }

    pub fn is_empty(&self, kind: NodeKind) -> bool {
        self.len(kind) == 0
    }

    pub fn total_endpoints(&self) -> usize {
        let state = self.state.read();
        state.endpoints[0].len() + state.endpoints[1].len()
    }

    pub fn active(&self, kind: NodeKind) -> Option<ActiveEndpoint> {
        self.state.read().active[kind.idx()].clone()
    }

    /// Atomically replace `kind`'s active selection. `None` clears it.
    pub fn set_active(&self, kind: NodeKind, active: Option<ActiveEndpoint>) {
        self.state.write().active[kind.idx()] = active;
    }

    /// Apply one probe result to the endpoint at `index` within `kind`.
    /// A no-op if `index` is out of range (the endpoint list cannot shrink,
    /// but defend against stale indices from a racing caller anyway).
    pub fn record_probe(
        &self,
        kind: NodeKind,
        index: usize,
        last_block: u64,
        last_response_time_ms: u64,
        failed: bool,
    ) {
        let mut state = self.state.write();
        if let Some(e) = state.endpoints[kind.idx()].get_mut(index) {
            e.failed = failed;
            if !failed {
                e.last_block = last_block;
            }
            // last_response_time is updated whenever a response actually
            // arrived, success or not.
            if last_response_time_ms > 0 {
                e.last_response_time_ms = last_response_time_ms;
            }
        }
    }

    /// Mark the currently active endpoint of `kind` as failed (Dispatcher
    /// retry path). Returns `true` if there was an active endpoint to mark.
    pub fn mark_active_failed(&self, kind: NodeKind) -> bool {
        let mut state = self.state.write();
        let Some(active) = state.active[kind.idx()].clone() else {
            return false;
        };
        if let Some(e) = state.endpoints[kind.idx()].get_mut(active.index) {
            e.failed = true;
        }
        true
    }

    /// Run the Selection Policy against `kind`'s current snapshot and
    /// install the winner (or clear `active[kind]` if none). Returns the
    /// new active endpoint, if any.
    pub fn reselect(&self, kind: NodeKind, allowed_blocks_behind: i64) -> Option<ActiveEndpoint> {
        let mut state = self.state.write();
        let servers = &state.endpoints[kind.idx()];
        let winner = crate::selection::select(servers, allowed_blocks_behind).map(|index| {
            ActiveEndpoint {
                url: servers[index].url.clone(),
                index,
            }
        });
        state.active[kind.idx()] = winner.clone();
        winner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn push_and_snapshot_round_trip() {
        let reg = Registry::new();
        reg.push(Endpoint::new(url("https://a.example/"), NodeKind::Normal));
        reg.push(Endpoint::new(url("https://b.example/"), NodeKind::Normal));
        reg.push(Endpoint::new(url("https://c.example/"), NodeKind::Archive));

        assert_eq!(reg.len(NodeKind::Normal), 2);
        assert_eq!(reg.len(NodeKind::Archive), 1);
        assert_eq!(reg.total_endpoints(), 3);
    }

    #[test]
    fn active_pair_stays_consistent() {
        let reg = Registry::new();
        reg.push(Endpoint::new(url("https://a.example/"), NodeKind::Normal));
        reg.set_active(
            NodeKind::Normal,
            Some(ActiveEndpoint {
                url: url("https://a.example/"),
                index: 0,
            }),
        );

        let active = reg.active(NodeKind::Normal).unwrap();
        let snapshot = reg.snapshot(NodeKind::Normal);
        assert_eq!(snapshot[active.index].url, active.url);
    }

    #[test]
    fn mark_active_failed_flips_the_flag() {
        let reg = Registry::new();
        reg.push(Endpoint::new(url("https://a.example/"), NodeKind::Normal));
        reg.set_active(
            NodeKind::Normal,
            Some(ActiveEndpoint {
                url: url("https://a.example/"),
                index: 0,
            }),
        );

        assert!(reg.mark_active_failed(NodeKind::Normal));
        assert!(reg.snapshot(NodeKind::Normal)[0].failed);
    }

    #[test]
    fn mark_active_failed_with_no_active_is_a_noop() {
        let reg = Registry::new();
        reg.push(Endpoint::new(url("https://a.example/"), NodeKind::Normal));
        assert!(!reg.mark_active_failed(NodeKind::Normal));
    }

    #[test]
    fn reselect_installs_the_winner() {
        let reg = Registry::new();
        reg.push(Endpoint::new(url("https://a.example/"), NodeKind::Normal));
        reg.push(Endpoint::new(url("https://b.example/"), NodeKind::Normal));
        reg.record_probe(NodeKind::Normal, 0, 100, 50, false);
        reg.record_probe(NodeKind::Normal, 1, 110, 200, false);

        let active = reg.reselect(NodeKind::Normal, 5).unwrap();
        assert_eq!(active.url, url("https://b.example/"));
    }

    #[test]
    fn reselect_clears_active_when_all_failed() {
        let reg = Registry::new();
        reg.push(Endpoint::new(url("https://a.example/"), NodeKind::Normal));
        reg.record_probe(NodeKind::Normal, 0, 100, 50, true);

        assert!(reg.reselect(NodeKind::Normal, 5).is_none());
        assert!(reg.active(NodeKind::Normal).is_none());
    }
}
