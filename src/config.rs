//! Balancer configuration, read once at bootstrap.
//!
//! An explicit struct passed to the constructor — no process-wide registry,
//! no environment variable reads. API keys and verbosity arrive here as
//! plain fields instead.

use crate::network::Network;
use crate::registry::NodeKind;
use url::Url;

/// A caller-supplied endpoint for static-mode Bootstrap.
#[derive(Debug, Clone)]
pub struct ConfigNode {
    pub url: Url,
    pub kind: NodeKind,
}

impl ConfigNode {
    pub fn new(url: Url, kind: NodeKind) -> Self {
        Self { url, kind }
    }
}

#[derive(Debug, Clone)]
pub struct BalancerConfig {
    /// Caller-supplied endpoint list. If present, static mode runs and the
    /// remote manifest fetch is skipped entirely.
    pub nodes: Option<Vec<ConfigNode>>,
    /// Tolerance window used by the Selection Policy.
    pub allowed_blocks_behind: i64,
    /// If set, `init` runs exactly one probe pass and never installs the
    /// periodic timer.
    pub one_time_load_balancing: bool,
    /// Selects the manifest URLs and the Status Payload Codec.
    pub network: Network,
    /// Enables diagnostic logging of errors that are otherwise recovered
    /// locally by failover.
    pub verbose: bool,
    /// Optional API key attached to probe requests as `x-api-key`.
    pub api_key: Option<String>,
}

impl BalancerConfig {
    pub fn new(network: Network) -> Self {
        Self {
            nodes: None,
            allowed_blocks_behind: 0,
            one_time_load_balancing: false,
            network,
            verbose: false,
            api_key: None,
        }
    }

    pub fn with_nodes(mut self, nodes: Vec<ConfigNode>) -> Self {
        self.nodes = Some(nodes);
        self
    }

    pub fn with_allowed_blocks_behind(mut self, allowed: i64) -> Self {
        self.allowed_blocks_behind = allowed;
        self
    }

    pub fn with_one_time_load_balancing(mut self, one_time: bool) -> Self {
        self.one_time_load_balancing = one_time;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}
