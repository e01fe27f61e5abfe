//! Multi-blockchain RPC load balancer core.
//!
//! Maintains a pool of upstream JSON-RPC endpoints per network, ranks them by
//! freshness and latency, dispatches calls to the best endpoint, and
//! transparently fails over on error. See [`RpcLoadBalancer`] for the
//! composition root.

pub mod adapters;
pub mod balancer;
pub mod bootstrap;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod jsonrpc;
pub mod network;
pub mod probe;
pub mod registry;
pub mod scheduler;
pub mod selection;
pub mod transport;

pub use balancer::RpcLoadBalancer;
pub use config::{BalancerConfig, ConfigNode};
pub use errors::{Error, Result};
pub use network::Network;
pub use registry::NodeKind;
