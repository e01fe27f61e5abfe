//! Typed façade adapters live outside this crate: each chain family's
//! adapter is a thin, stateless wrapper around
//! [`RpcLoadBalancer::raw_rpc_call`] that the SDK's adapter-selection table
//! dispatches to. `GenericRpc` below is kept only to prove the contract is
//! usable from exactly that kind of thin wrapper — it is not a supported
//! public surface beyond what the core itself exports.

mod generic;

pub use generic::GenericRpc;
