//! Supported chain identifiers and the family each one belongs to.
//!
//! `Network` is deliberately a closed enumeration: adding a new chain means
//! adding a variant here, not accepting an arbitrary string. The family
//! determines which [`StatusCodec`](crate::codec::StatusCodec) probes it and
//! whether it participates in load balancing at all.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use strum::{AsRefStr, Display, EnumString};

/// A supported chain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Network {
    Bitcoin,
    Litecoin,
    Dogecoin,
    Ethereum,
    Polygon,
    Bsc,
    Tron,
    Xrp,
    Solana,
    Tezos,
}

/// The chain family a [`Network`] belongs to. The family is what actually
/// decides codec and load-balancing eligibility, not the network itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFamily {
    Utxo,
    Evm,
    Tron,
    /// No Status Payload Codec exists; must not reach the probe.
    Unsupported,
}

impl Network {
    pub fn family(&self) -> NetworkFamily {
        match self {
            Network::Bitcoin | Network::Litecoin | Network::Dogecoin => NetworkFamily::Utxo,
            Network::Ethereum | Network::Polygon | Network::Bsc => NetworkFamily::Evm,
            Network::Tron => NetworkFamily::Tron,
            Network::Xrp | Network::Solana | Network::Tezos => NetworkFamily::Unsupported,
        }
    }

    /// The path segment used in the remote manifest URL, e.g.
    /// `https://rpc.tatum.io/{segment}/list.json`.
    ///
    /// Falls back to the network's own kebab-case name when no override is
    /// registered in [`MAPPED_NETWORKS`].
    pub fn manifest_segment(&self) -> &'static str {
        MAPPED_NETWORKS.get(self).copied().unwrap_or_else(|| {
            // `strum`'s AsRefStr leaks a 'static str for unit variants.
            Box::leak(self.as_ref().to_string().into_boxed_str())
        })
    }
}

/// Static overrides for networks whose manifest path segment does not match
/// their `Display`/`AsRefStr` slug.
static MAPPED_NETWORKS: Lazy<HashMap<Network, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(Network::Ethereum, "ethereum-mainnet");
    m.insert(Network::Bsc, "bsc-mainnet");
    m
});
