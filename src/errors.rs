//! The crate's single error type.
//!
//! One variant per distinguishable failure mode, built with `derive_more`:
//! `#[error(ignore)]` on variants whose inner type doesn't itself implement
//! `std::error::Error`.

use crate::network::Network;
use derive_more::{Display, Error, From};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// `network`'s family has no Status Payload Codec. Raised eagerly during
    /// probing; such networks must not be routed through the balancer.
    #[display(fmt = "network {} has no status payload codec", network)]
    #[error(ignore)]
    #[from(ignore)]
    UnsupportedNetwork { network: Network },

    /// No endpoint of either kind is usable.
    #[display(fmt = "no active node for either node kind")]
    NoActiveNode,

    /// Dispatcher exhausted every endpoint via failover.
    #[display(fmt = "all nodes unavailable: {}", last_error)]
    #[error(ignore)]
    #[from(ignore)]
    AllNodesUnavailable { last_error: String },

    /// A remote-manifest URL failed the SSRF allow-list check.
    #[display(fmt = "url {} failed the ssrf allow-list check", host)]
    #[error(ignore)]
    #[from(ignore)]
    Ssrf { host: String },

    /// Both kinds ended up empty after Bootstrap ran.
    #[display(fmt = "bootstrap failed: {}", _0)]
    #[error(ignore)]
    #[from(ignore)]
    Bootstrap(String),

    /// A second call to `init` on an already-initialized balancer.
    #[display(fmt = "balancer is already initialized")]
    AlreadyInitialized,

    /// Transport-level failure talking to an endpoint.
    Transport(reqwest::Error),

    /// A response arrived but with a non-2xx status code.
    #[display(fmt = "http status {}", _0)]
    #[error(ignore)]
    #[from(ignore)]
    HttpStatus(u16),

    /// A configured or manifest-supplied URL did not parse.
    InvalidUrl(url::ParseError),

    /// A probe or dispatch response body was not valid JSON.
    Json(serde_json::Error),
}
