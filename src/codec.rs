//! Status Payload Codec: per-network-family probe request encoding and
//! response height decoding.

use crate::errors::{Error, Result};
use crate::network::{Network, NetworkFamily};
use serde_json::{json, Value};

/// Encodes a probe request body and decodes a probe response's chain height.
pub trait StatusCodec: Send + Sync {
    fn probe_request(&self) -> Value;

    /// `-1` is the sentinel for "no usable height": returned if `result` is
    /// absent or falsy.
    fn decode_height(&self, body: &Value) -> i64 {
        match body.get("result") {
            None => -1,
            Some(result) => decode_result_height(result),
        }
    }
}

fn decode_result_height(result: &Value) -> i64 {
    if is_falsy(result) {
        return -1;
    }
    match result {
        Value::Number(n) => n.as_i64().unwrap_or(-1),
        Value::String(s) => parse_height_str(s).unwrap_or(-1),
        _ => -1,
    }
}

fn is_falsy(v: &Value) -> bool {
    matches!(v, Value::Null | Value::Bool(false))
        || matches!(v, Value::String(s) if s.is_empty())
        || matches!(v, Value::Number(n) if n.as_i64() == Some(0))
}

/// Heights from EVM-family `eth_blockNumber` calls arrive as a `0x`-prefixed
/// hex string; UTXO's `getblockcount` arrives as a plain JSON integer. Accept
/// both shapes in one parser so a codec can be reused for either encoding.
fn parse_height_str(s: &str) -> Option<i64> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

/// UTXO-family: `getblockcount`.
pub struct UtxoCodec;

impl StatusCodec for UtxoCodec {
    fn probe_request(&self) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getblockcount",
            "params": [],
        })
    }
}

/// EVM-family and Tron: `eth_blockNumber`.
pub struct EvmCodec;

impl StatusCodec for EvmCodec {
    fn probe_request(&self) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_blockNumber",
            "params": [],
        })
    }
}

const UTXO_CODEC: UtxoCodec = UtxoCodec;
const EVM_CODEC: EvmCodec = EvmCodec;

/// Looks up the codec for `network`'s family. `NetworkFamily::Unsupported`
/// networks raise `Error::UnsupportedNetwork`; callers must not route them
/// through the probe.
pub fn codec_for(network: Network) -> Result<&'static dyn StatusCodec> {
    match network.family() {
        NetworkFamily::Utxo => Ok(&UTXO_CODEC),
        NetworkFamily::Evm | NetworkFamily::Tron => Ok(&EVM_CODEC),
        NetworkFamily::Unsupported => Err(Error::UnsupportedNetwork { network }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utxo_request_shape() {
        let req = UtxoCodec.probe_request();
        assert_eq!(req["method"], "getblockcount");
    }

    #[test]
    fn evm_request_shape() {
        let req = EvmCodec.probe_request();
        assert_eq!(req["method"], "eth_blockNumber");
    }

    #[test]
    fn decode_missing_result_is_sentinel() {
        let body = json!({});
        assert_eq!(UtxoCodec.decode_height(&body), -1);
    }

    #[test]
    fn decode_falsy_result_is_sentinel() {
        let body = json!({ "result": null });
        assert_eq!(EvmCodec.decode_height(&body), -1);

        let body = json!({ "result": false });
        assert_eq!(EvmCodec.decode_height(&body), -1);
    }

    #[test]
    fn decode_utxo_plain_integer() {
        let body = json!({ "result": 812345 });
        assert_eq!(UtxoCodec.decode_height(&body), 812345);
    }

    #[test]
    fn decode_evm_hex_string() {
        let body = json!({ "result": "0x1234" });
        assert_eq!(EvmCodec.decode_height(&body), 0x1234);
    }

    #[test]
    fn unsupported_network_raises_eagerly() {
        let err = codec_for(Network::Solana).unwrap_err();
        assert!(matches!(err, Error::UnsupportedNetwork { .. }));
    }

    #[test]
    fn tron_shares_the_evm_codec() {
        assert!(codec_for(Network::Tron).is_ok());
        assert_eq!(
            codec_for(Network::Tron).unwrap().probe_request()["method"],
            "eth_blockNumber"
        );
    }
}
