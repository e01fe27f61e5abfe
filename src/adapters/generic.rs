use std::sync::Arc;

use serde_json::Value;

use crate::balancer::RpcLoadBalancer;
use crate::errors::Result;
use crate::jsonrpc::JsonRpcRequest;

/// Catch-all adapter: serializes `method`/`params` and delegates to
/// `rawRpcCall`, casting nothing. Holds no state beyond a reference to the
/// balancer.
pub struct GenericRpc {
    balancer: Arc<RpcLoadBalancer>,
}

impl GenericRpc {
    pub fn new(balancer: Arc<RpcLoadBalancer>) -> Self {
        Self { balancer }
    }

    pub async fn call(&self, method: &str, params: Value, archive: bool) -> Result<Value> {
        let request = JsonRpcRequest::new(method, params);
        self.balancer.raw_rpc_call(request, archive).await
    }
}
