//! The composition root: `RpcLoadBalancer` owns the registry, the HTTP
//! transport, and the scheduler, and exposes the public Dispatcher
//! operations — one struct gluing the components together, taking its
//! configuration by value instead of reaching into a process-wide DI
//! container, so that multiple concurrent instances never share state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::bootstrap;
use crate::config::BalancerConfig;
use crate::dispatcher;
use crate::errors::{Error, Result};
use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use crate::network::Network;
use crate::probe;
use crate::registry::Registry;
use crate::scheduler::{Scheduler, ShutdownFlag};
use crate::transport::HttpTransport;

pub struct RpcLoadBalancer {
    config: BalancerConfig,
    registry: Registry,
    transport: HttpTransport,
    scheduler: Scheduler,
    shutdown: ShutdownFlag,
    initialized: AtomicBool,
}

impl RpcLoadBalancer {
    pub fn new(config: BalancerConfig) -> Arc<Self> {
        let transport = HttpTransport::new(config.api_key.as_deref(), config.verbose);
        Arc::new(Self {
            config,
            registry: Registry::new(),
            transport,
            scheduler: Scheduler::new(),
            shutdown: ShutdownFlag::new(),
            initialized: AtomicBool::new(false),
        })
    }

    pub fn network(&self) -> Network {
        self.config.network
    }

    /// Populate the registry (Bootstrap) and either run one synchronous
    /// probe pass (`one_time_load_balancing`) or install the periodic
    /// timer. A second call on an already-initialized instance is rejected
    /// rather than silently repeating Bootstrap.
    pub async fn init(self: &Arc<Self>) -> Result<()> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyInitialized);
        }

        bootstrap::run(&self.registry, &self.config, &self.transport).await;

        if self.config.one_time_load_balancing {
            self.run_probe_pass().await
        } else {
            self.spawn_periodic_probe();
            Ok(())
        }
    }

    /// Cancel the pending timer handle. In-flight probe requests are not
    /// individually aborted; their writes landing in the registry afterward
    /// is harmless because they never resurrect scheduling themselves.
    pub fn destroy(&self) {
        self.shutdown.shutdown();
        self.scheduler.destroy();
        info!("balancer destroyed");
    }

    pub async fn raw_rpc_call(&self, request: JsonRpcRequest, archive: bool) -> Result<JsonRpcResponse> {
        dispatcher::raw_rpc_call(
            &self.registry,
            &self.transport,
            self.config.allowed_blocks_behind,
            request,
            archive,
            self.config.verbose,
        )
        .await
    }

    /// Always resolves archive-first, regardless of the caller's intent —
    /// batch calls may reference historical state.
    pub async fn raw_batch_rpc_call(&self, requests: Vec<JsonRpcRequest>) -> Result<JsonRpcResponse> {
        dispatcher::raw_batch_rpc_call(
            &self.registry,
            &self.transport,
            self.config.allowed_blocks_behind,
            requests,
            self.config.verbose,
        )
        .await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value> {
        dispatcher::post(&self.registry, &self.transport, path, body, self.config.verbose).await
    }

    async fn run_probe_pass(&self) -> Result<()> {
        probe::run_pass(
            &self.registry,
            self.config.network,
            &self.transport,
            self.config.allowed_blocks_behind,
            self.config.verbose,
        )
        .await
    }

    fn spawn_periodic_probe(self: &Arc<Self>) {
        let this = Arc::clone(self);
        self.scheduler.schedule(Self::run_and_reschedule(this));
    }

    async fn run_and_reschedule(self: Arc<Self>) {
        if self.shutdown.is_shutdown() {
            return;
        }

        if let Err(err) = self.run_probe_pass().await {
            if self.config.verbose {
                tracing::warn!(%err, "periodic probe pass failed");
            }
        }

        if self.shutdown.is_shutdown() {
            return;
        }

        self.spawn_periodic_probe();
    }
}
