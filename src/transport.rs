//! Thin wrapper around a single shared `reqwest::Client`, pre-configured
//! with the SDK's identifying headers.
//!
//! One client, built once at construction time, reused for every outbound
//! call instead of building a new client per request.

use crate::errors::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::time::{Duration, Instant};
use url::Url;

/// The outcome of one Status Probe request, distinguishing "a response
/// arrived" (even a bad one) from "nothing came back" (timeout or
/// transport-level failure) — `last_response_time` is only updated by the
/// caller in the former case.
pub enum ProbeResponse {
    Arrived {
        elapsed_ms: u64,
        status_ok: bool,
        json: Option<Value>,
    },
    NoResponse,
}

const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
const SDK_PRODUCT: &str = "rust-sdk";

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(api_key: Option<&str>, verbose: bool) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-ttm-sdk-version"),
            HeaderValue::from_static(SDK_VERSION),
        );
        headers.insert(
            HeaderName::from_static("x-ttm-sdk-product"),
            HeaderValue::from_static(SDK_PRODUCT),
        );
        headers.insert(
            HeaderName::from_static("x-ttm-sdk-debug"),
            HeaderValue::from_static(if verbose { "1" } else { "0" }),
        );
        if let Some(key) = api_key {
            if let Ok(value) = HeaderValue::from_str(key) {
                headers.insert(HeaderName::from_static("x-api-key"), value);
            }
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("building the shared http client must not fail");

        Self { client }
    }

    /// POST a JSON body, optionally overriding the client's default timeout
    /// (the Status Probe uses this for its 5s abort deadline; the
    /// Dispatcher passes `None` since client RPC calls have no
    /// balancer-level timeout).
    pub async fn post_json(
        &self,
        url: &Url,
        body: &Value,
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let mut req = self.client.post(url.clone()).json(body);
        if let Some(timeout) = timeout {
            req = req.timeout(timeout);
        }

        let response = req.send().await.map_err(Error::Transport)?;
        let status = response.status();
        let body: Value = response.json().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::HttpStatus(status.as_u16()));
        }

        Ok(body)
    }

    /// Issue one probe POST with a hard abort deadline. Never returns an
    /// error: transport failures and timeouts collapse into
    /// `ProbeResponse::NoResponse` so the Status Probe can fold them
    /// straight into a `failed` write without a side channel.
    pub async fn probe(&self, url: &Url, body: &Value, timeout: Duration) -> ProbeResponse {
        let start = Instant::now();
        let sent = self
            .client
            .post(url.clone())
            .json(body)
            .timeout(timeout)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(_) => return ProbeResponse::NoResponse,
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        let status_ok = response.status().is_success();
        let json = response.json::<Value>().await.ok();

        ProbeResponse::Arrived {
            elapsed_ms,
            status_ok,
            json,
        }
    }

    pub async fn get_json(&self, url: &Url, timeout: Option<Duration>) -> Result<Value> {
        let mut req = self.client.get(url.clone());
        if let Some(timeout) = timeout {
            req = req.timeout(timeout);
        }

        let response = req.send().await.map_err(Error::Transport)?;
        let status = response.status();
        let body: Value = response.json().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::HttpStatus(status.as_u16()));
        }

        Ok(body)
    }
}
