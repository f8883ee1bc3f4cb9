//! HTTP transport for [`PeerRpc`].
//!
//! One shared `reqwest::Client`, explicit per-call timeouts, no retries.
//! Maintenance probes run on the short timeout; anything on a
//! client-visible forward path gets the long one.

use std::time::Duration;

use async_trait::async_trait;

use super::protocol::{
    KeyValue, ENDPOINT_NODE_INFO, ENDPOINT_NOTIFY, ENDPOINT_STORAGE, ENDPOINT_TRANSFER,
    ENDPOINT_UPDATE_PREDECESSOR, ENDPOINT_UPDATE_SUCCESSOR,
};
use super::{PeerRpc, RpcError};
use crate::ring::{NodeAddress, NodeInfo};

const FORWARD_TIMEOUT: Duration = Duration::from_secs(10);
const MAINTENANCE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HttpPeerRpc {
    client: reqwest::Client,
}

impl HttpPeerRpc {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpPeerRpc {
    fn default() -> Self {
        Self::new()
    }
}

fn send_error(err: reqwest::Error) -> RpcError {
    RpcError::Unreachable(err.to_string())
}

fn require_ok(resp: &reqwest::Response) -> Result<(), RpcError> {
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(RpcError::Status(resp.status().as_u16()))
    }
}

#[async_trait]
impl PeerRpc for HttpPeerRpc {
    async fn find_successor(&self, peer: &str, id: u64, hops: u32) -> Result<NodeAddress, RpcError> {
        let url = format!(
            "http://{}{}?successor={}&hops={}",
            peer, ENDPOINT_NODE_INFO, id, hops
        );
        let resp = self
            .client
            .get(url)
            .timeout(FORWARD_TIMEOUT)
            .send()
            .await
            .map_err(send_error)?;
        require_ok(&resp)?;
        resp.json::<NodeAddress>()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))
    }

    async fn node_info(&self, peer: &str) -> Result<NodeInfo, RpcError> {
        let url = format!("http://{}{}", peer, ENDPOINT_NODE_INFO);
        let resp = self
            .client
            .get(url)
            .timeout(MAINTENANCE_TIMEOUT)
            .send()
            .await
            .map_err(send_error)?;
        require_ok(&resp)?;
        resp.json::<NodeInfo>()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))
    }

    async fn notify(&self, peer: &str, from: NodeAddress) -> Result<(), RpcError> {
        let url = format!("http://{}{}", peer, ENDPOINT_NOTIFY);
        let resp = self
            .client
            .post(url)
            .json(&from)
            .timeout(MAINTENANCE_TIMEOUT)
            .send()
            .await
            .map_err(send_error)?;
        require_ok(&resp)
    }

    async fn update_successor(&self, peer: &str, successor: NodeAddress) -> Result<(), RpcError> {
        let url = format!("http://{}{}", peer, ENDPOINT_UPDATE_SUCCESSOR);
        let resp = self
            .client
            .put(url)
            .json(&successor)
            .timeout(MAINTENANCE_TIMEOUT)
            .send()
            .await
            .map_err(send_error)?;
        require_ok(&resp)
    }

    async fn update_predecessor(
        &self,
        peer: &str,
        predecessor: NodeAddress,
    ) -> Result<(), RpcError> {
        let url = format!("http://{}{}", peer, ENDPOINT_UPDATE_PREDECESSOR);
        let resp = self
            .client
            .put(url)
            .json(&predecessor)
            .timeout(MAINTENANCE_TIMEOUT)
            .send()
            .await
            .map_err(send_error)?;
        require_ok(&resp)
    }

    async fn get_value(&self, peer: &str, key: &str, hops: u32) -> Result<Option<String>, RpcError> {
        let url = format!("http://{}{}/{}?hops={}", peer, ENDPOINT_STORAGE, key, hops);
        let resp = self
            .client
            .get(url)
            .timeout(FORWARD_TIMEOUT)
            .send()
            .await
            .map_err(send_error)?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        require_ok(&resp)?;
        let body = resp
            .text()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))?;
        Ok(Some(body))
    }

    async fn put_value(
        &self,
        peer: &str,
        key: &str,
        value: String,
        hops: u32,
    ) -> Result<(), RpcError> {
        let url = format!("http://{}{}/{}?hops={}", peer, ENDPOINT_STORAGE, key, hops);
        let resp = self
            .client
            .put(url)
            .body(value)
            .timeout(FORWARD_TIMEOUT)
            .send()
            .await
            .map_err(send_error)?;
        require_ok(&resp)
    }

    async fn transfer(&self, peer: &str, entries: Vec<KeyValue>) -> Result<(), RpcError> {
        let url = format!("http://{}{}", peer, ENDPOINT_TRANSFER);
        let resp = self
            .client
            .post(url)
            .json(&entries)
            .timeout(MAINTENANCE_TIMEOUT)
            .send()
            .await
            .map_err(send_error)?;
        require_ok(&resp)
    }
}
