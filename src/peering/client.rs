//! Registry access for the merge pipeline.
//!
//! # Responsibilities
//! - Typed lookups the merge step needs (exchange, LANs, memberships, network)
//! - HTTP transport against this process or a remote registry mirror
//! - In-process transport straight onto the snapshot cache
//!
//! # Design Decisions
//! - Merge logic only sees the trait, so the transport is swappable
//! - Non-2xx answers from a mirror become `ApiError::Registry`

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};
use crate::registry::{Envelope, Ix, IxLan, Net, NetIxLan, Registry};

/// The merge pipeline's view of the registry.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn exchange_by_name(&self, name: &str) -> ApiResult<Option<Ix>>;

    async fn lans_for_exchange(&self, ix_id: u64) -> ApiResult<Vec<IxLan>>;

    async fn memberships_for_lan(&self, ixlan_id: u64) -> ApiResult<Vec<NetIxLan>>;

    async fn network_by_asn(&self, asn: u32) -> ApiResult<Option<Net>>;
}

/// Registry client speaking the `/api` HTTP surface.
#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRegistryClient {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:8001/api`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| ApiError::Registry(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::debug!(base_url = %base_url, "Registry client configured");

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, String)],
    ) -> ApiResult<Vec<T>> {
        let url = format!("{}/{}", self.base_url, resource);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::Registry(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Registry(format!(
                "/{} answered {}",
                resource, status
            )));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ApiError::Registry(e.without_url().to_string()))?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn exchange_by_name(&self, name: &str) -> ApiResult<Option<Ix>> {
        let found: Vec<Ix> = self.fetch("ix", &[("name", name.to_string())]).await?;
        Ok(found.into_iter().next())
    }

    async fn lans_for_exchange(&self, ix_id: u64) -> ApiResult<Vec<IxLan>> {
        self.fetch("ixlan", &[("ix_id", ix_id.to_string())]).await
    }

    async fn memberships_for_lan(&self, ixlan_id: u64) -> ApiResult<Vec<NetIxLan>> {
        self.fetch("netixlan", &[("ixlan_id", ixlan_id.to_string())])
            .await
    }

    async fn network_by_asn(&self, asn: u32) -> ApiResult<Option<Net>> {
        let found: Vec<Net> = self.fetch("net", &[("asn", asn.to_string())]).await?;
        Ok(found.into_iter().next())
    }
}

/// Registry client that skips the transport and queries the cache directly.
#[derive(Debug, Clone)]
pub struct LocalRegistryClient {
    registry: Registry,
}

impl LocalRegistryClient {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl RegistryClient for LocalRegistryClient {
    async fn exchange_by_name(&self, name: &str) -> ApiResult<Option<Ix>> {
        self.registry.exchange_by_name(name).await
    }

    async fn lans_for_exchange(&self, ix_id: u64) -> ApiResult<Vec<IxLan>> {
        self.registry.lans_for_exchange(ix_id).await
    }

    async fn memberships_for_lan(&self, ixlan_id: u64) -> ApiResult<Vec<NetIxLan>> {
        self.registry.memberships_for_lan(ixlan_id).await
    }

    async fn network_by_asn(&self, asn: u32) -> ApiResult<Option<Net>> {
        self.registry.network_by_asn(asn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client =
            HttpRegistryClient::new("http://127.0.0.1:8001/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8001/api");
    }

    #[tokio::test]
    async fn test_unreachable_mirror_is_registry_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let client =
            HttpRegistryClient::new("http://127.0.0.1:9/api", Duration::from_secs(2)).unwrap();
        let err = client.network_by_asn(3356).await.unwrap_err();
        assert!(matches!(err, ApiError::Registry(_)));
    }
}
