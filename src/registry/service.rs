//! Registry queries answered from the snapshot cache.

use std::sync::Arc;

use crate::error::ApiResult;
use crate::registry::cache::SnapshotCache;
use crate::registry::query::{
    lans_by_exchange, memberships_by_lan, network_by_asn, AnyOf, ExchangeMatch, IdEquals,
    QueryEngine, QueryParams,
};
use crate::registry::types::{Ix, IxLan, Net, NetIxLan};

/// Cache + query layer shared by the HTTP handlers and the in-process client.
#[derive(Debug, Clone)]
pub struct Registry {
    cache: Arc<SnapshotCache>,
}

impl Registry {
    pub fn new(cache: Arc<SnapshotCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    /// `GET /api/ix`: the first exchange matching every supplied key.
    pub async fn exchanges(&self, params: &QueryParams) -> ApiResult<Vec<Ix>> {
        let records = self.cache.records::<Ix>().await?;
        if params.is_empty() {
            return Ok(records);
        }
        Ok(QueryEngine::first(records, &ExchangeMatch::from_params(params)))
    }

    /// `GET /api/ix/{id}`: the exchange with its LAN segments attached.
    pub async fn exchange(&self, id: u64) -> ApiResult<Vec<Ix>> {
        let mut found = QueryEngine::first(self.cache.records::<Ix>().await?, &IdEquals(id));
        if let Some(ix) = found.first_mut() {
            ix.ixlan_set = self.lans_for_exchange(id).await?;
        }
        Ok(found)
    }

    /// `GET /api/ixlan`
    pub async fn lans(&self, params: &QueryParams) -> ApiResult<Vec<IxLan>> {
        let records = self.cache.records::<IxLan>().await?;
        if params.is_empty() {
            return Ok(records);
        }
        Ok(QueryEngine::filter(records, &lans_by_exchange(params)))
    }

    /// `GET /api/ixlan/{id}`
    pub async fn lan(&self, id: u64) -> ApiResult<Vec<IxLan>> {
        Ok(QueryEngine::first(self.cache.records::<IxLan>().await?, &IdEquals(id)))
    }

    /// `GET /api/netixlan`
    pub async fn memberships(&self, params: &QueryParams) -> ApiResult<Vec<NetIxLan>> {
        let records = self.cache.records::<NetIxLan>().await?;
        if params.is_empty() {
            return Ok(records);
        }
        Ok(QueryEngine::filter(records, &memberships_by_lan(params)))
    }

    /// `GET /api/net`
    pub async fn networks(&self, params: &QueryParams) -> ApiResult<Vec<Net>> {
        let records = self.cache.records::<Net>().await?;
        if params.is_empty() {
            return Ok(records);
        }
        Ok(QueryEngine::first(records, &network_by_asn(params)))
    }

    pub async fn exchange_by_name(&self, name: &str) -> ApiResult<Option<Ix>> {
        let records = self.cache.records::<Ix>().await?;
        Ok(QueryEngine::first(records, &ExchangeMatch::by_name(name))
            .into_iter()
            .next())
    }

    pub async fn lans_for_exchange(&self, ix_id: u64) -> ApiResult<Vec<IxLan>> {
        let records = self.cache.records::<IxLan>().await?;
        Ok(QueryEngine::filter(
            records,
            &AnyOf::new([ix_id.to_string()], |lan: &IxLan| lan.ix_id),
        ))
    }

    pub async fn memberships_for_lan(&self, ixlan_id: u64) -> ApiResult<Vec<NetIxLan>> {
        let records = self.cache.records::<NetIxLan>().await?;
        Ok(QueryEngine::filter(
            records,
            &AnyOf::new([ixlan_id.to_string()], |m: &NetIxLan| m.ixlan_id),
        ))
    }

    pub async fn network_by_asn(&self, asn: u32) -> ApiResult<Option<Net>> {
        let records = self.cache.records::<Net>().await?;
        Ok(records.into_iter().find(|net| net.asn == asn))
    }
}
