//! Merge of submitted peer intent with registry data.
//!
//! # Responsibilities
//! - Resolve exchange context (exchange → LAN segments → memberships) once per exchange
//! - Resolve every requested peer concurrently on a bounded pool
//! - Reassemble results in submission order into `peersready`
//!
//! # Design Decisions
//! - One task per peer, results written into a pre-sized slot per index
//! - A failed or unknown peer keeps its caller-supplied fields (empty enrichment)
//! - Caller-supplied non-empty values always win over registry data
//! - The whole merge runs under a deadline; outstanding tasks abort on expiry

use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::MergeConfig;
use crate::error::{ApiError, ApiResult};
use crate::observability::metrics;
use crate::peering::client::RegistryClient;
use crate::peering::types::{ExchangeConfig, ExchangePeer};
use crate::registry::{Net, NetIxLan};

/// Registry facts shared by every peer of one exchange.
#[derive(Debug, Default)]
struct ExchangeContext {
    memberships: Vec<NetIxLan>,
    route_servers: HashSet<u32>,
}

/// Resolves submitted exchanges into ready-to-render peer lists.
#[derive(Clone)]
pub struct MergeWorker {
    registry: Arc<dyn RegistryClient>,
    workers: usize,
    deadline: Duration,
}

impl MergeWorker {
    /// Create a worker; `workers == 0` sizes the pool to the available cores.
    pub fn new(registry: Arc<dyn RegistryClient>, workers: usize, deadline: Duration) -> Self {
        let workers = if workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            workers
        };
        Self {
            registry,
            workers,
            deadline,
        }
    }

    pub fn from_config(registry: Arc<dyn RegistryClient>, config: &MergeConfig) -> Self {
        Self::new(
            registry,
            config.workers,
            Duration::from_secs(config.deadline_secs),
        )
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Merge every exchange, skipping sessions with `target_asn` itself.
    pub async fn merge(
        &self,
        exchanges: Vec<ExchangeConfig>,
        target_asn: Option<u32>,
    ) -> ApiResult<Vec<ExchangeConfig>> {
        let start = Instant::now();
        let merged = tokio::time::timeout(self.deadline, self.merge_all(exchanges, target_asn))
            .await
            .map_err(|_| {
                tracing::warn!(deadline = ?self.deadline, "Peer resolution deadline exceeded");
                ApiError::DeadlineExceeded(self.deadline)
            })??;

        tracing::debug!(
            exchanges = merged.len(),
            peers = merged.iter().map(|ix| ix.peers_ready.len()).sum::<usize>(),
            elapsed = ?start.elapsed(),
            "Merge complete"
        );
        Ok(merged)
    }

    async fn merge_all(
        &self,
        exchanges: Vec<ExchangeConfig>,
        target_asn: Option<u32>,
    ) -> ApiResult<Vec<ExchangeConfig>> {
        let mut merged = Vec::with_capacity(exchanges.len());
        for ix in exchanges {
            merged.push(self.merge_exchange(ix, target_asn).await?);
        }
        Ok(merged)
    }

    async fn merge_exchange(
        &self,
        mut ix: ExchangeConfig,
        target_asn: Option<u32>,
    ) -> ApiResult<ExchangeConfig> {
        let wildcard = ix.option_enabled("wildcard");
        if ix.configured_peers().is_none() && !wildcard {
            tracing::debug!(ix = %ix.ix_name, "No peers configured, keeping submitted peersready");
            if target_asn.is_some() {
                ix.peers_ready.retain(|p| parse_asn(&p.asn) != target_asn);
                if let Some(route_servers) = ix.route_server_ready.as_mut() {
                    route_servers.retain(|p| parse_asn(&p.asn) != target_asn);
                }
            }
            return Ok(ix);
        }

        let context = Arc::new(self.exchange_context(&ix.ix_name).await?);
        let planned = plan_peers(&ix, target_asn, wildcard, &context);
        tracing::debug!(ix = %ix.ix_name, peers = planned.len(), "Resolving peers");

        let ready = self.resolve_all(planned, context).await;
        let route_servers: Vec<ExchangePeer> = ready.iter().filter(|p| p.is_rs).cloned().collect();

        ix.route_server_ready = (!route_servers.is_empty()).then_some(route_servers);
        ix.peers_ready = ready;
        Ok(ix)
    }

    async fn exchange_context(&self, name: &str) -> ApiResult<ExchangeContext> {
        let mut context = ExchangeContext::default();
        let Some(exchange) = self.registry.exchange_by_name(name).await? else {
            tracing::warn!(ix = %name, "Exchange not in registry, peers keep submitted fields");
            return Ok(context);
        };

        for lan in self.registry.lans_for_exchange(exchange.id).await? {
            if let Some(rs_asn) = lan.rs_asn.filter(|asn| *asn != 0) {
                context.route_servers.insert(rs_asn);
            }
            context
                .memberships
                .extend(self.registry.memberships_for_lan(lan.id).await?);
        }
        Ok(context)
    }

    async fn resolve_all(
        &self,
        planned: Vec<ExchangePeer>,
        context: Arc<ExchangeContext>,
    ) -> Vec<ExchangePeer> {
        let permits = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for (index, peer) in planned.iter().cloned().enumerate() {
            let registry = self.registry.clone();
            let context = context.clone();
            let permits = permits.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                (index, resolve_peer(registry.as_ref(), peer, &context).await)
            });
        }

        let mut slots: Vec<Option<Vec<ExchangePeer>>> = vec![None; planned.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, sessions)) => slots[index] = Some(sessions),
                Err(e) => tracing::warn!(error = %e, "Peer resolution task failed"),
            }
        }

        planned
            .into_iter()
            .zip(slots)
            .flat_map(|(peer, slot)| slot.unwrap_or_else(|| vec![peer]))
            .collect()
    }
}

fn parse_asn(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

/// Requested peers in submission order, then wildcard additions.
fn plan_peers(
    ix: &ExchangeConfig,
    target_asn: Option<u32>,
    wildcard: bool,
    context: &ExchangeContext,
) -> Vec<ExchangePeer> {
    let is_target = |asn: Option<u32>| target_asn.is_some() && asn == target_asn;
    let mut seen = HashSet::new();
    let mut planned = Vec::new();

    for (asn, peers) in ix.configured_peers().into_iter().flatten() {
        let asn = asn.trim();
        if is_target(parse_asn(asn)) {
            tracing::debug!(asn = %asn, "Skipping session with target ASN");
            continue;
        }
        seen.insert(asn.to_string());
        if peers.is_empty() {
            planned.push(ExchangePeer::for_asn(asn));
        }
        for peer in peers {
            let mut peer = peer.clone();
            peer.asn = asn.to_string();
            planned.push(peer);
        }
    }

    if wildcard {
        for membership in &context.memberships {
            if is_target(Some(membership.asn)) || !seen.insert(membership.asn.to_string()) {
                continue;
            }
            planned.push(ExchangePeer::for_asn(membership.asn.to_string()));
        }
    }
    planned
}

fn parse_addr(raw: Option<&str>) -> Option<IpAddr> {
    raw.and_then(|s| s.trim().parse().ok())
}

/// An explicitly addressed peer only takes the membership with that address.
fn accepts_session(peer: &ExchangePeer, membership: &NetIxLan) -> bool {
    if !peer.has_explicit_address() {
        return true;
    }
    let v4 = peer.ipv4_addr.is_some() && peer.ipv4_addr == parse_addr(membership.ipaddr4.as_deref());
    let v6 = peer.ipv6_addr.is_some() && peer.ipv6_addr == parse_addr(membership.ipaddr6.as_deref());
    v4 || v6
}

async fn resolve_peer(
    registry: &dyn RegistryClient,
    peer: ExchangePeer,
    context: &ExchangeContext,
) -> Vec<ExchangePeer> {
    let Some(asn) = parse_asn(&peer.asn) else {
        tracing::warn!(asn = %peer.asn, "Unparseable ASN, keeping submitted fields");
        metrics::record_merge_peer("caller_only");
        return vec![peer];
    };

    let network = match registry.network_by_asn(asn).await {
        Ok(network) => network,
        Err(e) => {
            tracing::warn!(asn, error = %e, "Network lookup failed, resolving without it");
            None
        }
    };

    let route_server = context.route_servers.contains(&asn)
        || network.as_ref().map_or(false, Net::is_route_server);
    let sessions: Vec<&NetIxLan> = context
        .memberships
        .iter()
        .filter(|m| m.asn == asn && accepts_session(&peer, m))
        .collect();

    let outcome = if network.is_some() || !sessions.is_empty() {
        "enriched"
    } else {
        "caller_only"
    };
    metrics::record_merge_peer(outcome);

    if sessions.is_empty() {
        return vec![enrich(peer, network.as_ref(), None, route_server)];
    }
    sessions
        .into_iter()
        .map(|m| enrich(peer.clone(), network.as_ref(), Some(m), route_server))
        .collect()
}

fn enrich(
    mut peer: ExchangePeer,
    network: Option<&Net>,
    membership: Option<&NetIxLan>,
    route_server: bool,
) -> ExchangePeer {
    if let Some(net) = network {
        if peer.irr_as_set.is_empty() {
            peer.irr_as_set = net.irr_as_set.clone().unwrap_or_default();
        }
        if peer.info_prefixes4 == 0 {
            peer.info_prefixes4 = net.info_prefixes4.unwrap_or_default();
        }
        if peer.info_prefixes6 == 0 {
            peer.info_prefixes6 = net.info_prefixes6.unwrap_or_default();
        }
        if peer.description.is_empty() {
            peer.description = net.name.clone();
        }
    }
    if let Some(m) = membership {
        if peer.ipv4_addr.is_none() {
            peer.ipv4_addr = parse_addr(m.ipaddr4.as_deref());
        }
        if peer.ipv6_addr.is_none() {
            peer.ipv6_addr = parse_addr(m.ipaddr6.as_deref());
        }
        peer.is_rs_peer |= m.is_rs_peer;
    }
    peer.is_rs |= route_server;
    peer
}
