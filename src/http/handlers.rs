//! Read-only registry handlers under `/api`.
//!
//! Every response is `{"data": [...]}`. A query that matches nothing
//! answers with an empty collection, not an error.

use axum::{
    extract::{Path, Query, State},
    http::Uri,
    Json,
};

use crate::error::{ApiError, ApiResult};
use crate::http::server::AppState;
use crate::registry::{Envelope, Ix, IxLan, Net, NetIxLan};

type Params = Query<Vec<(String, String)>>;

fn parse_id(raw: &str) -> ApiResult<u64> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("`{}` is not a numeric id", raw)))
}

/// `GET /api/ix?name=..&id=..`
pub async fn list_exchanges(
    State(state): State<AppState>,
    Query(params): Params,
) -> ApiResult<Json<Envelope<Ix>>> {
    let found = state.registry.exchanges(&params).await?;
    Ok(Json(Envelope::new(found)))
}

/// `GET /api/ix/{id}` with its LAN segments attached.
pub async fn get_exchange(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Ix>>> {
    let found = state.registry.exchange(parse_id(&id)?).await?;
    Ok(Json(Envelope::new(found)))
}

/// `GET /api/ixlan?ix_id=..`
pub async fn list_lans(
    State(state): State<AppState>,
    Query(params): Params,
) -> ApiResult<Json<Envelope<IxLan>>> {
    let found = state.registry.lans(&params).await?;
    Ok(Json(Envelope::new(found)))
}

/// `GET /api/ixlan/{id}`
pub async fn get_lan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<IxLan>>> {
    let found = state.registry.lan(parse_id(&id)?).await?;
    Ok(Json(Envelope::new(found)))
}

/// `GET /api/netixlan?ixlan_id=..`
pub async fn list_memberships(
    State(state): State<AppState>,
    Query(params): Params,
) -> ApiResult<Json<Envelope<NetIxLan>>> {
    let found = state.registry.memberships(&params).await?;
    Ok(Json(Envelope::new(found)))
}

/// `GET /api/net?asn=..`
pub async fn list_networks(
    State(state): State<AppState>,
    Query(params): Params,
) -> ApiResult<Json<Envelope<Net>>> {
    let found = state.registry.networks(&params).await?;
    Ok(Json(Envelope::new(found)))
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
