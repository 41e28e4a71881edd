//! Configuration submission handler.
//!
//! # Responsibilities
//! - Accept `POST /{namespace}/{vendor}/{style}/{asn?}` only
//! - Decode the JSON body into exchange configurations
//! - Merge with registry data, then render through the selected template set
//!
//! # Design Decisions
//! - The route is registered for every method so non-POST gets a 405 diagnostic
//! - The selector is checked before merging so unknown sets fail fast
//! - The line-oriented alternate format is decoded elsewhere; here it is a 415

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ApiResult, DecodeOrigin};
use crate::http::request::RequestIdExt;
use crate::http::server::AppState;
use crate::peering::parse_submission;
use crate::render::StyleSelector;

/// Path segments after the namespace.
#[derive(Debug, Deserialize)]
pub struct SubmitPath {
    vendor: String,
    style: String,
    #[serde(default)]
    asn: Option<String>,
}

/// Target ASN from the path, with or without an `AS` prefix.
fn parse_target_asn(raw: &str) -> ApiResult<u32> {
    let digits = raw
        .strip_prefix("AS")
        .or_else(|| raw.strip_prefix("as"))
        .unwrap_or(raw);
    digits
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("`{}` is not an ASN", raw)))
}

fn is_json(content_type: &str) -> bool {
    let media = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media == "application/json" || media.ends_with("+json")
}

pub async fn submit(
    State(state): State<AppState>,
    Path(path): Path<SubmitPath>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    if method != Method::POST {
        return Err(ApiError::MethodNotAllowed(method));
    }

    let selector = StyleSelector::new(&path.vendor, &path.style)?;
    let target_asn = path.asn.as_deref().map(parse_target_asn).transpose()?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !is_json(content_type) {
        return Err(ApiError::UnsupportedMediaType(content_type.to_string()));
    }

    let exchanges = parse_submission(&body)
        .map_err(|e| ApiError::decode(DecodeOrigin::RequestBody, e))?;
    if exchanges.is_empty() {
        return Err(ApiError::BadRequest(
            "submission contains no exchange configurations".to_string(),
        ));
    }

    state.renderer.ensure(&selector)?;

    info!(
        request_id = %headers.request_id(),
        selector = %selector,
        exchanges = exchanges.len(),
        target_asn = ?target_asn,
        "Generating configuration"
    );

    let merged = state.merge.merge(exchanges, target_asn).await?;

    let mut rendered = Vec::new();
    state.renderer.render(&selector, &merged, &mut rendered)?;

    Ok(([(header::CONTENT_TYPE, selector.content_type())], rendered).into_response())
}
