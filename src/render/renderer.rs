//! Handlebars-backed template sets.
//!
//! # Responsibilities
//! - Map a selector to `{root}/{vendor}/{style}/router.hbs`
//! - Compile each set once and keep it for the life of the process
//! - Build the render context from merged exchanges
//!
//! # Design Decisions
//! - Vendor syntax lives only in the templates; the context is shared
//! - Output is router configuration, not HTML, so escaping is off

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use handlebars::{handlebars_helper, Handlebars};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use super::selector::{StyleSelector, ROUTER_TEMPLATE_FILE};
use crate::error::{ApiError, ApiResult};
use crate::observability::metrics;
use crate::peering::{ExchangeConfig, ExchangePeer};

const ROUTER_TEMPLATE: &str = "router";

/// Template context for one render call.
#[derive(Debug, Serialize)]
struct RenderContext<'a> {
    exchanges: Vec<ExchangeView<'a>>,
}

#[derive(Debug, Serialize)]
struct ExchangeView<'a> {
    ixname: &'a str,
    options: &'a IndexMap<String, Value>,
    peeringgroups: &'a IndexMap<String, Value>,
    additionalconfig: &'a [String],
    peers: Vec<PeerView<'a>>,
    routeservers: Vec<PeerView<'a>>,
}

/// A renderable peer plus the values templates print directly.
#[derive(Debug, Serialize)]
struct PeerView<'a> {
    #[serde(flatten)]
    peer: &'a ExchangePeer,
    ipv4: Option<String>,
    ipv6: Option<String>,
    /// Peer group per family; set only when enabled and named.
    peergroup4: Option<&'a str>,
    peergroup6: Option<&'a str>,
    /// Single-line neighbor description.
    label: String,
}

fn peer_group(enabled: bool, name: &str) -> Option<&str> {
    let name = name.trim();
    (enabled && !name.is_empty()).then_some(name)
}

fn single_line(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

impl<'a> PeerView<'a> {
    fn new(peer: &'a ExchangePeer) -> Self {
        let label = match single_line(&peer.description) {
            text if text.is_empty() => format!("AS{}", peer.asn),
            text => text,
        };
        Self {
            peer,
            ipv4: peer.ipv4_session().map(|ip| ip.to_string()),
            ipv6: peer.ipv6_session().map(|ip| ip.to_string()),
            peergroup4: peer_group(peer.group_enabled, &peer.group),
            peergroup6: peer_group(peer.group6_enabled, &peer.group6),
            label,
        }
    }
}

fn renderable(peers: &[ExchangePeer]) -> Vec<PeerView<'_>> {
    peers
        .iter()
        .filter(|peer| peer.is_renderable())
        .map(PeerView::new)
        .collect()
}

impl<'a> RenderContext<'a> {
    fn new(exchanges: &'a [ExchangeConfig]) -> Self {
        let exchanges = exchanges
            .iter()
            .map(|ix| ExchangeView {
                ixname: &ix.ix_name,
                options: &ix.options,
                peeringgroups: &ix.peering_groups,
                additionalconfig: ix.additional_config.as_deref().unwrap_or_default(),
                peers: renderable(&ix.peers_ready),
                routeservers: ix
                    .route_server_ready
                    .as_deref()
                    .map(renderable)
                    .unwrap_or_default(),
            })
            .collect();
        Self { exchanges }
    }
}

fn json_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    if let Some(v) = h.param(0) {
        out.write(&serde_json::to_string(v.value()).unwrap_or_default())?;
    }
    Ok(())
}

handlebars_helper!(quote: |text: str| {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            c if c.is_control() => quoted.push(' '),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
});

/// Renders merged exchanges through per-selector template sets.
pub struct TemplateRenderer {
    directory: PathBuf,
    sets: DashMap<StyleSelector, Arc<Handlebars<'static>>>,
}

impl TemplateRenderer {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            sets: DashMap::new(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Selectors with a template set on disk, sorted.
    pub fn available(&self) -> io::Result<Vec<StyleSelector>> {
        let mut found = Vec::new();
        for vendor in std::fs::read_dir(&self.directory)? {
            let vendor = vendor?;
            if !vendor.file_type()?.is_dir() {
                continue;
            }
            let vendor_name = vendor.file_name().to_string_lossy().into_owned();
            for style in std::fs::read_dir(vendor.path())? {
                let style = style?;
                if !style.path().join(ROUTER_TEMPLATE_FILE).is_file() {
                    continue;
                }
                let style_name = style.file_name().to_string_lossy().into_owned();
                if let Ok(selector) = StyleSelector::new(&vendor_name, &style_name) {
                    found.push(selector);
                }
            }
        }
        found.sort();
        Ok(found)
    }

    /// Compiled template set for `selector`, compiling on first use.
    fn template_set(&self, selector: &StyleSelector) -> ApiResult<Arc<Handlebars<'static>>> {
        if let Some(set) = self.sets.get(selector) {
            return Ok(set.clone());
        }

        let path = selector.template_path(&self.directory);
        if !path.is_file() {
            return Err(ApiError::BadRequest(format!(
                "no template set for `{}`",
                selector
            )));
        }

        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_helper("json", Box::new(json_helper));
        handlebars.register_helper("quote", Box::new(quote));
        handlebars
            .register_template_file(ROUTER_TEMPLATE, &path)
            .map_err(|e| {
                error!(selector = %selector, error = %e, "Template set failed to compile");
                ApiError::Render(format!("template set `{}` failed to compile", selector))
            })?;
        debug!(selector = %selector, path = %path.display(), "Template set compiled");

        let set = self
            .sets
            .entry(selector.clone())
            .or_insert_with(|| Arc::new(handlebars))
            .clone();
        Ok(set)
    }

    /// Fails if `selector` has no usable template set.
    pub fn ensure(&self, selector: &StyleSelector) -> ApiResult<()> {
        self.template_set(selector).map(|_| ())
    }

    /// Render `exchanges` in order into `out`.
    pub fn render<W: io::Write>(
        &self,
        selector: &StyleSelector,
        exchanges: &[ExchangeConfig],
        out: W,
    ) -> ApiResult<()> {
        let set = self.template_set(selector)?;
        let context = RenderContext::new(exchanges);
        set.render_to_write(ROUTER_TEMPLATE, &context, out)
            .map_err(|e| {
                error!(selector = %selector, error = %e, "Render failed");
                ApiError::Render(e.to_string())
            })?;
        metrics::record_render(selector);
        Ok(())
    }

    pub fn render_to_string(
        &self,
        selector: &StyleSelector,
        exchanges: &[ExchangeConfig],
    ) -> ApiResult<String> {
        let mut buf = Vec::new();
        self.render(selector, exchanges, &mut buf)?;
        String::from_utf8(buf).map_err(|e| ApiError::Render(e.to_string()))
    }
}

impl std::fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRenderer")
            .field("directory", &self.directory)
            .field("compiled", &self.sets.len())
            .finish()
    }
}
