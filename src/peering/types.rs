//! Submitted exchange configuration and peer records.
//!
//! Wire names follow the established submission format, including its
//! `isrsper` spelling.

use std::net::IpAddr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn enabled() -> bool {
    true
}

/// A BGP session counterpart at an exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangePeer {
    #[serde(default = "enabled")]
    pub active: bool,
    #[serde(default)]
    pub asn: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub group6: String,
    #[serde(default, rename = "groupenabled")]
    pub group_enabled: bool,
    #[serde(default, rename = "group6_enabled")]
    pub group6_enabled: bool,
    #[serde(default, rename = "infoprefixes4")]
    pub info_prefixes4: u32,
    #[serde(default, rename = "infoprefixes6")]
    pub info_prefixes6: u32,
    #[serde(default, rename = "ipv4addr", with = "optional_ip")]
    pub ipv4_addr: Option<IpAddr>,
    #[serde(default, rename = "ipv6addr", with = "optional_ip")]
    pub ipv6_addr: Option<IpAddr>,
    #[serde(default = "enabled", rename = "ipv4enabled")]
    pub ipv4_enabled: bool,
    #[serde(default = "enabled", rename = "ipv6enabled")]
    pub ipv6_enabled: bool,
    #[serde(default, rename = "irrasset")]
    pub irr_as_set: String,
    /// The peer is itself a route server.
    #[serde(default, rename = "isrs")]
    pub is_rs: bool,
    /// The peer announces through the exchange route servers.
    #[serde(default, rename = "isrsper")]
    pub is_rs_peer: bool,
    #[serde(default, rename = "localpreference")]
    pub local_preference: u32,
    #[serde(default, rename = "prefixfilter")]
    pub prefix_filter: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl ExchangePeer {
    /// A peer with default settings and nothing but its ASN.
    pub fn for_asn(asn: impl Into<String>) -> Self {
        Self {
            active: true,
            asn: asn.into(),
            group: String::new(),
            group6: String::new(),
            group_enabled: false,
            group6_enabled: false,
            info_prefixes4: 0,
            info_prefixes6: 0,
            ipv4_addr: None,
            ipv6_addr: None,
            ipv4_enabled: true,
            ipv6_enabled: true,
            irr_as_set: String::new(),
            is_rs: false,
            is_rs_peer: false,
            local_preference: 0,
            prefix_filter: false,
            description: String::new(),
        }
    }

    /// IPv4 session address, if the family is enabled and resolved.
    pub fn ipv4_session(&self) -> Option<IpAddr> {
        self.ipv4_addr.filter(|_| self.ipv4_enabled)
    }

    /// IPv6 session address, if the family is enabled and resolved.
    pub fn ipv6_session(&self) -> Option<IpAddr> {
        self.ipv6_addr.filter(|_| self.ipv6_enabled)
    }

    /// At least one enabled address family carries an address.
    pub fn is_renderable(&self) -> bool {
        self.ipv4_session().is_some() || self.ipv6_session().is_some()
    }

    pub fn has_explicit_address(&self) -> bool {
        self.ipv4_addr.is_some() || self.ipv6_addr.is_some()
    }
}

/// One exchange as submitted and, after merging, as rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    #[serde(default, rename = "additionalconfig")]
    pub additional_config: Option<Vec<String>>,
    #[serde(default, rename = "ixname")]
    pub ix_name: String,
    #[serde(default)]
    pub options: IndexMap<String, Value>,
    #[serde(default, rename = "peeringgroups")]
    pub peering_groups: IndexMap<String, Value>,
    /// Exchange name → ASN → requested sessions, in submission order.
    #[serde(default)]
    pub peers_configured: IndexMap<String, IndexMap<String, Vec<ExchangePeer>>>,
    #[serde(default, rename = "peersready")]
    pub peers_ready: Vec<ExchangePeer>,
    #[serde(default, rename = "routeserverready")]
    pub route_server_ready: Option<Vec<ExchangePeer>>,
}

impl ExchangeConfig {
    /// Whether `key` is set to a truthy value in `options`.
    pub fn option_enabled(&self, key: &str) -> bool {
        match self.options.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_u64().map_or(false, |n| n > 0),
            Some(Value::String(s)) => matches!(s.trim(), "1" | "true" | "yes" | "on"),
            _ => false,
        }
    }

    /// Sessions requested for this exchange, keyed by ASN.
    pub fn configured_peers(&self) -> Option<&IndexMap<String, Vec<ExchangePeer>>> {
        self.peers_configured.get(&self.ix_name)
    }
}

/// Decode a submission body: an array of exchanges or a single exchange.
///
/// Decodes straight from the bytes so map keys keep the caller's order.
pub fn parse_submission(body: &[u8]) -> Result<Vec<ExchangeConfig>, serde_json::Error> {
    let is_array = body
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .map_or(false, |b| *b == b'[');
    if is_array {
        serde_json::from_slice(body)
    } else {
        Ok(vec![serde_json::from_slice(body)?])
    }
}

/// `Option<IpAddr>` on the wire as a string where `""` means unset.
mod optional_ip {
    use std::net::IpAddr;

    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(addr: &Option<IpAddr>, s: S) -> Result<S::Ok, S::Error> {
        match addr {
            Some(ip) => s.collect_str(ip),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<IpAddr>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => text
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid IP address `{}`", text))),
        }
    }
}
