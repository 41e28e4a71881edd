//! Snapshot record types.
//!
//! Known fields are typed; every other attribute of a snapshot record is kept
//! in `extra` so that registry responses hand back the full record.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// The four snapshot collections backing the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Ix,
    IxLan,
    NetIxLan,
    Net,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Ix,
        ResourceKind::IxLan,
        ResourceKind::NetIxLan,
        ResourceKind::Net,
    ];

    /// File name of the snapshot inside the cache directory.
    pub fn file_name(self) -> &'static str {
        match self {
            ResourceKind::Ix => "ix",
            ResourceKind::IxLan => "ixlan",
            ResourceKind::NetIxLan => "netixlan",
            ResourceKind::Net => "net",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Top-level shape of every snapshot document and registry response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> Envelope<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }
}

/// A record type stored in one snapshot collection.
pub trait Record: DeserializeOwned + Send + 'static {
    const KIND: ResourceKind;

    /// Registry identity of the record.
    fn id(&self) -> u64;
}

/// An internet exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ix {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Populated on read from the `ixlan` snapshot, never persisted.
    #[serde(default)]
    pub ixlan_set: Vec<IxLan>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A LAN segment of an exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IxLan {
    pub id: u64,
    pub ix_id: u64,
    #[serde(default)]
    pub name: Option<String>,
    /// ASN of the segment's route server, if it runs one.
    #[serde(default)]
    pub rs_asn: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A network's attachment to a LAN segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetIxLan {
    #[serde(default)]
    pub id: u64,
    pub ixlan_id: u64,
    pub asn: u32,
    #[serde(default)]
    pub ipaddr4: Option<String>,
    #[serde(default)]
    pub ipaddr6: Option<String>,
    /// Port speed in Mbit/s.
    #[serde(default)]
    pub speed: u64,
    #[serde(default)]
    pub is_rs_peer: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An autonomous system's registry entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Net {
    #[serde(default)]
    pub id: u64,
    pub asn: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub irr_as_set: Option<String>,
    #[serde(default)]
    pub info_prefixes4: Option<u32>,
    #[serde(default)]
    pub info_prefixes6: Option<u32>,
    #[serde(default)]
    pub info_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Net {
    pub fn is_route_server(&self) -> bool {
        self.info_type.as_deref() == Some("Route Server")
    }
}

impl Record for Ix {
    const KIND: ResourceKind = ResourceKind::Ix;
    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for IxLan {
    const KIND: ResourceKind = ResourceKind::IxLan;
    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for NetIxLan {
    const KIND: ResourceKind = ResourceKind::NetIxLan;
    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for Net {
    const KIND: ResourceKind = ResourceKind::Net;
    fn id(&self) -> u64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_attributes_survive() {
        let raw = r#"{"id":1,"name":"DE-CIX","city":"Frankfurt","proto_ipv6":true}"#;
        let ix: Ix = serde_json::from_str(raw).unwrap();
        assert_eq!(ix.name, "DE-CIX");
        assert!(ix.ixlan_set.is_empty());
        assert_eq!(ix.extra["city"], "Frankfurt");

        let back = serde_json::to_value(&ix).unwrap();
        assert_eq!(back["proto_ipv6"], true);
        assert_eq!(back["ixlan_set"], serde_json::json!([]));
    }

    #[test]
    fn test_nullable_fields() {
        let raw = r#"{"asn":3356,"name":"Level3","irr_as_set":null,"info_prefixes4":null}"#;
        let net: Net = serde_json::from_str(raw).unwrap();
        assert_eq!(net.irr_as_set, None);
        assert_eq!(net.info_prefixes4, None);
        assert!(!net.is_route_server());
    }

    #[test]
    fn test_envelope_without_data() {
        let env: Envelope<IxLan> = serde_json::from_str("{}").unwrap();
        assert!(env.data.is_empty());
    }

    #[test]
    fn test_resource_file_names() {
        let names: Vec<_> = ResourceKind::ALL.iter().map(|k| k.file_name()).collect();
        assert_eq!(names, vec!["ix", "ixlan", "netixlan", "net"]);
        assert_eq!(ResourceKind::NetIxLan.index(), 2);
    }
}
