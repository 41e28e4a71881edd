//! Predicate evaluation over snapshot records.
//!
//! # Responsibilities
//! - Build typed predicates from query-string pairs
//! - Apply equality / membership predicates to a decoded collection
//!
//! # Design Decisions
//! - An expected key that is absent never matches; it is not a fault
//! - Identifiers compare numerically; unparseable values match nothing
//! - Filtering consumes the caller's decoded copy, shared bytes stay untouched

use crate::registry::types::{Ix, IxLan, Net, NetIxLan, Record};

/// Query-string pairs in request order. Keys may repeat.
pub type QueryParams = [(String, String)];

/// First value supplied for `key`.
pub fn first_value<'a>(params: &'a QueryParams, key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Every value supplied for `key`, in request order.
pub fn all_values<'a>(params: &'a QueryParams, key: &str) -> Vec<&'a str> {
    params
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .collect()
}

fn id_matches(value: &str, id: u64) -> bool {
    value.trim().parse::<u64>().map_or(false, |v| v == id)
}

/// A condition a record either satisfies or not.
pub trait Predicate<T> {
    fn matches(&self, record: &T) -> bool;
}

/// Stateless evaluator for predicates over a collection.
pub struct QueryEngine;

impl QueryEngine {
    /// Keep every record that satisfies `predicate`, in collection order.
    pub fn filter<T, P: Predicate<T>>(records: Vec<T>, predicate: &P) -> Vec<T> {
        records.into_iter().filter(|r| predicate.matches(r)).collect()
    }

    /// Keep only the first record that satisfies `predicate`.
    pub fn first<T, P: Predicate<T>>(records: Vec<T>, predicate: &P) -> Vec<T> {
        records
            .into_iter()
            .find(|r| predicate.matches(r))
            .into_iter()
            .collect()
    }
}

/// Identity equality against a path-embedded identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdEquals(pub u64);

impl<T: Record> Predicate<T> for IdEquals {
    fn matches(&self, record: &T) -> bool {
        record.id() == self.0
    }
}

/// Keys an exchange listing can be filtered on.
const EXCHANGE_KEYS: [&str; 2] = ["name", "id"];

/// Exchange listing: every key supplied must be recognized and match (AND).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeMatch {
    pub name: Option<String>,
    pub id: Option<String>,
    /// A key other than `name`/`id` was supplied; nothing can match it.
    pub unrecognized: bool,
}

impl ExchangeMatch {
    pub fn from_params(params: &QueryParams) -> Self {
        Self {
            name: first_value(params, "name").map(str::to_string),
            id: first_value(params, "id").map(str::to_string),
            unrecognized: params
                .iter()
                .any(|(k, _)| !EXCHANGE_KEYS.contains(&k.as_str())),
        }
    }

    pub fn by_name(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }
}

impl Predicate<Ix> for ExchangeMatch {
    fn matches(&self, ix: &Ix) -> bool {
        !self.unrecognized
            && self.name.as_deref().map_or(true, |n| ix.name == n)
            && self.id.as_deref().map_or(true, |v| id_matches(v, ix.id))
    }
}

/// Membership of a numeric field in a set of supplied values (OR).
pub struct AnyOf<T> {
    values: Vec<String>,
    field: fn(&T) -> u64,
}

impl<T> AnyOf<T> {
    pub fn new<S: Into<String>>(values: impl IntoIterator<Item = S>, field: fn(&T) -> u64) -> Self {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            field,
        }
    }
}

impl<T> Predicate<T> for AnyOf<T> {
    fn matches(&self, record: &T) -> bool {
        let value = (self.field)(record);
        self.values.iter().any(|v| id_matches(v, value))
    }
}

/// LANs of the exchanges named by every `ix_id` value.
pub fn lans_by_exchange(params: &QueryParams) -> AnyOf<IxLan> {
    AnyOf::new(all_values(params, "ix_id"), |lan: &IxLan| lan.ix_id)
}

/// Memberships of the LANs named by every `ixlan_id` value.
pub fn memberships_by_lan(params: &QueryParams) -> AnyOf<NetIxLan> {
    AnyOf::new(all_values(params, "ixlan_id"), |m: &NetIxLan| m.ixlan_id)
}

/// Network lookup by the first `asn` value.
pub fn network_by_asn(params: &QueryParams) -> AnyOf<Net> {
    AnyOf::new(first_value(params, "asn"), |net: &Net| u64::from(net.asn))
}
