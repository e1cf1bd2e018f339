//! Typed views over the handful of node RPC results the exporter reads.
//!
//! Each view is decoded from the raw `result` value with [`decode`], which
//! turns serde failures into [`DataError::WrongShape`] tagged with the RPC
//! method so group failures can be logged meaningfully.

use std::fmt;

use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::DataError;

/// `system_health`
///
/// Fields are optional so that `/health` can distinguish "field missing"
/// from "call failed"; the runtime group requires all of them.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub peers: Option<u64>,
    pub should_have_peers: Option<bool>,
    pub is_syncing: Option<bool>,
}

/// `state_getRuntimeVersion` (only the field we export).
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeVersion {
    pub spec_version: u64,
}

/// `chain_getHeader` (block number is a `0x`-prefixed hex string).
#[derive(Clone, Debug, Deserialize)]
pub struct Header {
    pub number: String,
}

/// `chain_getBlock`
#[derive(Clone, Debug, Deserialize)]
pub struct SignedBlock {
    pub block: BlockBody,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlockBody {
    pub header: Header,
}

/// Slots claimed by one validator in the current epoch.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EpochAuthorship {
    #[serde(default)]
    pub primary: Vec<u64>,
    #[serde(default)]
    pub secondary: Vec<u64>,
}

/// `babe_epochAuthorship`, keyed by validator address.
///
/// Entries keep the order the node returned them in.
#[derive(Clone, Debug, Default)]
pub struct EpochAuthorshipMap(Vec<(String, EpochAuthorship)>);

impl EpochAuthorshipMap {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EpochAuthorship)> {
        self.0.iter().map(|(address, slots)| (address.as_str(), slots))
    }
}

impl<'de> Deserialize<'de> for EpochAuthorshipMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = EpochAuthorshipMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from validator address to authored slots")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, EpochAuthorship>()? {
                    entries.push(entry);
                }
                Ok(EpochAuthorshipMap(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Decodes an RPC `result` into `T`.
pub fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, DataError> {
    serde_json::from_value(value).map_err(|e| DataError::WrongShape {
        method: method.to_string(),
        detail: e.to_string(),
    })
}

/// Parses a Substrate block number (`"0x64"`) into an integer.
///
/// Only hex digits are accepted after the optional prefix; signs are not.
pub fn parse_block_number(field: &'static str, value: &str) -> Result<u64, DataError> {
    let invalid = || DataError::InvalidHex {
        field,
        value: value.to_string(),
    };
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    u64::from_str_radix(digits, 16).map_err(|_| invalid())
}

/// Renders a scalar RPC result as a label value.
///
/// Identity calls return strings; anything else scalar is stringified.
pub fn label_value(method: &str, value: Value) -> Result<String, DataError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(DataError::WrongShape {
            method: method.to_string(),
            detail: format!("expected a scalar, got {other}"),
        }),
    }
}
