//! Serialization Bridge
//!
//! Converts store snapshots to and from a portable string through the
//! [`Codec`] trait. The default [`JsonCodec`] tags every value with its shape
//! so non-JSON-native values (NaN, the infinities, big integers, dates, sets,
//! maps) survive the round trip without precision loss.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value as Json};

use crate::error::{CacheError, Result};
use crate::value::CacheValue;

/// Entries and TTL metadata captured for serialization, in insertion order.
///
/// Permanent entries appear in `entries` but carry no `ttls` record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheSnapshot {
    pub entries: Vec<(String, CacheValue)>,
    /// TTL seconds per key
    pub ttls: Vec<(String, u64)>,
}

/// The external encode/decode capability the cache consumes.
///
/// Implementations must round-trip every [`CacheValue`] shape; the cache
/// itself does not care about the wire format.
pub trait Codec: Send + Sync {
    fn encode(&self, snapshot: &CacheSnapshot) -> Result<String>;
    fn decode(&self, blob: &str) -> Result<CacheSnapshot>;
}

/// Default codec: tagged JSON over serde_json.
///
/// Every value is wrapped as `{"t": <tag>, "v": <payload>}`. Non-finite
/// numbers and big integers ride as strings, dates as RFC 3339, and records
/// and maps as pair arrays so key order is preserved.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for JsonCodec {
    fn encode(&self, snapshot: &CacheSnapshot) -> Result<String> {
        let entries: Vec<Json> = snapshot
            .entries
            .iter()
            .map(|(key, value)| json!([key, value_to_wire(value)]))
            .collect();
        let ttls: Vec<Json> = snapshot
            .ttls
            .iter()
            .map(|(key, ttl)| json!([key, ttl]))
            .collect();
        Ok(serde_json::to_string(&json!({
            "entries": entries,
            "ttls": ttls,
        }))?)
    }

    fn decode(&self, blob: &str) -> Result<CacheSnapshot> {
        let root: Json = serde_json::from_str(blob)?;

        let entries = root
            .get("entries")
            .and_then(Json::as_array)
            .ok_or_else(|| malformed("missing entries array"))?
            .iter()
            .map(|item| {
                let (key, wire) = as_pair(item)?;
                Ok((key.to_string(), wire_to_value(wire)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let ttls = root
            .get("ttls")
            .and_then(Json::as_array)
            .ok_or_else(|| malformed("missing ttls array"))?
            .iter()
            .map(|item| {
                let (key, ttl) = as_pair(item)?;
                let ttl = ttl
                    .as_u64()
                    .ok_or_else(|| malformed("ttl is not an unsigned integer"))?;
                Ok((key.to_string(), ttl))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CacheSnapshot { entries, ttls })
    }
}

fn malformed(msg: impl Into<String>) -> CacheError {
    CacheError::MalformedBlob(msg.into())
}

/// Splits a two-element `[key, payload]` array with a string key.
fn as_pair(value: &Json) -> Result<(&str, &Json)> {
    let pair = value
        .as_array()
        .filter(|items| items.len() == 2)
        .ok_or_else(|| malformed("expected a [key, payload] pair"))?;
    let key = pair[0]
        .as_str()
        .ok_or_else(|| malformed("pair key is not a string"))?;
    Ok((key, &pair[1]))
}

fn value_to_wire(value: &CacheValue) -> Json {
    match value {
        CacheValue::Null => json!({ "t": "null" }),
        CacheValue::Bool(b) => json!({ "t": "bool", "v": b }),
        CacheValue::Number(n) if n.is_finite() => json!({ "t": "num", "v": n }),
        // JSON has no spelling for these, so they ride as strings
        CacheValue::Number(n) => json!({ "t": "num", "v": non_finite_repr(*n) }),
        CacheValue::String(s) => json!({ "t": "str", "v": s }),
        CacheValue::BigInt(i) => json!({ "t": "bigint", "v": i.to_string() }),
        CacheValue::Date(d) => {
            json!({ "t": "date", "v": d.to_rfc3339_opts(SecondsFormat::AutoSi, true) })
        }
        CacheValue::List(items) => {
            json!({ "t": "list", "v": items.iter().map(value_to_wire).collect::<Vec<_>>() })
        }
        CacheValue::Set(items) => {
            json!({ "t": "set", "v": items.iter().map(value_to_wire).collect::<Vec<_>>() })
        }
        CacheValue::Map(pairs) => json!({
            "t": "map",
            "v": pairs
                .iter()
                .map(|(k, v)| json!([value_to_wire(k), value_to_wire(v)]))
                .collect::<Vec<_>>(),
        }),
        CacheValue::Record(fields) => json!({
            "t": "rec",
            "v": fields
                .iter()
                .map(|(name, v)| json!([name, value_to_wire(v)]))
                .collect::<Vec<_>>(),
        }),
    }
}

fn non_finite_repr(n: f64) -> &'static str {
    if n.is_nan() {
        "NaN"
    } else if n > 0.0 {
        "Infinity"
    } else {
        "-Infinity"
    }
}

fn wire_to_value(wire: &Json) -> Result<CacheValue> {
    let tag = wire
        .get("t")
        .and_then(Json::as_str)
        .ok_or_else(|| malformed("value missing type tag"))?;
    let payload = wire.get("v");

    match tag {
        "null" => Ok(CacheValue::Null),
        "bool" => payload
            .and_then(Json::as_bool)
            .map(CacheValue::Bool)
            .ok_or_else(|| malformed("bool payload")),
        "num" => match payload {
            Some(Json::Number(n)) => n
                .as_f64()
                .map(CacheValue::Number)
                .ok_or_else(|| malformed("number payload")),
            Some(Json::String(s)) => match s.as_str() {
                "NaN" => Ok(CacheValue::Number(f64::NAN)),
                "Infinity" => Ok(CacheValue::Number(f64::INFINITY)),
                "-Infinity" => Ok(CacheValue::Number(f64::NEG_INFINITY)),
                other => Err(malformed(format!("unknown number literal {other:?}"))),
            },
            _ => Err(malformed("number payload")),
        },
        "str" => payload
            .and_then(Json::as_str)
            .map(|s| CacheValue::String(s.to_string()))
            .ok_or_else(|| malformed("string payload")),
        "bigint" => payload
            .and_then(Json::as_str)
            .ok_or_else(|| malformed("bigint payload"))?
            .parse::<i128>()
            .map(CacheValue::BigInt)
            .map_err(|e| malformed(format!("bad bigint: {e}"))),
        "date" => {
            let s = payload
                .and_then(Json::as_str)
                .ok_or_else(|| malformed("date payload"))?;
            DateTime::parse_from_rfc3339(s)
                .map(|d| CacheValue::Date(d.with_timezone(&Utc)))
                .map_err(|e| malformed(format!("bad date: {e}")))
        }
        "list" | "set" => {
            let items = payload
                .and_then(Json::as_array)
                .ok_or_else(|| malformed("container payload"))?
                .iter()
                .map(wire_to_value)
                .collect::<Result<Vec<_>>>()?;
            Ok(if tag == "list" {
                CacheValue::List(items)
            } else {
                CacheValue::Set(items)
            })
        }
        "map" => {
            let pairs = payload
                .and_then(Json::as_array)
                .ok_or_else(|| malformed("map payload"))?
                .iter()
                .map(|item| {
                    let pair = item
                        .as_array()
                        .filter(|items| items.len() == 2)
                        .ok_or_else(|| malformed("map entry is not a pair"))?;
                    Ok((wire_to_value(&pair[0])?, wire_to_value(&pair[1])?))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(CacheValue::Map(pairs))
        }
        "rec" => {
            let fields = payload
                .and_then(Json::as_array)
                .ok_or_else(|| malformed("record payload"))?
                .iter()
                .map(|item| {
                    let (name, wire) = as_pair(item)?;
                    Ok((name.to_string(), wire_to_value(wire)?))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(CacheValue::Record(fields))
        }
        other => Err(malformed(format!("unknown type tag {other:?}"))),
    }
}
