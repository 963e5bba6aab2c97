//! Decoding of a single csTimer export document.
//!
//! An export is one JSON object. Two of its fields,
//! `properties.sessionData` and `properties.scrFlt`, are themselves JSON
//! documents serialized into strings. Decoding is done in two explicit
//! stages so that a broken outer file and a broken embedded field surface as
//! different errors:
//!
//! 1. [`decode_outer`] parses the file text.
//! 2. [`SessionLog::from_outer`] parses the embedded strings and checks the
//!    shape the record conversion relies on.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cstimer_core::models::SolveRecord;
use cstimer_core::settings::ParseOptions;
use cstimer_core::time_utils::epoch_seconds_to_utc;
use cstimer_core::{CsTimerError, Result};
use serde_json::{Map, Value};

const PROPERTIES_KEY: &str = "properties";
const SESSION_DATA_KEY: &str = "sessionData";
const SCRAMBLE_FILTER_KEY: &str = "scrFlt";
const SESSION_KEY_PREFIX: &str = "session";

/// Per-session metadata from `sessionData`, keyed by session id.
#[derive(Debug, Clone)]
pub struct SessionMeta {
    /// The raw `opt` block; `None` when absent or blank.
    pub opt: Option<Map<String, Value>>,
}

impl SessionMeta {
    /// The session's scramble type.
    ///
    /// An absent, `null` or empty `opt` yields the configured default. A
    /// populated `opt` must carry a string `scrType`.
    pub fn scramble_type(&self, options: &ParseOptions) -> std::result::Result<String, String> {
        match &self.opt {
            None => Ok(options.default_scramble_type.clone()),
            Some(opt) if opt.is_empty() => Ok(options.default_scramble_type.clone()),
            Some(opt) => opt
                .get("scrType")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| "session options carry no string 'scrType'".to_string()),
        }
    }
}

/// One decoded `[intervals, scramble, _, epoch_seconds, ...]` tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveEntry {
    /// `intervals[0]`: `2` for +2, negative for DNF.
    pub penalty: f64,
    /// `intervals[1]`: measured time in milliseconds.
    pub time_ms: f64,
    pub scramble: String,
    pub epoch_secs: f64,
}

impl SolveEntry {
    /// Decode a solve tuple, returning a description of the first mismatch.
    pub fn from_value(value: &Value) -> std::result::Result<Self, String> {
        let items = value
            .as_array()
            .ok_or_else(|| "solve entry is not an array".to_string())?;
        if items.len() < 4 {
            return Err(format!(
                "solve entry has {} elements, expected at least 4",
                items.len()
            ));
        }

        let intervals = items[0]
            .as_array()
            .ok_or_else(|| "solve intervals are not an array".to_string())?;
        let interval = |idx: usize| {
            intervals
                .get(idx)
                .and_then(Value::as_f64)
                .ok_or_else(|| format!("solve interval {} is missing or not a number", idx))
        };
        let penalty = interval(0)?;
        let time_ms = interval(1)?;

        let scramble = items[1]
            .as_str()
            .ok_or_else(|| "solve scramble is not a string".to_string())?
            .to_string();

        let epoch_secs = items[3]
            .as_f64()
            .ok_or_else(|| "solve timestamp is not a number".to_string())?;

        Ok(Self {
            penalty,
            time_ms,
            scramble,
            epoch_secs,
        })
    }
}

/// A fully decoded export: session metadata plus the raw solve arrays.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
    /// Decoded `sessionData`, ordered by session id.
    pub sessions: BTreeMap<String, SessionMeta>,
    /// Decoded `scrFlt`. Not used for records but must be valid JSON.
    pub scramble_filter: Value,
    root: Map<String, Value>,
}

/// Stage 1: parse the outer document text.
pub fn decode_outer(path: &Path, text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|source| CsTimerError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Stage 2 helper: parse one string-encoded field of `properties`.
fn decode_embedded(path: &Path, properties: &Map<String, Value>, field: &str) -> Result<Value> {
    let raw = properties
        .get(field)
        .ok_or_else(|| CsTimerError::shape(path, format!("missing key 'properties.{}'", field)))?
        .as_str()
        .ok_or_else(|| {
            CsTimerError::shape(path, format!("'properties.{}' is not a string", field))
        })?;

    serde_json::from_str(raw).map_err(|source| CsTimerError::EmbeddedDecode {
        path: path.to_path_buf(),
        field: field.to_string(),
        source,
    })
}

/// `true` for option values that mean "no options": `null`, `false`, zero,
/// and the empty string, array or object.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

impl SessionLog {
    /// Stage 2: decode the embedded documents of an already parsed export.
    pub fn from_outer(path: &Path, outer: Value) -> Result<Self> {
        let Value::Object(root) = outer else {
            return Err(CsTimerError::shape(path, "top-level value is not an object"));
        };

        let properties = root
            .get(PROPERTIES_KEY)
            .ok_or_else(|| CsTimerError::shape(path, "missing key 'properties'"))?
            .as_object()
            .ok_or_else(|| CsTimerError::shape(path, "'properties' is not an object"))?;

        let session_data = decode_embedded(path, properties, SESSION_DATA_KEY)?;
        let scramble_filter = decode_embedded(path, properties, SCRAMBLE_FILTER_KEY)?;

        let Value::Object(session_data) = session_data else {
            return Err(CsTimerError::shape(path, "'sessionData' is not an object"));
        };

        let mut sessions = BTreeMap::new();
        for (id, meta) in session_data {
            let Value::Object(meta) = meta else {
                return Err(CsTimerError::shape(
                    path,
                    format!("metadata of session '{}' is not an object", id),
                ));
            };
            let opt = match meta.get("opt") {
                None => None,
                Some(value) if is_blank(value) => None,
                Some(Value::Object(opt)) => Some(opt.clone()),
                Some(_) => {
                    return Err(CsTimerError::shape(
                        path,
                        format!("options of session '{}' are not an object", id),
                    ))
                }
            };
            sessions.insert(id, SessionMeta { opt });
        }

        Ok(Self {
            path: path.to_path_buf(),
            sessions,
            scramble_filter,
            root,
        })
    }

    /// Run both decode stages over file text.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let outer = decode_outer(path, text)?;
        Self::from_outer(path, outer)
    }

    /// Flatten every session's solves into records, in file order.
    pub fn to_records(&self, options: &ParseOptions) -> Result<Vec<SolveRecord>> {
        let mut records = Vec::new();

        for (id, meta) in &self.sessions {
            let scramble_type = meta
                .scramble_type(options)
                .map_err(|detail| self.shape(format!("session '{}': {}", id, detail)))?;

            let key = format!("{}{}", SESSION_KEY_PREFIX, id);
            let solves = self
                .root
                .get(&key)
                .ok_or_else(|| self.shape(format!("missing key '{}'", key)))?
                .as_array()
                .ok_or_else(|| self.shape(format!("'{}' is not an array", key)))?;

            for (idx, value) in solves.iter().enumerate() {
                let entry = SolveEntry::from_value(value)
                    .map_err(|detail| self.shape(format!("{}[{}]: {}", key, idx, detail)))?;
                let datetime = epoch_seconds_to_utc(entry.epoch_secs).ok_or_else(|| {
                    self.shape(format!(
                        "{}[{}]: timestamp {} is out of range",
                        key, idx, entry.epoch_secs
                    ))
                })?;

                records.push(SolveRecord::from_intervals(
                    entry.penalty,
                    entry.time_ms,
                    entry.scramble,
                    datetime,
                    scramble_type.clone(),
                ));
            }
        }

        Ok(records)
    }

    fn shape(&self, detail: String) -> CsTimerError {
        CsTimerError::shape(&self.path, detail)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
