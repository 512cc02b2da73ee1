//! Wire types for the request-bin backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Summary of one bin as listed by `GET /api/bins`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub id: String,
    pub url: String,
    /// RFC 3339 creation time. The backend falls back to `"unknown"` when the
    /// filesystem cannot report one.
    pub created: String,
}

/// The response a bin serves to whoever calls it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseConfig {
    pub status: u16,
    pub body: Value,
}

/// One request captured against a bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub method: String,
    pub timestamp: String,
    pub body: Value,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Full detail of one bin, as returned by `GET /api/bins/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinDetail {
    pub id: String,
    pub url: String,
    pub response: ResponseConfig,
    #[serde(default)]
    pub recent_logs: Vec<LogEntry>,
}

/// Body of `PUT /api/bins/{id}/response`.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateResponse<'a> {
    pub status: u16,
    pub body: &'a Value,
}
