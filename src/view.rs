//! Pure data to view-model transforms.
//!
//! Nothing in here touches egui; the painting code in `app` only lays out
//! what these functions produce.

use chrono::{DateTime, Local, Utc};
use serde_json::Value;

use crate::error::{ConsoleError, Result};
use crate::model::{Bin, LogEntry};

pub const BINS_EMPTY: &str = "No bins yet. Create your first bin to get started!";
pub const BINS_LOADING: &str = "Loading bins...";
pub const BINS_FAILED: &str = "Failed to load bins. Press Refresh to try again.";
pub const LOGS_EMPTY: &str =
    "No requests captured yet. Send a request to this bin to see it here.";

const BIN_STATUS: &str = "Active";

#[derive(Debug, Clone, PartialEq)]
pub struct BinCard {
    pub id: String,
    pub status: &'static str,
    pub url: String,
    pub created: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BinsView {
    Empty,
    Cards(Vec<BinCard>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub method: String,
    pub when: String,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

pub fn bins_view(bins: &[Bin], now: DateTime<Utc>) -> BinsView {
    if bins.is_empty() {
        return BinsView::Empty;
    }

    BinsView::Cards(
        bins.iter()
            .map(|bin| BinCard {
                id: bin.id.clone(),
                status: BIN_STATUS,
                url: bin.url.clone(),
                created: format!("Created {}", format_date(&bin.created, now)),
            })
            .collect(),
    )
}

/// Rows for the captured-request list. Empty input gives no rows and the
/// caller shows [`LOGS_EMPTY`].
pub fn log_rows(logs: &[LogEntry], now: DateTime<Utc>) -> Vec<LogRow> {
    logs.iter()
        .map(|log| LogRow {
            method: log.method.clone(),
            when: format_date(&log.timestamp, now),
            body: pretty_json(&log.body),
            headers: log
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        })
        .collect()
}

/// Relative age of an RFC 3339 timestamp, measured against `now`.
///
/// Each bucket uses the floor of the elapsed time; a week or more falls back
/// to an absolute local date.
pub fn format_date(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(date) = DateTime::parse_from_rfc3339(timestamp) else {
        return "Invalid Date".to_string();
    };

    let elapsed = now.signed_duration_since(date);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if days < 7 {
        format!("{}d ago", days)
    } else {
        date.with_timezone(&Local).format("%-d %b %Y").to_string()
    }
}

/// Parse `text` as JSON. The error's display form is the inline message.
pub fn validate_json(text: &str) -> Result<Value> {
    serde_json::from_str::<Value>(text).map_err(|e| ConsoleError::InvalidJson(e.to_string()))
}

/// Two-space indented JSON, the same shape the editor shows.
pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
