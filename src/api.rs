//! HTTP client for the request-bin backend.

use std::time::Duration;

use reqwest::Response;
use serde_json::Value;

use crate::error::{ConsoleError, Result};
use crate::model::{Bin, BinDetail, UpdateResponse};

const BIN_ID_MARKER: &str = "Bin ID: ";

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list_bins(&self) -> Result<Vec<Bin>> {
        let resp = self.client.get(self.url("/api/bins")).send().await?;
        let bins = ensure_success(resp, "fetch bins")?.json().await?;
        Ok(bins)
    }

    pub async fn get_bin_detail(&self, id: &str) -> Result<BinDetail> {
        let resp = self
            .client
            .get(self.url(&format!("/api/bins/{}", id)))
            .send()
            .await?;
        let detail = ensure_success(resp, "fetch bin detail")?.json().await?;
        Ok(detail)
    }

    pub async fn update_bin_response(&self, id: &str, status: u16, body: &Value) -> Result<()> {
        let resp = self
            .client
            .put(self.url(&format!("/api/bins/{}/response", id)))
            .json(&UpdateResponse { status, body })
            .send()
            .await?;
        ensure_success(resp, "update response")?;
        Ok(())
    }

    /// Ask the backend for a fresh bin.
    ///
    /// `Ok(None)` means the call succeeded but no identifier could be found
    /// in what came back.
    pub async fn create_bin(&self) -> Result<Option<String>> {
        let resp = self.client.get(self.url("/create")).send().await?;
        let text = ensure_success(resp, "create bin")?.text().await?;
        Ok(extract_bin_id(&text))
    }
}

fn ensure_success(resp: Response, context: &'static str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(ConsoleError::Status {
            status: status.as_u16(),
            context,
        })
    }
}

/// Pull the bin identifier out of a `/create` response.
///
/// A JSON object with a string `id` wins. Otherwise the first `Bin ID: `
/// marker followed by a non-empty rest of line is used.
pub fn extract_bin_id(text: &str) -> Option<String> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        if let Some(Value::String(id)) = map.get("id") {
            return Some(id.clone());
        }
    }

    text.match_indices(BIN_ID_MARKER).find_map(|(start, marker)| {
        let rest = &text[start + marker.len()..];
        let id = rest.split('\n').next().unwrap_or_default();
        (!id.is_empty()).then(|| id.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_creation_text() {
        assert_eq!(
            extract_bin_id("Created!\nBin ID: abc123\n"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn extracts_id_from_backend_format() {
        let text = concat!(
            "Bin ID: 0b7e9a52-1c1f-4e0c-9b55-4f1d7b1e2a10\n",
            "URL: /bin/0b7e9a52-1c1f-4e0c-9b55-4f1d7b1e2a10"
        );
        assert_eq!(
            extract_bin_id(text).as_deref(),
            Some("0b7e9a52-1c1f-4e0c-9b55-4f1d7b1e2a10")
        );
    }

    #[test]
    fn id_runs_to_end_of_text_without_newline() {
        assert_eq!(extract_bin_id("Bin ID: tail").as_deref(), Some("tail"));
    }

    #[test]
    fn missing_marker_yields_none() {
        assert_eq!(extract_bin_id("Created!\nsomething else\n"), None);
        assert_eq!(extract_bin_id(""), None);
    }

    #[test]
    fn empty_id_line_is_skipped() {
        assert_eq!(extract_bin_id("Bin ID: \nBin ID: second\n").as_deref(), Some("second"));
        assert_eq!(extract_bin_id("Bin ID: \n"), None);
    }

    #[test]
    fn structured_response_is_preferred() {
        assert_eq!(
            extract_bin_id(r#"{"id": "json-id", "url": "/bin/json-id"}"#).as_deref(),
            Some("json-id")
        );
        assert_eq!(extract_bin_id(r#"{"url": "/bin/x"}"#), None);
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let api = ApiClient::new("http://localhost:9997/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.base_url(), "http://localhost:9997");
        assert_eq!(api.url("/api/bins"), "http://localhost:9997/api/bins");
    }
}
