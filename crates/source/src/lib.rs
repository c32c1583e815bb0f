//! Catalog item sources.
//!
//! Provides the `CatalogSource` trait and its file and HTTP implementations.
//! Sources only deliver snapshots; the query engine never sees transport
//! concerns, and a source failure is reported to the caller rather than
//! turned into an empty listing.

use elecmat_model::CatalogItem;
use serde_json::Value;
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from item source operations.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Source not available")]
    Unavailable,
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::ParseError(e.to_string())
    }
}

/// Trait for item sources (snapshot files, cache tables, etc.)
pub trait CatalogSource {
    /// Fetch the current catalog snapshot.
    fn fetch(&self) -> impl Future<Output = Result<Vec<CatalogItem>, SourceError>> + Send;

    /// Check if the source is reachable.
    fn health_check(&self) -> impl Future<Output = Result<(), SourceError>> + Send;

    /// Get the source name for logging.
    fn name(&self) -> &'static str;
}

/// Decode a snapshot document into items.
///
/// Accepts a bare array of items, a cache row carrying `materials_data`, or
/// an array of such rows. Records or rows that fail to decode are skipped
/// with a warning; only an unusable root is an error.
pub fn decode_snapshot(value: Value) -> Result<Vec<CatalogItem>, SourceError> {
    match value {
        Value::Array(entries) => {
            let mut items = Vec::with_capacity(entries.len());
            for mut entry in entries {
                let nested = match &mut entry {
                    Value::Object(row) => row.remove("materials_data"),
                    _ => None,
                };
                match nested {
                    Some(data) => match decode_snapshot(data) {
                        Ok(rows) => items.extend(rows),
                        Err(e) => tracing::warn!(error = %e, "Skipping undecodable cache row"),
                    },
                    None => items.extend(decode_item(entry)),
                }
            }
            Ok(items)
        }
        Value::Object(mut row) => match row.remove("materials_data") {
            Some(Value::Null) => Ok(Vec::new()),
            Some(data) => decode_snapshot(data),
            None => Err(SourceError::ParseError(
                "Object snapshot without materials_data".to_string(),
            )),
        },
        Value::Null => Ok(Vec::new()),
        other => Err(SourceError::ParseError(format!(
            "Unexpected snapshot root: {}",
            type_name(&other)
        ))),
    }
}

fn decode_item(entry: Value) -> Option<CatalogItem> {
    match serde_json::from_value::<CatalogItem>(entry) {
        Ok(item) => Some(item),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping undecodable catalog record");
            None
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Snapshot stored as a JSON file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl CatalogSource for FileSource {
    async fn fetch(&self) -> Result<Vec<CatalogItem>, SourceError> {
        tracing::debug!(path = %self.path.display(), "Reading catalog snapshot");

        let content = tokio::fs::read_to_string(&self.path).await?;
        let value: Value = serde_json::from_str(&content)?;
        decode_snapshot(value)
    }

    async fn health_check(&self) -> Result<(), SourceError> {
        let meta = tokio::fs::metadata(&self.path).await?;
        if meta.is_file() {
            Ok(())
        } else {
            Err(SourceError::Unavailable)
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// HTTP source configuration.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Base URL of the REST API
    pub base_url: String,
    /// Cache table holding snapshots
    pub table: String,
    /// Sent as `apikey` and bearer token when set
    pub api_key: Option<String>,
    /// Restrict to one category row
    pub category: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:54321".to_string(),
            table: "materials_weekly_cache".to_string(),
            api_key: None,
            category: None,
            timeout_secs: 30,
        }
    }
}

/// Snapshot served by a REST cache table.
pub struct HttpSource {
    config: HttpSourceConfig,
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a new HTTP source.
    pub fn new(config: HttpSourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.table
        )
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("select", "materials_data".to_string())];
        if let Some(category) = &self.config.category {
            params.push(("category", format!("eq.{}", category)));
        }
        params
    }

    fn request(&self, url: String) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(key) = &self.config.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }
        request
    }
}

impl CatalogSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<CatalogItem>, SourceError> {
        let url = self.table_url();

        tracing::debug!(url = %url, category = ?self.config.category, "Fetching catalog snapshot");

        let response = self
            .request(url)
            .query(&self.query_params())
            .send()
            .await
            .map_err(|e| SourceError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::RequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))?;

        decode_snapshot(json)
    }

    async fn health_check(&self) -> Result<(), SourceError> {
        let url = format!("{}/rest/v1/", self.config.base_url.trim_end_matches('/'));
        let response = self
            .request(url)
            .send()
            .await
            .map_err(|e| SourceError::Connection(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SourceError::Unavailable)
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn names(items: &[CatalogItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_decode_bare_array() {
        let items = decode_snapshot(json!([
            {"id": 1, "name": "Hager MCB", "price": "£4.20"},
            {"id": "2", "name": "Wago 221", "price": "£0.45", "stockStatus": "In Stock"}
        ]))
        .unwrap();
        assert_eq!(names(&items), vec!["Hager MCB", "Wago 221"]);
    }

    #[test]
    fn test_decode_skips_bad_records() {
        let items = decode_snapshot(json!([
            {"name": "Good", "price": "£1"},
            {"price": "£2"},
            42,
            {"name": "Also good"}
        ]))
        .unwrap();
        assert_eq!(names(&items), vec!["Good", "Also good"]);
    }

    #[test]
    fn test_decode_cache_rows() {
        let items = decode_snapshot(json!([
            {"materials_data": [{"name": "T&E 2.5mm", "price": "£89.99"}]},
            {"materials_data": null},
            {"materials_data": [{"name": "SWA 10mm", "price": "£640.00"}]}
        ]))
        .unwrap();
        assert_eq!(names(&items), vec!["T&E 2.5mm", "SWA 10mm"]);
    }

    #[test]
    fn test_decode_skips_bad_cache_rows() {
        let items = decode_snapshot(json!([
            {"materials_data": "stale"},
            {"materials_data": 7},
            {"materials_data": {"category": "cables"}},
            {"materials_data": [{"name": "Wago 221", "price": "£0.45"}]}
        ]))
        .unwrap();
        assert_eq!(names(&items), vec!["Wago 221"]);
    }

    #[test]
    fn test_decode_single_row() {
        let items = decode_snapshot(json!({
            "category": "cables",
            "materials_data": [{"name": "Flex 3183Y", "price": "£30.00"}]
        }))
        .unwrap();
        assert_eq!(names(&items), vec!["Flex 3183Y"]);
    }

    #[test]
    fn test_decode_rejects_scalar_root() {
        assert!(matches!(
            decode_snapshot(json!("items")),
            Err(SourceError::ParseError(_))
        ));
        assert!(matches!(
            decode_snapshot(json!({"items": []})),
            Err(SourceError::ParseError(_))
        ));
    }

    #[test]
    fn test_http_request_shape() {
        let source = HttpSource::new(HttpSourceConfig {
            base_url: "https://example.test/".to_string(),
            category: Some("cables".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            source.table_url(),
            "https://example.test/rest/v1/materials_weekly_cache"
        );
        assert_eq!(
            source.query_params(),
            vec![
                ("select", "materials_data".to_string()),
                ("category", "eq.cables".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_file_source_roundtrip() {
        let path = std::env::temp_dir().join(format!("elecmat-source-{}.json", std::process::id()));
        tokio::fs::write(&path, r#"[{"name": "Crabtree socket", "price": "£6.10"}]"#)
            .await
            .unwrap();

        let source = FileSource::new(&path);
        source.health_check().await.unwrap();
        let items = source.fetch().await.unwrap();
        assert_eq!(names(&items), vec!["Crabtree socket"]);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_source_missing() {
        let source = FileSource::new("/nonexistent/elecmat/snapshot.json");
        assert!(matches!(source.fetch().await, Err(SourceError::Io(_))));
        assert!(source.health_check().await.is_err());
    }
}
