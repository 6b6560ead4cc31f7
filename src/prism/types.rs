use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/v1/search`.
#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<&'a str>,
    pub top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(default, alias = "id")]
    pub document_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Prism reports relevance as `score`; older deployments use `similarity`.
    #[serde(default, alias = "similarity")]
    pub score: Option<f64>,
    #[serde(default)]
    pub metadata: Value,
}

/// A stored document from `GET /api/v1/documents[/{id}]`.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    #[serde(default, alias = "document_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}

#[derive(Debug, Deserialize)]
pub struct DocumentList {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub total: u64,
}

/// Query parameters for the document listing endpoint.
#[derive(Debug, Default)]
pub struct ListParams<'a> {
    pub domain: Option<&'a str>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub filters: Vec<(&'a str, String)>,
}

// Metadata accessors. Missing or mistyped fields read as `None` so callers
// can choose their own fallbacks instead of failing the whole response.

pub(crate) fn meta_str(metadata: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match &metadata[*k] {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub(crate) fn meta_f64(metadata: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| match &metadata[*k] {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

pub(crate) fn meta_u32(metadata: &Value, keys: &[&str]) -> Option<u32> {
    meta_f64(metadata, keys)
        .filter(|n| n.is_finite() && *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32)
}

pub(crate) fn meta_str_list(metadata: &Value, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .find_map(|k| metadata[*k].as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
