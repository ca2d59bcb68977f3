use anyhow::Result;
use phrasefind_search::SearchResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Body of a successful search response.
///
/// Field names are the ones existing clients read; a miss is reported with
/// `found: false` and an empty `foundText`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct SearchResponse {
    #[serde(rename = "searchRequest")]
    pub search_request: String,
    #[serde(default)]
    pub url: String,
    pub found: bool,
    pub before: String,
    #[serde(rename = "foundText")]
    pub found_text: String,
    pub after: String,
}

impl SearchResponse {
    pub fn from_result(result: SearchResult, url: impl Into<String>) -> Self {
        Self {
            found: result.is_found(),
            search_request: result.query,
            url: url.into(),
            before: result.before,
            found_text: result.matched_text,
            after: result.after,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(
        rename = "innerError",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub inner_error: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            inner_error: None,
        }
    }

    pub fn with_inner(mut self, inner: impl ToString) -> Self {
        self.inner_error = Some(inner.to_string());
        self
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}
