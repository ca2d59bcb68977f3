use crate::config::ServiceConfig;
use crate::fetch::{is_url, PageSource};
use crate::html_text::html_to_text;
use axum::{
    body::Body,
    extract::{Form, State},
    http::{Response as HttpResponse, StatusCode},
    response::{Html, Response},
    routing::get,
    Router,
};
use phrasefind_protocol::{serialize_json, ErrorEnvelope, SearchResponse};
use phrasefind_search::search;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub(crate) const TEST_FORM: &str = r#"<!DOCTYPE html><html><body>
<form action="/api/search" method="POST">
<input type="text" name="url" placeholder="url" size=100><br>
<input type="text" name="search" placeholder="string" size=100><br>
<input type="number" name="count_before" placeholder="count_before" size=100><br>
<input type="number" name="count_after" placeholder="count_after" size=100><br>
<input type="number" name="fuzzy_distance" placeholder="fuzzy_distance" size=100><br>
<input type="submit" value="Search">
</form>
</body></html>"#;

pub(crate) struct HttpState {
    pub config: ServiceConfig,
    pub source: Box<dyn PageSource>,
}

/// Query string (GET) or urlencoded body (POST) of `/api/search`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchParams {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub fuzzy_distance: Option<String>,
    #[serde(default)]
    pub count_before: Option<String>,
    #[serde(default)]
    pub count_after: Option<String>,
}

pub(crate) type ApiError = (StatusCode, ErrorEnvelope);

pub(crate) fn router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/test", get(test_form))
        .route("/api/search", get(search_endpoint).post(search_endpoint))
        .route("/health", get(health))
        .with_state(state)
}

async fn test_form() -> Html<&'static str> {
    Html(TEST_FORM)
}

async fn health() -> Result<Response, StatusCode> {
    #[derive(Serialize)]
    struct Health {
        status: &'static str,
    }
    build_response(StatusCode::OK, &Health { status: "ok" })
}

async fn search_endpoint(
    State(state): State<Arc<HttpState>>,
    Form(params): Form<SearchParams>,
) -> Result<Response, StatusCode> {
    match run_search_request(params, &state).await {
        Ok(response) => build_response(StatusCode::OK, &response),
        Err((status, envelope)) => {
            log::info!("search request rejected: {status} {}", envelope.error);
            build_response(status, &envelope)
        }
    }
}

/// Validate, fetch, convert and search; every failure maps to a status and envelope.
pub(crate) async fn run_search_request(
    params: SearchParams,
    state: &HttpState,
) -> Result<SearchResponse, ApiError> {
    let url = params.url.as_deref().map(str::trim).unwrap_or_default();
    let needle = params.search.as_deref().unwrap_or_default();
    if url.is_empty() || needle.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            ErrorEnvelope::new("Missing required parameters"),
        ));
    }
    if !is_url(url) {
        return Err((StatusCode::BAD_REQUEST, ErrorEnvelope::new("Wrong URL format")));
    }

    let config = state.config.search_config_for(
        params.fuzzy_distance.as_deref(),
        params.count_before.as_deref(),
        params.count_after.as_deref(),
    );

    let body = state.source.fetch(url).await.map_err(|err| {
        if err.is_unreachable() {
            (
                StatusCode::NOT_FOUND,
                ErrorEnvelope::new("Not found").with_inner(&err),
            )
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorEnvelope::new("Request error").with_inner(&err),
            )
        }
    })?;

    let needle_owned = needle.to_string();
    let outcome = tokio::task::spawn_blocking(move || {
        let text = html_to_text(&body);
        search(&needle_owned, &text, &config)
    })
    .await
    .map_err(|err| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorEnvelope::new("Error in parsing response").with_inner(err),
        )
    })?;

    let result = outcome.map_err(|err| {
        (
            StatusCode::BAD_REQUEST,
            ErrorEnvelope::new("Invalid configuration").with_inner(err),
        )
    })?;

    log::debug!("search {:?} on {url}: found={}", needle, result.is_found());
    Ok(SearchResponse::from_result(result, url))
}

pub(crate) fn build_response<T: Serialize>(
    status: StatusCode,
    body: &T,
) -> Result<Response, StatusCode> {
    let bytes = serialize_json(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .into_bytes();

    HttpResponse::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(bytes))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use async_trait::async_trait;
    use phrasefind_search::SearchConfig;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::time::Duration;

    struct StubSource {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageSource for StubSource {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Request {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                })
        }
    }

    const PAGE_URL: &str = "https://shop.example/item";
    const PAGE: &str = "<html><body><h1>Top Skill:Brand</h1>\n<p>All new  arrivals today</p></body></html>";

    fn state() -> HttpState {
        let mut pages = HashMap::new();
        pages.insert(PAGE_URL.to_string(), PAGE.to_string());
        HttpState {
            config: ServiceConfig::new(SearchConfig::default(), None, Duration::from_secs(1))
                .unwrap(),
            source: Box::new(StubSource { pages }),
        }
    }

    fn params(url: &str, search: &str) -> SearchParams {
        SearchParams {
            url: Some(url.to_string()),
            search: Some(search.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn finds_phrase_with_context() {
        let mut request = params(PAGE_URL, "brand");
        request.count_before = Some("2".to_string());
        request.count_after = Some("2".to_string());
        request.fuzzy_distance = Some("1".to_string());

        let response = run_search_request(request, &state()).await.unwrap();
        assert_eq!(
            response,
            SearchResponse {
                search_request: "brand".to_string(),
                url: PAGE_URL.to_string(),
                found: true,
                before: "Top".to_string(),
                found_text: "Brand".to_string(),
                after: "All new".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn miss_is_ok_with_empty_found_text() {
        let mut request = params(PAGE_URL, "zebra");
        request.fuzzy_distance = Some("1".to_string());
        let response = run_search_request(request, &state()).await.unwrap();
        assert!(!response.found);
        assert_eq!(response.found_text, "");
    }

    #[tokio::test]
    async fn missing_parameters_are_bad_request() {
        let (status, envelope) = run_search_request(params("", "brand"), &state())
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(envelope.error, "Missing required parameters");

        let (status, _) = run_search_request(SearchParams::default(), &state())
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_url_is_bad_request() {
        let (status, envelope) = run_search_request(params("shop.example/item", "brand"), &state())
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(envelope, ErrorEnvelope::new("Wrong URL format"));
    }

    #[tokio::test]
    async fn unreachable_page_is_not_found() {
        let (status, envelope) =
            run_search_request(params("https://down.example/", "brand"), &state())
                .await
                .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(envelope.error, "Not found");
        assert!(envelope
            .inner_error
            .as_deref()
            .is_some_and(|inner| inner.contains("connection refused")));
    }

    #[tokio::test]
    async fn invalid_overrides_fall_back_to_defaults() {
        let mut request = params(PAGE_URL, "brand");
        request.fuzzy_distance = Some("0".to_string());
        request.count_after = Some("-3".to_string());
        let response = run_search_request(request, &state()).await.unwrap();
        assert!(response.found);
        assert_eq!(response.after, "");
    }

    #[test]
    fn build_response_sets_json_content_type() {
        let response =
            build_response(StatusCode::NOT_FOUND, &ErrorEnvelope::new("Not found")).unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
    }
}
