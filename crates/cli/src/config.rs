use anyhow::{Context as AnyhowContext, Result};
use phrasefind_search::SearchConfig;
use reqwest::Url;
use std::fmt;
use std::time::Duration;

pub(crate) const PROXY_URL_ENV: &str = "PHRASEFIND_PROXY_URL";
pub(crate) const PROXY_API_KEY_ENV: &str = "PHRASEFIND_PROXY_API_KEY";
pub(crate) const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Secondary fetch route used when the direct request fails.
///
/// The target page is requested as `{base}?api_key=<key>&url=<target>`.
#[derive(Clone)]
pub(crate) struct ProxyConfig {
    base: Url,
    api_key: String,
}

impl ProxyConfig {
    /// Both parts must be present for the fallback to be enabled.
    pub(crate) fn from_parts(url: Option<&str>, api_key: Option<&str>) -> Result<Option<Self>> {
        let url = url.map(str::trim).filter(|v| !v.is_empty());
        let api_key = api_key.map(str::trim).filter(|v| !v.is_empty());

        match (url, api_key) {
            (None, None) => Ok(None),
            (Some(url), Some(api_key)) => {
                let base = Url::parse(url).with_context(|| format!("Invalid proxy URL: {url}"))?;
                Ok(Some(Self {
                    base,
                    api_key: api_key.to_string(),
                }))
            }
            _ => anyhow::bail!(
                "Proxy fallback needs both a URL and an API key (--proxy-url/{PROXY_URL_ENV} and --proxy-api-key/{PROXY_API_KEY_ENV})"
            ),
        }
    }

    pub(crate) fn request_url(&self, target: &str) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("url", target);
        url
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("base", &self.base.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Settings fixed at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub(crate) struct ServiceConfig {
    pub defaults: SearchConfig,
    pub proxy: Option<ProxyConfig>,
    pub fetch_timeout: Duration,
}

impl ServiceConfig {
    pub(crate) fn new(
        defaults: SearchConfig,
        proxy: Option<ProxyConfig>,
        fetch_timeout: Duration,
    ) -> Result<Self> {
        defaults
            .validate()
            .context("Invalid default search configuration")?;
        Ok(Self {
            defaults,
            proxy,
            fetch_timeout,
        })
    }

    /// Apply per-request overrides on top of the startup defaults.
    ///
    /// `fuzzy_distance` is taken only when it is a positive integer; word
    /// counts only when they are non-negative integers. Anything else keeps
    /// the default.
    pub(crate) fn search_config_for(
        &self,
        fuzzy_distance: Option<&str>,
        count_before: Option<&str>,
        count_after: Option<&str>,
    ) -> SearchConfig {
        let mut config = self.defaults;
        if let Some(value) = parse_count(fuzzy_distance).filter(|v| *v > 0) {
            config.fuzzy_distance = value;
        }
        if let Some(value) = parse_count(count_before) {
            config.words_before = value;
        }
        if let Some(value) = parse_count(count_after) {
            config.words_after = value;
        }
        config
    }
}

fn parse_count(raw: Option<&str>) -> Option<usize> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<usize>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ServiceConfig {
        ServiceConfig::new(
            SearchConfig::default(),
            None,
            Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        )
        .unwrap()
    }

    #[test]
    fn overrides_apply_only_when_valid() {
        let config = service().search_config_for(Some("5"), Some("2"), Some("3"));
        assert_eq!(config, SearchConfig::default().with_fuzzy_distance(5).with_context(2, 3));

        let config = service().search_config_for(Some("0"), Some("-1"), Some("many"));
        assert_eq!(config, SearchConfig::default());

        let config = service().search_config_for(None, Some(" 4 "), Some(""));
        assert_eq!(config, SearchConfig::default().with_context(4, 0));
    }

    #[test]
    fn invalid_defaults_are_rejected_at_startup() {
        let err = ServiceConfig::new(
            SearchConfig::default().with_fuzzy_distance(0),
            None,
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid default search configuration"));
    }

    #[test]
    fn proxy_requires_both_parts() {
        assert!(ProxyConfig::from_parts(None, None).unwrap().is_none());
        assert!(ProxyConfig::from_parts(Some("http://proxy.local/"), None).is_err());
        assert!(ProxyConfig::from_parts(None, Some("key")).is_err());
        assert!(ProxyConfig::from_parts(Some("not a url"), Some("key")).is_err());
    }

    #[test]
    fn proxy_request_url_encodes_target() {
        let proxy = ProxyConfig::from_parts(Some("http://proxy.local/"), Some("k3y"))
            .unwrap()
            .unwrap();
        let url = proxy.request_url("https://example.com/a?b=c&d=e");
        assert_eq!(
            url.as_str(),
            "http://proxy.local/?api_key=k3y&url=https%3A%2F%2Fexample.com%2Fa%3Fb%3Dc%26d%3De"
        );
    }

    #[test]
    fn proxy_debug_hides_api_key() {
        let proxy = ProxyConfig::from_parts(Some("http://proxy.local/"), Some("secret"))
            .unwrap()
            .unwrap();
        let rendered = format!("{proxy:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("proxy.local"));
    }
}
