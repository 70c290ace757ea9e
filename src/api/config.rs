use tokio_util::sync::CancellationToken;

pub const FALLBACK_BASE_URL: &str = "http://localhost:8001";
pub const BASE_URL_ENV: &str = "PRISM_API_BASE_URL";

#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    pub base_url: Option<String>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self { base_url: std::env::var(BASE_URL_ENV).ok() }
    }
}

/// Per-call knobs every API operation accepts.
#[derive(Clone, Debug, Default)]
pub struct CallOptions {
    pub base_url: Option<String>,
    pub cancel: Option<CancellationToken>,
}

impl CallOptions {
    pub fn with_cancel(&self, cancel: CancellationToken) -> Self {
        Self { base_url: self.base_url.clone(), cancel: Some(cancel) }
    }
}

// First non-blank of override, configured default, fallback; trailing slashes dropped.
pub fn resolve_base_url(override_url: Option<&str>, configured: Option<&str>) -> String {
    [override_url, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(FALLBACK_BASE_URL)
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_config() {
        assert_eq!(
            resolve_base_url(Some("http://example.test/"), Some("http://cfg.test")),
            "http://example.test"
        );
    }

    #[test]
    fn blank_values_are_skipped() {
        assert_eq!(resolve_base_url(Some("   "), Some(" http://cfg.test// ")), "http://cfg.test");
        assert_eq!(resolve_base_url(Some(""), None), FALLBACK_BASE_URL);
        assert_eq!(resolve_base_url(None, None), "http://localhost:8001");
    }
}
