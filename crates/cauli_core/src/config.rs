use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;
use crate::progress::ProgressMode;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub const ENV_BACKEND_URL: &str = "CAULI_BACKEND_URL";
pub const ENV_TIMEOUT_SECS: &str = "CAULI_TIMEOUT_SECS";
pub const ENV_PROGRESS: &str = "CAULI_PROGRESS";

const PREDICT_SEGMENT: &str = "predict";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub backend_url: Url,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
    pub progress_mode: ProgressMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        // Constant input, covered by `default_backend_url_is_valid`.
        let backend_url = Url::parse(DEFAULT_BACKEND_URL).expect("DEFAULT_BACKEND_URL parses");
        Self {
            backend_url,
            timeout: Some(DEFAULT_TIMEOUT),
            progress_mode: ProgressMode::Simulated,
        }
    }
}

impl ClientConfig {
    /// Reads the `CAULI_*` keys through `lookup`; missing or blank keys keep the value in `base`.
    pub fn from_lookup<F>(lookup: F, base: ClientConfig) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = base;
        if let Some(raw) = get(ENV_BACKEND_URL) {
            cfg.backend_url = parse_backend_url(&raw)?;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            cfg.timeout = parse_timeout(&raw)?;
        }
        if let Some(raw) = get(ENV_PROGRESS) {
            cfg.progress_mode = raw.parse()?;
        }
        Ok(cfg)
    }

    /// `{backend}/predict`, unless the configured URL already points at the endpoint.
    pub fn predict_url(&self) -> Url {
        let mut url = self.backend_url.clone();
        let already = url
            .path_segments()
            .and_then(|mut segs| segs.rfind(|s| !s.is_empty()))
            .is_some_and(|last| last == PREDICT_SEGMENT);
        if let Ok(mut segs) = url.path_segments_mut() {
            // `/predict/` would be redirected, and a streamed body cannot follow a redirect.
            segs.pop_if_empty();
            if !already {
                segs.push(PREDICT_SEGMENT);
            }
        }
        url
    }
}

pub fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let value = raw.trim();
    let url = Url::parse(value).map_err(|source| ConfigError::BackendUrl {
        value: value.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::Scheme(value.to_string())),
    }
}

/// Whole seconds; `0` disables the timeout.
pub fn parse_timeout(raw: &str) -> Result<Option<Duration>, ConfigError> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::Timeout(raw.to_string()))?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_point_at_local_backend() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.predict_url().as_str(), "http://127.0.0.1:8000/predict");
        assert_eq!(cfg.timeout, Some(Duration::from_secs(120)));
        assert_eq!(cfg.progress_mode, ProgressMode::Simulated);
    }

    #[test]
    fn default_backend_url_is_valid() -> Result<()> {
        let url = parse_backend_url(DEFAULT_BACKEND_URL)?;
        assert_eq!(ClientConfig::default().backend_url, url);
        Ok(())
    }

    #[rstest]
    #[case("http://127.0.0.1:8000", "http://127.0.0.1:8000/predict")]
    #[case("http://127.0.0.1:8000/", "http://127.0.0.1:8000/predict")]
    #[case("https://cauli.example.org/api", "https://cauli.example.org/api/predict")]
    #[case("https://cauli.example.org/api/", "https://cauli.example.org/api/predict")]
    #[case("http://127.0.0.1:8000/predict", "http://127.0.0.1:8000/predict")]
    #[case("http://127.0.0.1:8000/predict/", "http://127.0.0.1:8000/predict")]
    #[case("https://cauli.example.org/api/predict/", "https://cauli.example.org/api/predict")]
    fn predict_url_joins_once(#[case] base: &str, #[case] expected: &str) -> Result<()> {
        let cfg = ClientConfig {
            backend_url: parse_backend_url(base)?,
            ..ClientConfig::default()
        };
        assert_eq!(cfg.predict_url().as_str(), expected);
        Ok(())
    }

    #[test]
    fn lookup_overrides_base() -> Result<()> {
        let cfg = ClientConfig::from_lookup(
            lookup(&[
                (ENV_BACKEND_URL, "https://cauli.example.org"),
                (ENV_TIMEOUT_SECS, "0"),
                (ENV_PROGRESS, "transport"),
            ]),
            ClientConfig::default(),
        )?;
        assert_eq!(cfg.backend_url.as_str(), "https://cauli.example.org/");
        assert_eq!(cfg.timeout, None);
        assert_eq!(cfg.progress_mode, ProgressMode::Transport);
        Ok(())
    }

    #[test]
    fn blank_values_keep_base() -> Result<()> {
        let cfg = ClientConfig::from_lookup(
            lookup(&[(ENV_BACKEND_URL, "  "), (ENV_TIMEOUT_SECS, "")]),
            ClientConfig::default(),
        )?;
        assert_eq!(cfg, ClientConfig::default());
        Ok(())
    }

    #[rstest]
    #[case(ENV_BACKEND_URL, "not a url")]
    #[case(ENV_BACKEND_URL, "ftp://files.example.org")]
    #[case(ENV_TIMEOUT_SECS, "two minutes")]
    #[case(ENV_TIMEOUT_SECS, "-5")]
    #[case(ENV_PROGRESS, "bytes")]
    fn invalid_values_are_errors(#[case] key: &str, #[case] value: &str) {
        let res = ClientConfig::from_lookup(lookup(&[(key, value)]), ClientConfig::default());
        assert!(res.is_err());
    }
}
