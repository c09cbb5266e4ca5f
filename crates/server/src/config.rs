use std::path::Path;

use serde::Deserialize;

/// Server settings, loaded from TOML with environment overrides for the
/// deployment-specific bits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub max_upload_bytes: usize,
    /// Hard cap on extraction plus parsing per request; a conversion that
    /// exceeds it is reported as an extraction failure.
    pub convert_timeout_secs: u64,
    /// Static API tokens accepted by the bearer check.
    pub api_tokens: Vec<String>,
    /// Conversions allowed per token per day.
    pub daily_quota: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8417".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            convert_timeout_secs: 30,
            api_tokens: Vec::new(),
            daily_quota: 100,
        }
    }
}

impl ServerConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)?;
                toml::from_str(&raw)?
            }
            None => Self::default(),
        };
        if let Ok(bind) = std::env::var("STERLING_BIND") {
            config.bind = bind;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sensible() {
        let c = ServerConfig::default();
        assert_eq!(c.convert_timeout_secs, 30);
        assert!(c.api_tokens.is_empty());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "daily_quota = 5\napi_tokens = [\"tok-1\"]").unwrap();
        let c = ServerConfig::load(Some(f.path())).unwrap();
        assert_eq!(c.daily_quota, 5);
        assert_eq!(c.api_tokens, vec!["tok-1".to_string()]);
        assert_eq!(c.convert_timeout_secs, 30);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(ServerConfig::load(Some(Path::new("/nonexistent/sterling.toml"))).is_err());
    }
}
