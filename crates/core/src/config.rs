use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// `firebase` or `noop`.
    #[serde(default = "default_auth_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_identity_url")]
    pub identity_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// `http` or `noop`.
    #[serde(default = "default_service_provider")]
    pub provider: String,
    #[serde(default = "default_service_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_auth_provider() -> String {
    "firebase".to_string()
}

fn default_identity_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_token_url() -> String {
    "https://securetoken.googleapis.com/v1".to_string()
}

fn default_service_provider() -> String {
    "http".to_string()
}

fn default_service_url() -> String {
    "http://localhost:5000/predict".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider: default_auth_provider(),
            api_key: None,
            identity_url: default_identity_url(),
            token_url: default_token_url(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            provider: default_service_provider(),
            url: default_service_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Loads `path` (or `config/default` if present) and `FRUITQ_*` overrides,
/// e.g. `FRUITQ_SERVICE__URL`.
pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("FRUITQ")
            .prefix_separator("_")
            .separator("__"),
    );
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[service]\nurl = \"http://classifier:8080/predict\"\n\n[auth]\nprovider = \"noop\""
        )
        .unwrap();

        let cfg = load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(cfg.service.url, "http://classifier:8080/predict");
        assert_eq!(cfg.service.timeout_secs, 30);
        assert_eq!(cfg.service.provider, "http");
        assert_eq!(cfg.auth.provider, "noop");
        assert!(cfg.auth.api_key.is_none());
    }
}
