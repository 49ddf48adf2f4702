use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub peer: PeerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir() }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

/// Optional peer product catalog; when set, the customer service consults it
/// before creating products locally.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PeerConfig {
    #[serde(default)]
    pub product_url: Option<String>,
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load from `CONFIG_PATH`, fill gaps from environment variables, then validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_from_env();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn normalize_from_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Ok(dir) = std::env::var("DATA_DIR") {
            self.store.data_dir = dir;
        }
        if let Ok(url) = std::env::var("PEER_PRODUCT_URL") {
            if !url.trim().is_empty() {
                self.peer.product_url = Some(url);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(anyhow!("server.host must not be empty"));
        }
        if self.server.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.store.data_dir.trim().is_empty() {
            return Err(anyhow!("store.data_dir must not be empty"));
        }
        if let Some(url) = &self.peer.product_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow!("peer.product_url must start with http(s)"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.store.data_dir, "data");
        assert!(cfg.peer.product_url.is_none());
    }

    #[test]
    fn parses_toml_sections() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 3001

            [store]
            data_dir = "var/data"

            [peer]
            product_url = "http://localhost:8080"
            "#,
        )
        .expect("parse config");
        assert_eq!(cfg.server.port, 3001);
        assert_eq!(cfg.store.data_dir, "var/data");
        assert_eq!(cfg.peer.product_url.as_deref(), Some("http://localhost:8080"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_bad_peer_url() {
        let mut cfg = AppConfig::default();
        cfg.peer.product_url = Some("ftp://peer".into());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_port() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.validate().is_err());
    }
}
