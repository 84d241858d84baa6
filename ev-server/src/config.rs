//! Server configuration

use std::path::PathBuf;

/// Port used when none is configured
pub const DEFAULT_PORT: u16 = 8430;

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Enable CORS
    pub cors_enabled: bool,
    /// JSON file backing the store; in-memory when unset
    pub data_file: Option<PathBuf>,
    /// Base URL written into embed snippets
    pub public_base_url: Option<String>,
}

impl ServerConfig {
    /// Create a new configuration builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Read `EV_PORT`, `EV_CORS`, `EV_DATA_FILE` and `EV_PUBLIC_URL`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut builder = Self::builder();

        if let Some(port) = lookup("EV_PORT").and_then(|p| p.trim().parse().ok()) {
            builder = builder.port(port);
        }
        if let Some(cors) = lookup("EV_CORS") {
            let disabled = matches!(
                cors.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "off" | "no"
            );
            builder = builder.cors(!disabled);
        }
        if let Some(path) = lookup("EV_DATA_FILE").filter(|p| !p.trim().is_empty()) {
            builder = builder.data_file(path);
        }
        if let Some(url) = lookup("EV_PUBLIC_URL").filter(|u| !u.trim().is_empty()) {
            builder = builder.public_base_url(url);
        }

        builder.build()
    }

    /// Base URL for embed snippets
    pub fn public_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.port),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    port: Option<u16>,
    cors_enabled: Option<bool>,
    data_file: Option<PathBuf>,
    public_base_url: Option<String>,
}

impl ServerConfigBuilder {
    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enabled: bool) -> Self {
        self.cors_enabled = Some(enabled);
        self
    }

    /// Persist to a JSON file instead of memory
    pub fn data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = Some(path.into());
        self
    }

    pub fn public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            port: self.port.unwrap_or(DEFAULT_PORT),
            cors_enabled: self.cors_enabled.unwrap_or(true),
            data_file: self.data_file,
            public_base_url: self.public_base_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> ServerConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.cors_enabled);
        assert!(config.data_file.is_none());
        assert_eq!(config.public_url(), "http://localhost:8430");
    }

    #[test]
    fn test_env_overrides() {
        let config = from_pairs(&[
            ("EV_PORT", "9000"),
            ("EV_CORS", "off"),
            ("EV_DATA_FILE", "/var/lib/ev/sites.json"),
            ("EV_PUBLIC_URL", "https://variants.example.com/"),
        ]);
        assert_eq!(config.port, 9000);
        assert!(!config.cors_enabled);
        assert_eq!(config.data_file, Some(PathBuf::from("/var/lib/ev/sites.json")));
        assert_eq!(config.public_url(), "https://variants.example.com");
    }

    #[test]
    fn test_unparseable_port_falls_back() {
        assert_eq!(from_pairs(&[("EV_PORT", "eighty")]).port, DEFAULT_PORT);
    }
}
