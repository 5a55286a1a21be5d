use serde::Deserialize;

use crate::registry::{RepositionPolicy, TrafficLightPolicy, UnknownIdPolicy};

/// Environment variable naming an optional TOML config file
pub const CONFIG_PATH_ENV: &str = "SIMSYNC_CONFIG";

/// Complete simsync configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SimsyncConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub traffic_lights: TrafficLightConfig,
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allow cross-origin requests from any origin (browser builds of the visualiser)
    #[serde(default = "default_cors_permissive")]
    pub cors_permissive: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_permissive() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_permissive: default_cors_permissive(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Request handling limits
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Maximum accepted request body for update endpoints
    #[serde(default = "default_body_size_limit")]
    pub body_size_limit_bytes: usize,
}

fn default_body_size_limit() -> usize {
    1_048_576 // 1 MB
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            body_size_limit_bytes: default_body_size_limit(),
        }
    }
}

/// Traffic light registry behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct TrafficLightConfig {
    #[serde(default = "default_initial_state")]
    pub initial_state: String,
    #[serde(default)]
    pub reposition: RepositionPolicy,
    #[serde(default)]
    pub unknown_ids: UnknownIdPolicy,
}

fn default_initial_state() -> String {
    "red".to_string()
}

impl Default for TrafficLightConfig {
    fn default() -> Self {
        Self {
            initial_state: default_initial_state(),
            reposition: RepositionPolicy::default(),
            unknown_ids: UnknownIdPolicy::default(),
        }
    }
}

impl TrafficLightConfig {
    pub fn policy(&self) -> TrafficLightPolicy {
        TrafficLightPolicy {
            initial_state: self.initial_state.clone(),
            reposition: self.reposition,
            unknown_ids: self.unknown_ids,
        }
    }
}

impl Default for SimsyncConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            api: ApiConfig::default(),
            traffic_lights: TrafficLightConfig::default(),
        }
    }
}

impl SimsyncConfig {
    /// Apply SIMSYNC_* env var overrides. Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SIMSYNC_HOST") {
            if !v.is_empty() {
                self.server.host = v;
            }
        }
        if let Ok(v) = std::env::var("SIMSYNC_PORT") {
            if let Ok(n) = v.parse::<u16>() {
                self.server.port = n;
            }
        }
        if let Ok(v) = std::env::var("SIMSYNC_BODY_SIZE_LIMIT_BYTES") {
            if let Ok(n) = v.parse::<usize>() {
                self.api.body_size_limit_bytes = n;
            }
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> anyhow::Result<SimsyncConfig> {
    let contents = std::fs::read_to_string(path)?;
    let config: SimsyncConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Build the effective config: file named by SIMSYNC_CONFIG (if set), then env overrides.
pub fn from_env() -> anyhow::Result<SimsyncConfig> {
    let mut config = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => load_config(&path)
            .map_err(|e| anyhow::anyhow!("Failed to load config from {}: {}", path, e))?,
        Err(_) => SimsyncConfig::default(),
    };
    config.apply_env_overrides();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SimsyncConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5000);
        assert!(config.server.cors_permissive);
        assert_eq!(config.api.body_size_limit_bytes, 1_048_576);
        assert_eq!(config.traffic_lights.initial_state, "red");
        assert_eq!(config.traffic_lights.reposition, RepositionPolicy::ResetState);
        assert_eq!(config.traffic_lights.unknown_ids, UnknownIdPolicy::Ignore);
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            cors_permissive = false

            [api]
            body_size_limit_bytes = 4096

            [traffic_lights]
            initial_state = "yellow"
            reposition = "keep_state"
            unknown_ids = "reject"
        "#;

        let config: SimsyncConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8080");
        assert!(!config.server.cors_permissive);
        assert_eq!(config.api.body_size_limit_bytes, 4096);

        let policy = config.traffic_lights.policy();
        assert_eq!(policy.initial_state, "yellow");
        assert_eq!(policy.reposition, RepositionPolicy::KeepState);
        assert_eq!(policy.unknown_ids, UnknownIdPolicy::Reject);
    }

    #[test]
    fn test_partial_config() {
        // Missing sections use defaults
        let toml = r#"
            [server]
            port = 5050
        "#;

        let config: SimsyncConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 5050);
        assert_eq!(config.server.host, "127.0.0.1"); // Default
        assert_eq!(config.traffic_lights.initial_state, "red"); // Default
    }

    #[test]
    fn test_unknown_policy_value_rejected() {
        let toml = r#"
            [traffic_lights]
            reposition = "sometimes"
        "#;

        assert!(toml::from_str::<SimsyncConfig>(toml).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nbody_size_limit_bytes = 123").unwrap();

        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.api.body_size_limit_bytes, 123);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("/nonexistent/simsync.toml").is_err());
    }

    // Env vars are process-global; every test touching them holds this lock
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    const ENV_VARS: [&str; 4] = [
        CONFIG_PATH_ENV,
        "SIMSYNC_HOST",
        "SIMSYNC_PORT",
        "SIMSYNC_BODY_SIZE_LIMIT_BYTES",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        // No file, no overrides: defaults
        let config = from_env().unwrap();
        assert_eq!(config.server.bind_addr(), "127.0.0.1:5000");

        // Valid overrides applied
        std::env::set_var("SIMSYNC_HOST", "0.0.0.0");
        std::env::set_var("SIMSYNC_PORT", "6000");
        std::env::set_var("SIMSYNC_BODY_SIZE_LIMIT_BYTES", "2048");
        let config = from_env().unwrap();
        assert_eq!(config.server.bind_addr(), "0.0.0.0:6000");
        assert_eq!(config.api.body_size_limit_bytes, 2048);

        // Unparseable and empty values ignored
        std::env::set_var("SIMSYNC_HOST", "");
        std::env::set_var("SIMSYNC_PORT", "abc");
        std::env::set_var("SIMSYNC_BODY_SIZE_LIMIT_BYTES", "-1");
        let config = from_env().unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.api.body_size_limit_bytes, 1_048_576);

        // Env wins over the file named by SIMSYNC_CONFIG
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nhost = \"10.0.0.1\"\nport = 7000\n\n[api]\nbody_size_limit_bytes = 512"
        )
        .unwrap();
        clear_env();
        std::env::set_var(CONFIG_PATH_ENV, file.path());
        std::env::set_var("SIMSYNC_PORT", "7100");
        let config = from_env().unwrap();
        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.server.port, 7100);
        assert_eq!(config.api.body_size_limit_bytes, 512);

        // Missing config file is an error
        std::env::set_var(CONFIG_PATH_ENV, "/nonexistent/simsync.toml");
        assert!(from_env().is_err());

        clear_env();
    }
}
