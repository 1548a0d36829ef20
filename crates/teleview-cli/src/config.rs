use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use teleview_core::{CostGroupBy, Error, ReplayState, Result};
use teleview_dashboard::DashboardOptions;
use teleview_gateway::{DEFAULT_GATEWAY_URL, DEFAULT_RPC_PATH, GatewayConfig, HttpClientConfig};

pub const DEFAULT_CONFIG_PATH: &str = "~/.teleview/config.yaml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeleviewConfig {
    #[serde(default)]
    pub gateway: GatewaySettings,

    #[serde(default)]
    pub dashboard: DashboardSettings,

    #[serde(default)]
    pub replay: ReplaySettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSettings {
    #[serde(default = "default_sessions_limit")]
    pub sessions_limit: usize,

    #[serde(default)]
    pub cost_group_by: CostGroupBy,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaySettings {
    #[serde(default = "default_speed")]
    pub default_speed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_false")]
    pub json: bool,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            url: default_url(),
            rpc_path: default_rpc_path(),
            token: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            sessions_limit: default_sessions_limit(),
            cost_group_by: CostGroupBy::default(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            default_speed: default_speed(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl TeleviewConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?
        };

        Ok(config)
    }

    /// Load from an explicit path, or from the default path when it exists
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(shellexpand::tilde(path).to_string()),
            None => {
                let default_path = shellexpand::tilde(DEFAULT_CONFIG_PATH).to_string();
                if Path::new(&default_path).exists() {
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("TELEVIEW_URL") {
            self.gateway.url = val;
        }

        if let Ok(val) = std::env::var("TELEVIEW_TOKEN") {
            self.gateway.token = Some(val);
        }

        if let Ok(val) = std::env::var("TELEVIEW_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) => self.gateway.timeout_secs = secs,
                Err(_) => eprintln!("Warning: Invalid TELEVIEW_TIMEOUT_SECS '{}', ignoring", val),
            }
        }

        if let Ok(val) = std::env::var("TELEVIEW_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("TELEVIEW_POLL_INTERVAL_SECS") {
            match val.parse::<u64>() {
                Ok(secs) => self.dashboard.poll_interval_secs = secs,
                Err(_) => eprintln!(
                    "Warning: Invalid TELEVIEW_POLL_INTERVAL_SECS '{}', ignoring",
                    val
                ),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.gateway.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "gateway.url must be an http(s) URL, got '{}'",
                self.gateway.url
            )));
        }
        if self.gateway.timeout_secs == 0 {
            return Err(Error::Config(
                "gateway.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.dashboard.sessions_limit == 0 {
            return Err(Error::Config(
                "dashboard.sessions_limit must be greater than zero".to_string(),
            ));
        }
        if self.dashboard.poll_interval_secs == 0 {
            return Err(Error::Config(
                "dashboard.poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        if !self.replay.default_speed.is_finite() || self.replay.default_speed <= 0.0 {
            return Err(Error::Config(format!(
                "replay.default_speed must be a positive number, got {}",
                self.replay.default_speed
            )));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::Config(format!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }
        Ok(())
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            url: self.gateway.url.trim().to_string(),
            rpc_path: self.gateway.rpc_path.clone(),
            token: self.gateway.token.clone(),
            client_config: HttpClientConfig {
                timeout_secs: self.gateway.timeout_secs,
                connect_timeout_secs: self.gateway.connect_timeout_secs,
                ..Default::default()
            },
        }
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            sessions_limit: self.dashboard.sessions_limit,
            poll_interval: Duration::from_secs(self.dashboard.poll_interval_secs),
        }
    }
}

fn default_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}

fn default_rpc_path() -> String {
    DEFAULT_RPC_PATH.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_sessions_limit() -> usize {
    50
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_speed() -> f64 {
    ReplayState::DEFAULT_SPEED
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_false() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ENV_VARS: [&str; 5] = [
        "TELEVIEW_URL",
        "TELEVIEW_TOKEN",
        "TELEVIEW_TIMEOUT_SECS",
        "TELEVIEW_LOG_LEVEL",
        "TELEVIEW_POLL_INTERVAL_SECS",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            unsafe { std::env::remove_var(var) };
        }
    }

    fn write_config(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = TeleviewConfig::default();
        assert_eq!(config.gateway.url, "http://127.0.0.1:18789");
        assert_eq!(config.gateway.rpc_path, "/rpc");
        assert!(config.gateway.token.is_none());
        assert_eq!(config.gateway.timeout_secs, 30);
        assert_eq!(config.dashboard.sessions_limit, 50);
        assert_eq!(config.dashboard.cost_group_by, CostGroupBy::Model);
        assert_eq!(config.dashboard.poll_interval_secs, 5);
        assert_eq!(config.replay.default_speed, 1.0);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_file_with_partial_sections() {
        let file = write_config(
            ".yaml",
            "gateway:\n  url: https://gateway.example\n  token: abc\ndashboard:\n  cost_group_by: provider\n",
        );

        let config = TeleviewConfig::from_file(file.path()).unwrap();
        assert_eq!(config.gateway.url, "https://gateway.example");
        assert_eq!(config.gateway.token.as_deref(), Some("abc"));
        assert_eq!(config.gateway.rpc_path, "/rpc");
        assert_eq!(config.dashboard.cost_group_by, CostGroupBy::Provider);
        assert_eq!(config.dashboard.sessions_limit, 50);
    }

    #[test]
    fn test_toml_file() {
        let file = write_config(
            ".toml",
            "[dashboard]\nsessions_limit = 10\npoll_interval_secs = 2\n\n[replay]\ndefault_speed = 4.0\n\n[logging]\nlevel = \"debug\"\njson = true\n",
        );

        let config = TeleviewConfig::from_file(file.path()).unwrap();
        assert_eq!(config.dashboard.sessions_limit, 10);
        assert_eq!(config.dashboard.poll_interval_secs, 2);
        assert_eq!(config.replay.default_speed, 4.0);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let file = write_config(".yaml", "gateway: [not, a, map\n");
        assert!(matches!(
            TeleviewConfig::from_file(file.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(TeleviewConfig::load(Some("/nonexistent/teleview.yaml")).is_err());
    }

    #[test]
    #[serial]
    fn test_merge_env_overrides_file_values() {
        clear_env();
        unsafe {
            std::env::set_var("TELEVIEW_URL", "https://env.example");
            std::env::set_var("TELEVIEW_TOKEN", "env-token");
            std::env::set_var("TELEVIEW_TIMEOUT_SECS", "45");
            std::env::set_var("TELEVIEW_LOG_LEVEL", "warn");
            std::env::set_var("TELEVIEW_POLL_INTERVAL_SECS", "9");
        }

        let mut config = TeleviewConfig::default();
        config.merge_env();
        clear_env();

        assert_eq!(config.gateway.url, "https://env.example");
        assert_eq!(config.gateway.token.as_deref(), Some("env-token"));
        assert_eq!(config.gateway.timeout_secs, 45);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.dashboard.poll_interval_secs, 9);
    }

    #[test]
    #[serial]
    fn test_merge_env_ignores_unparseable_numbers() {
        clear_env();
        unsafe { std::env::set_var("TELEVIEW_TIMEOUT_SECS", "soon") };

        let mut config = TeleviewConfig::default();
        config.merge_env();
        clear_env();

        assert_eq!(config.gateway.timeout_secs, 30);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = TeleviewConfig::default();
        config.gateway.url = "ftp://nope".to_string();
        assert!(config.validate().is_err());

        let mut config = TeleviewConfig::default();
        config.gateway.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = TeleviewConfig::default();
        config.dashboard.poll_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = TeleviewConfig::default();
        config.replay.default_speed = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = TeleviewConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_conversions() {
        let mut config = TeleviewConfig::default();
        config.gateway.url = " https://gw.example ".to_string();
        config.gateway.timeout_secs = 12;
        config.dashboard.sessions_limit = 7;
        config.dashboard.poll_interval_secs = 3;

        let gateway = config.gateway_config();
        assert_eq!(gateway.endpoint(), "https://gw.example/rpc");
        assert_eq!(gateway.client_config.timeout_secs, 12);

        let options = config.dashboard_options();
        assert_eq!(options.sessions_limit, 7);
        assert_eq!(options.poll_interval, Duration::from_secs(3));
    }
}
