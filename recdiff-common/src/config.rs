//! Configuration loading and config file resolution
//!
//! The configuration is read once at startup and passed explicitly to the
//! code that needs it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "RECDIFF_CONFIG";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "recdiff.toml";

pub const DEFAULT_OUTPUT_DIR: &str = "reports";
pub const DEFAULT_REPORT_NAME: &str = "comparison_report";
pub const DEFAULT_PAGE_SIZE: u32 = 1000;
pub const MAX_PAGE_SIZE: u32 = 10_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

const HOSTED_DOMAIN: &str = "service-now.com";
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Connection settings of one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// Short instance name, host name or full base URL
    pub host: String,
    pub user: String,
    #[serde(default, alias = "pass", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Environment variable holding the password, preferred over `password`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,
    #[serde(default)]
    pub label: String,
}

impl InstanceConfig {
    /// Base URL of the instance, without trailing slash
    ///
    /// - `dev123` -> `https://dev123.service-now.com`
    /// - `acme.example.org` -> `https://acme.example.org`
    /// - `http://127.0.0.1:8080/` -> `http://127.0.0.1:8080`
    pub fn base_url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        if host.contains("://") {
            host.to_string()
        } else if host.contains('.') {
            format!("https://{}", host)
        } else {
            format!("https://{}.{}", host, HOSTED_DOMAIN)
        }
    }

    /// Password, taken from `password_env` when set
    pub fn password(&self) -> Result<String> {
        if let Some(var) = &self.password_env {
            return std::env::var(var).map_err(|_| {
                Error::Config(format!(
                    "password_env for {}: environment variable {} is not set",
                    self.label, var
                ))
            });
        }
        self.password
            .clone()
            .ok_or_else(|| Error::Config(format!("{}: password or password_env is required", self.label)))
    }

    fn validate(&self, section: &str) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config(format!("{}.host must not be empty", section)));
        }
        if self.user.trim().is_empty() {
            return Err(Error::Config(format!("{}.user must not be empty", section)));
        }
        if self.password.is_none() && self.password_env.is_none() {
            return Err(Error::Config(format!(
                "{}: password or password_env is required",
                section
            )));
        }
        Ok(())
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub instance_a: InstanceConfig,
    pub instance_b: InstanceConfig,
    pub tables: Vec<String>,
    /// Encoded query passed to the listing as `sysparm_query`
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_report_name")]
    pub report_name: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_report_name() -> String {
    DEFAULT_REPORT_NAME.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Source format of a config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// `.json` files are JSON, everything else TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

impl AppConfig {
    /// Parse and validate configuration text
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let content = content.trim_start_matches(BYTE_ORDER_MARK);

        let mut config: AppConfig = match format {
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| Error::Config(format!("Invalid TOML config: {}", e)))?,
            ConfigFormat::Json => {
                let value: serde_json::Value = serde_json::from_str(content)
                    .map_err(|e| Error::Config(format!("Invalid JSON config: {}", e)))?;
                serde_json::from_value(lift_legacy_instances(value))
                    .map_err(|e| Error::Config(format!("Invalid JSON config: {}", e)))?
            }
        };

        if config.instance_a.label.trim().is_empty() {
            config.instance_a.label = "Instance A".to_string();
        }
        if config.instance_b.label.trim().is_empty() {
            config.instance_b.label = "Instance B".to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tables.is_empty() {
            return Err(Error::Config("tables must list at least one table".to_string()));
        }
        if let Some(pos) = self.tables.iter().position(|t| t.trim().is_empty()) {
            return Err(Error::Config(format!("tables[{}] is empty", pos)));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(Error::Config(format!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be positive".to_string()));
        }
        if self.report_name.trim().is_empty() {
            return Err(Error::Config("report_name must not be empty".to_string()));
        }
        self.instance_a.validate("instance_a")?;
        self.instance_b.validate("instance_b")?;
        Ok(())
    }
}

/// Legacy JSON layout nests the instances as `instances.instance1/2`
fn lift_legacy_instances(mut value: serde_json::Value) -> serde_json::Value {
    if let Some(root) = value.as_object_mut() {
        if let Some(serde_json::Value::Object(mut instances)) = root.remove("instances") {
            for (legacy, key) in [("instance1", "instance_a"), ("instance2", "instance_b")] {
                if let Some(instance) = instances.remove(legacy) {
                    root.entry(key).or_insert(instance);
                }
            }
        }
    }
    value
}

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Cannot read config file {}: {}", path.display(), e)))?;
    AppConfig::parse(&content, ConfigFormat::from_path(path))
}

/// Config file resolution, first hit wins:
/// 1. Command-line argument
/// 2. `RECDIFF_CONFIG` environment variable
/// 3. `recdiff.toml` in the working directory
/// 4. `recdiff/config.toml` under the platform config directory
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let mut tried = vec![format!("${}", CONFIG_ENV_VAR)];

    // Priority 3: Working directory
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Ok(local);
    }
    tried.push(local.display().to_string());

    // Priority 4: Platform config directory
    if let Some(user_config) = user_config_path() {
        if user_config.is_file() {
            return Ok(user_config);
        }
        tried.push(user_config.display().to_string());
    }

    Err(Error::Config(format!(
        "No config file found (tried {})",
        tried.join(", ")
    )))
}

/// `recdiff/config.toml` under the platform config directory
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("recdiff").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(host: &str) -> InstanceConfig {
        InstanceConfig {
            host: host.to_string(),
            user: "admin".to_string(),
            password: Some("secret".to_string()),
            password_env: None,
            label: "Instance A".to_string(),
        }
    }

    #[test]
    fn test_short_host_expands_to_hosted_domain() {
        assert_eq!(instance("dev123").base_url(), "https://dev123.service-now.com");
    }

    #[test]
    fn test_dotted_host_gets_https() {
        assert_eq!(instance("acme.example.org/").base_url(), "https://acme.example.org");
    }

    #[test]
    fn test_url_with_scheme_is_kept() {
        assert_eq!(
            instance(" http://127.0.0.1:8080// ").base_url(),
            "http://127.0.0.1:8080"
        );
    }

    #[test]
    fn test_config_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("config.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("CONFIG.JSON")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("recdiff.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("recdiff")), ConfigFormat::Toml);
    }

    #[test]
    fn test_instance_requires_some_password() {
        let mut inst = instance("dev1");
        inst.password = None;
        let err = inst.validate("instance_a").unwrap_err();
        assert!(err.to_string().contains("instance_a"));
    }

    #[test]
    fn test_legacy_instances_are_lifted() {
        let value = serde_json::json!({
            "instances": {
                "instance1": {"host": "a"},
                "instance2": {"host": "b"}
            },
            "tables": ["x"]
        });
        let lifted = lift_legacy_instances(value);
        assert_eq!(lifted["instance_a"]["host"], "a");
        assert_eq!(lifted["instance_b"]["host"], "b");
        assert!(lifted.get("instances").is_none());
    }
}
