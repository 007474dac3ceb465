//! Integration tests for configuration loading and config file resolution
//!
//! Tests touching RECDIFF_CONFIG or password variables are marked #[serial]
//! so they never race on the process environment.

use recdiff_common::config::{
    load_config, resolve_config_path, AppConfig, ConfigFormat, CONFIG_ENV_VAR, DEFAULT_PAGE_SIZE,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FULL_TOML: &str = r#"
tables = ["sys_script_include", "sys_script"]
query = "sys_updated_on>javascript:gs.daysAgoStart(7)"
output_dir = "out"
report_name = "weekly"
page_size = 250
request_timeout_secs = 15

[instance_a]
host = "dev100"
user = "admin"
password = "a-secret"
label = "Development"

[instance_b]
host = "prod.example.org"
user = "reader"
password = "b-secret"
"#;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn test_load_full_toml_config() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "recdiff.toml", FULL_TOML);

    let config = load_config(&path).unwrap();
    assert_eq!(config.tables, vec!["sys_script_include", "sys_script"]);
    assert_eq!(config.output_dir, PathBuf::from("out"));
    assert_eq!(config.report_name, "weekly");
    assert_eq!(config.page_size, 250);
    assert_eq!(config.request_timeout_secs, 15);
    assert_eq!(config.instance_a.label, "Development");
    assert_eq!(config.instance_b.label, "Instance B");
    assert_eq!(config.instance_a.base_url(), "https://dev100.service-now.com");
    assert_eq!(config.instance_b.base_url(), "https://prod.example.org");
    assert_eq!(config.instance_b.password().unwrap(), "b-secret");
}

#[test]
fn test_defaults_apply_to_minimal_config() {
    let content = r#"
tables = ["sys_script"]

[instance_a]
host = "a"
user = "u"
password = "p"

[instance_b]
host = "b"
user = "u"
password = "p"
"#;
    let config = AppConfig::parse(content, ConfigFormat::Toml).unwrap();
    assert_eq!(config.query, "");
    assert_eq!(config.output_dir, PathBuf::from("reports"));
    assert_eq!(config.report_name, "comparison_report");
    assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    assert_eq!(config.request_timeout_secs, 60);
    assert_eq!(config.instance_a.label, "Instance A");
}

#[test]
fn test_legacy_json_with_byte_order_mark() {
    let dir = TempDir::new().unwrap();
    let content = "\u{feff}{\n\
        \"instances\": {\n\
            \"instance1\": {\"host\": \"dev1\", \"user\": \"admin\", \"pass\": \"x\"},\n\
            \"instance2\": {\"host\": \"dev2\", \"user\": \"admin\", \"pass\": \"y\"}\n\
        },\n\
        \"tables\": [\"sys_script_include\"],\n\
        \"query\": \"active=true\",\n\
        \"output_dir\": \"legacy_reports\"\n\
    }";
    let path = write_file(&dir, "config.json", content);

    let config = load_config(&path).unwrap();
    assert_eq!(config.instance_a.host, "dev1");
    assert_eq!(config.instance_b.password().unwrap(), "y");
    assert_eq!(config.query, "active=true");
    assert_eq!(config.output_dir, PathBuf::from("legacy_reports"));
}

#[test]
fn test_empty_tables_rejected() {
    let content = FULL_TOML.replace(
        r#"tables = ["sys_script_include", "sys_script"]"#,
        "tables = []",
    );
    let err = AppConfig::parse(&content, ConfigFormat::Toml).unwrap_err();
    assert!(err.to_string().contains("tables"), "got: {}", err);
}

#[test]
fn test_page_size_out_of_range_rejected() {
    let content = FULL_TOML.replace("page_size = 250", "page_size = 0");
    let err = AppConfig::parse(&content, ConfigFormat::Toml).unwrap_err();
    assert!(err.to_string().contains("page_size"), "got: {}", err);

    let content = FULL_TOML.replace("page_size = 250", "page_size = 20000");
    assert!(AppConfig::parse(&content, ConfigFormat::Toml).is_err());
}

#[test]
fn test_missing_instance_section_rejected() {
    let content = "tables = [\"t\"]\n[instance_a]\nhost = \"a\"\nuser = \"u\"\npassword = \"p\"\n";
    assert!(AppConfig::parse(content, ConfigFormat::Toml).is_err());
}

#[test]
fn test_invalid_toml_is_config_error() {
    let err = AppConfig::parse("tables = [", ConfigFormat::Toml).unwrap_err();
    assert!(err.to_string().contains("Invalid TOML"), "got: {}", err);
}

#[test]
fn test_unreadable_file_is_config_error() {
    let err = load_config(Path::new("/nonexistent/recdiff.toml")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/recdiff.toml"));
}

#[test]
#[serial]
fn test_password_env_takes_priority() {
    env::set_var("RECDIFF_TEST_PASSWORD_A", "from-env");

    let content = FULL_TOML.replace(
        "password = \"a-secret\"",
        "password = \"a-secret\"\npassword_env = \"RECDIFF_TEST_PASSWORD_A\"",
    );
    let config = AppConfig::parse(&content, ConfigFormat::Toml).unwrap();
    assert_eq!(config.instance_a.password().unwrap(), "from-env");

    env::remove_var("RECDIFF_TEST_PASSWORD_A");
    assert!(config.instance_a.password().is_err());
}

#[test]
#[serial]
fn test_cli_path_wins_over_env() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/recdiff-from-env.toml");

    let resolved = resolve_config_path(Some(Path::new("/tmp/recdiff-from-cli.toml"))).unwrap();
    assert_eq!(resolved, PathBuf::from("/tmp/recdiff-from-cli.toml"));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_path_used_without_cli() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/recdiff-from-env.toml");

    let resolved = resolve_config_path(None).unwrap();
    assert_eq!(resolved, PathBuf::from("/tmp/recdiff-from-env.toml"));

    env::remove_var(CONFIG_ENV_VAR);
}
