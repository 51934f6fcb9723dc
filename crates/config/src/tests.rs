use crate::AppConfig;
use figment::Jail;

const DEFAULT_TOML: &str = r#"
app_name = "cases"
app_env = "development"

[server]
host = "0.0.0.0"
port = 10031

[auth]
identity_endpoint = "http://127.0.0.1:10021"
"#;

#[test]
fn test_load_applies_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file("default.toml", DEFAULT_TOML)?;

        let config = AppConfig::load(".").map_err(|e| e.to_string())?;
        assert_eq!(config.app_name, "cases");
        assert_eq!(config.server.port, 10031);
        assert_eq!(config.auth.token_header, "x-access-token");
        assert_eq!(config.auth.request_timeout_ms, 5000);
        assert!(!config.auth.allow_unregistered_methods);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.is_development());
        Ok(())
    });
}

#[test]
fn test_env_file_and_variables_override() {
    Jail::expect_with(|jail| {
        jail.create_file("default.toml", DEFAULT_TOML)?;
        jail.create_file(
            "production.toml",
            r#"
app_env = "production"

[telemetry]
json = true
"#,
        )?;
        jail.set_env("APP_ENV", "production");
        jail.set_env("CASES_AUTH__TOKEN_HEADER", "x-webitel-access");
        jail.set_env("CASES_AUTH__ALLOW_UNREGISTERED_METHODS", "true");

        let config = AppConfig::load(".").map_err(|e| e.to_string())?;
        assert!(config.is_production());
        assert!(config.telemetry.json);
        assert_eq!(config.auth.token_header, "x-webitel-access");
        assert!(config.auth.allow_unregistered_methods);
        Ok(())
    });
}

#[test]
fn test_missing_auth_section_fails() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "default.toml",
            r#"
app_name = "cases"
app_env = "development"

[server]
host = "0.0.0.0"
port = 10031
"#,
        )?;

        assert!(AppConfig::load(".").is_err());
        Ok(())
    });
}
