use super::{apply_env_overrides, apply_file_overrides, load_settings_from, ConfigError, Settings};

use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        r#"
server_url = "http://upscaler.internal:8080"
request_timeout_secs = 30
"#,
    );

    assert_eq!(settings.server_url, "http://upscaler.internal:8080");
    assert_eq!(settings.request_timeout_secs, 30);
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn env_values_override_file_values() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        r#"
server_url = "http://from-file:8080"
request_timeout_secs = 30
log_filter = "warn"
"#,
    );
    apply_env_overrides(
        &mut settings,
        lookup_from(&[
            ("UPSCALER_SERVER_URL", "http://from-env:9000"),
            ("UPSCALER_REQUEST_TIMEOUT_SECS", "45"),
            ("UPSCALER_LOG", "debug"),
        ]),
    );

    assert_eq!(settings.server_url, "http://from-env:9000");
    assert_eq!(settings.request_timeout_secs, 45);
    assert_eq!(settings.log_filter, "debug");
}

#[test]
fn app_prefixed_env_wins_over_upscaler_prefixed() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        lookup_from(&[
            ("UPSCALER_SERVER_URL", "http://upscaler-env:9000"),
            ("APP__SERVER_URL", "http://app-env:9001"),
            ("UPSCALER_REQUEST_TIMEOUT_SECS", "45"),
            ("APP__REQUEST_TIMEOUT_SECS", "60"),
            ("UPSCALER_LOG", "debug"),
            ("APP__LOG", "trace"),
        ]),
    );

    assert_eq!(settings.server_url, "http://app-env:9001");
    assert_eq!(settings.request_timeout_secs, 60);
    assert_eq!(settings.log_filter, "trace");
}

#[test]
fn unparseable_env_timeout_keeps_previous_value() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, "request_timeout_secs = 30");
    apply_env_overrides(
        &mut settings,
        lookup_from(&[("APP__REQUEST_TIMEOUT_SECS", "soon")]),
    );
    assert_eq!(settings.request_timeout_secs, 30);
}

#[test]
fn absent_env_leaves_settings_untouched() {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, |_| None);
    assert_eq!(settings.server_url, Settings::default().server_url);
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn malformed_file_keeps_defaults() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, "server_url = [unterminated");
    assert_eq!(settings.server_url, Settings::default().server_url);
}

#[test]
fn negative_timeout_in_file_is_ignored() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, "request_timeout_secs = -4");
    assert_eq!(settings.request_timeout_secs, 180);
}

#[test]
fn missing_settings_file_falls_back_to_defaults() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("upscaler_missing_{suffix}.toml"));

    let settings = load_settings_from(&path);
    assert!(settings.request_timeout_secs > 0);
}

#[test]
fn reads_settings_file_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("upscaler_settings_{suffix}.toml"));
    fs::write(&path, "log_filter = \"debug\"\n").expect("write settings");

    let settings = load_settings_from(&path);
    fs::remove_file(&path).expect("cleanup");

    if env::var("UPSCALER_LOG").is_err() && env::var("APP__LOG").is_err() {
        assert_eq!(settings.log_filter, "debug");
    }
}

#[test]
fn rejects_non_http_server_url() {
    let settings = Settings {
        server_url: "ftp://example.com".into(),
        ..Settings::default()
    };
    assert!(matches!(
        settings.base_url(),
        Err(ConfigError::UnsupportedScheme(_))
    ));
}

#[test]
fn rejects_unparseable_server_url() {
    let settings = Settings {
        server_url: "not a url".into(),
        ..Settings::default()
    };
    assert!(matches!(
        settings.base_url(),
        Err(ConfigError::InvalidServerUrl { .. })
    ));
}

#[test]
fn zero_timeout_is_clamped() {
    let settings = Settings {
        request_timeout_secs: 0,
        ..Settings::default()
    };
    assert_eq!(settings.request_timeout().as_secs(), 1);
}
