use super::*;
use serial_test::serial;
use std::io::Write;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.directory.prefix, "//localhost/");
    assert_eq!(config.retry.max_retries, 3);
    assert_eq!(config.source.delivery_timeout(), Duration::from_secs(5));
}

#[test]
fn test_config_for_test_has_no_delays() {
    let config = Config::for_test();
    assert_eq!(config.retry.max_attempts(), 4);
    assert_eq!(config.retry.min_delay_ms, 0);
    assert!(!config.retry.jitter);
}

#[test]
#[serial]
fn test_load_from_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .unwrap();
    writeln!(
        file,
        "directory:\n  prefix: \"//news.example.com/\"\nretry:\n  max_retries: 5\n  jitter: false\nsource:\n  delivery_timeout_ms: 250"
    )
    .unwrap();

    let config = Config::load(Some(file.path().to_str().unwrap())).unwrap();

    assert_eq!(config.directory.prefix, "//news.example.com/");
    assert_eq!(config.retry.max_retries, 5);
    assert!(!config.retry.jitter);
    // Unset keys keep their defaults
    assert_eq!(config.retry.min_delay_ms, RetryConfig::default().min_delay_ms);
    assert_eq!(config.source.delivery_timeout(), Duration::from_millis(250));
}

#[test]
#[serial]
fn test_env_overrides_defaults() {
    std::env::set_var("TOPIC_NOTIFY__RETRY__MAX_RETRIES", "7");
    std::env::set_var("TOPIC_NOTIFY__DIRECTORY__PREFIX", "//env.example/");

    let result = Config::load(None);

    std::env::remove_var("TOPIC_NOTIFY__RETRY__MAX_RETRIES");
    std::env::remove_var("TOPIC_NOTIFY__DIRECTORY__PREFIX");

    let config = result.unwrap();
    assert_eq!(config.retry.max_retries, 7);
    assert_eq!(config.directory.prefix, "//env.example/");
}

#[test]
#[serial]
fn test_missing_explicit_file_is_an_error() {
    let result = Config::load(Some("/nonexistent/topic-notify.yaml"));
    assert!(result.is_err());
}
