#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Configuration loading and validation tests.

use postline::config::{ReceiverConfig, MAX_PAYLOAD_SIZE};

#[test]
fn test_default_config_is_valid() {
    let config = ReceiverConfig::default();
    let errors = config.validate();
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
}

#[test]
fn test_default_limits() {
    let config = ReceiverConfig::default();
    assert_eq!(config.server.max_payload_size, MAX_PAYLOAD_SIZE);
    assert_eq!(config.server.max_line_length, 8 * 1024);
    assert_eq!(config.storage.received_suffix, ".snt");
    assert_eq!(config.storage.transfer_dir, "transfer");
    assert_eq!(config.storage.block_size, postline::BLOCK_SIZE);
}

#[test]
fn test_zero_size_limits_rejected() {
    let config = ReceiverConfig::default_with_overrides(|c| {
        c.server.max_line_length = 0;
        c.storage.block_size = 0;
    });
    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("line length")));
    assert!(errors.iter().any(|e| e.contains("Block size")));
}

#[test]
fn test_invalid_address_rejected() {
    let config = ReceiverConfig::default_with_overrides(|c| {
        c.server.address = "not-an-address".to_string();
    });
    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("address format")));
    assert!(config.validate_strict().is_err());
}

#[test]
fn test_zero_queue_capacity_rejected() {
    let config = ReceiverConfig::default_with_overrides(|c| {
        c.server.queue_capacity = 0;
    });
    assert!(config
        .validate()
        .iter()
        .any(|e| e.contains("Queue capacity")));
}

#[test]
fn test_empty_transfer_dir_rejected() {
    let config = ReceiverConfig::default_with_overrides(|c| {
        c.storage.transfer_dir = String::new();
    });
    assert!(config
        .validate()
        .iter()
        .any(|e| e.contains("Transfer directory")));
}

#[test]
fn test_suffix_without_dot_flagged() {
    let config = ReceiverConfig::default_with_overrides(|c| {
        c.storage.received_suffix = "snt".to_string();
    });
    assert!(config.validate().iter().any(|e| e.contains("suffix")));
}

#[test]
fn test_from_toml_full_document() {
    let toml = r#"
        [server]
        address = "0.0.0.0:9090"
        queue_capacity = 64
        max_payload_size = 1048576
        max_line_length = 4096

        [storage]
        transfer_dir = "/var/spool/postline"
        received_suffix = ".rcvd"
        block_size = 8192

        [logging]
        app_name = "postline-test"
        log_level = "debug"
        log_to_console = true
        json_format = false
    "#;

    let config = ReceiverConfig::from_toml(toml).unwrap();
    assert_eq!(config.server.address, "0.0.0.0:9090");
    assert_eq!(config.server.queue_capacity, 64);
    assert_eq!(config.server.max_line_length, 4096);
    assert_eq!(config.storage.received_suffix, ".rcvd");
    assert_eq!(config.storage.block_size, 8192);
    assert_eq!(config.logging.log_level, tracing::Level::DEBUG);
    assert!(config.validate().is_empty());
}

#[test]
fn test_from_env_covers_every_setting() {
    let vars = [
        ("POSTLINE_SERVER_ADDRESS", "127.0.0.1:7777"),
        ("POSTLINE_QUEUE_CAPACITY", "5"),
        ("POSTLINE_MAX_PAYLOAD_SIZE", "2048"),
        ("POSTLINE_MAX_LINE_LENGTH", "512"),
        ("POSTLINE_TRANSFER_DIR", "/tmp/inbound"),
        ("POSTLINE_RECEIVED_SUFFIX", ".part"),
        ("POSTLINE_BLOCK_SIZE", "1024"),
        ("POSTLINE_APP_NAME", "env-test"),
        ("POSTLINE_LOG_LEVEL", "warn"),
        ("POSTLINE_LOG_TO_CONSOLE", "false"),
        ("POSTLINE_JSON_FORMAT", "true"),
    ];
    for (name, value) in vars {
        std::env::set_var(name, value);
    }

    let config = ReceiverConfig::from_env().unwrap();

    for (name, _) in vars {
        std::env::remove_var(name);
    }

    assert_eq!(config.server.address, "127.0.0.1:7777");
    assert_eq!(config.server.queue_capacity, 5);
    assert_eq!(config.server.max_payload_size, 2048);
    assert_eq!(config.server.max_line_length, 512);
    assert_eq!(config.storage.transfer_dir, "/tmp/inbound");
    assert_eq!(config.storage.received_suffix, ".part");
    assert_eq!(config.storage.block_size, 1024);
    assert_eq!(config.logging.app_name, "env-test");
    assert_eq!(config.logging.log_level, tracing::Level::WARN);
    assert!(!config.logging.log_to_console);
    assert!(config.logging.json_format);
}

#[test]
fn test_from_toml_partial_document_uses_defaults() {
    let config = ReceiverConfig::from_toml(
        r#"
        [server]
        address = "127.0.0.1:7000"
    "#,
    )
    .unwrap();
    assert_eq!(config.server.address, "127.0.0.1:7000");
    assert_eq!(config.server.queue_capacity, 32);
    assert_eq!(config.storage.transfer_dir, "transfer");
}

#[test]
fn test_invalid_log_level_rejected() {
    let result = ReceiverConfig::from_toml(
        r#"
        [logging]
        app_name = "x"
        log_level = "loud"
        log_to_console = true
        json_format = false
    "#,
    );
    assert!(result.is_err());
}

#[test]
fn test_config_round_trips_through_toml() {
    let config = ReceiverConfig::default();
    let rendered = toml::to_string(&config).unwrap();
    let reparsed = ReceiverConfig::from_toml(&rendered).unwrap();
    assert_eq!(reparsed.server.address, config.server.address);
    assert_eq!(reparsed.storage.received_suffix, config.storage.received_suffix);
}
