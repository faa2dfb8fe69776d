// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use foodcam::Config;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.api_base_url, "http://127.0.0.1:3000");
    assert!(
        !config.capture_on_stop,
        "Stopping the stream should not silently capture by default"
    );
    assert_eq!(config.device_index, 0);
    assert_eq!((config.ideal_width, config.ideal_height), (1920, 1080));
    assert_eq!(config.ideal_frame_rate, 30);
}

#[test]
fn test_config_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = Config {
        api_base_url: "http://10.0.0.5:8080".to_string(),
        capture_on_stop: true,
        device_index: 2,
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path);
    assert_eq!(loaded, config);
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = Config::load_from(&dir.path().join("does_not_exist.json"));
    assert_eq!(loaded, Config::default());
}

#[test]
fn test_malformed_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "not json {").unwrap();

    let loaded = Config::load_from(&path);
    assert_eq!(loaded, Config::default());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"capture_on_stop":true}"#).unwrap();

    let loaded = Config::load_from(&path);
    assert!(loaded.capture_on_stop);
    assert_eq!(loaded.api_base_url, Config::default().api_base_url);
    assert_eq!(loaded.ideal_width, Config::default().ideal_width);
}

#[test]
fn test_session_options_reflect_config() {
    let config = Config {
        capture_on_stop: true,
        device_index: 1,
        ideal_width: 640,
        ideal_height: 480,
        ..Config::default()
    };

    let options = config.session_options();
    assert!(options.capture_on_stop);
    assert_eq!(options.device_index, 1);
    assert_eq!(options.constraints.ideal_width, 640);
    assert_eq!(options.constraints.ideal_height, 480);
}
