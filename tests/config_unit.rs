//! Tests for configuration file loading and override behavior.

use std::io::Write;

use taxelview::config::Config;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn test_full_config_loads() {
    let file = write_config(
        r#"
[serial]
port = "/dev/ttyUSB3"
baud = 115200
timeout_ms = 250

[display]
ceiling = 4095
"#,
    );

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.serial.port.as_deref(), Some("/dev/ttyUSB3"));
    assert_eq!(config.serial.baud, Some(115_200));
    assert_eq!(config.serial.timeout_ms, Some(250));
    assert_eq!(config.display.ceiling, Some(4095));
}

#[test]
fn test_empty_config_is_all_defaults() {
    let file = write_config("");
    let config = Config::load(Some(file.path())).unwrap();
    assert!(config.serial.port.is_none());
    assert!(config.serial.baud.is_none());
    assert!(config.serial.timeout_ms.is_none());
    assert!(config.display.ceiling.is_none());
}

#[test]
fn test_unparseable_config_is_an_error() {
    let file = write_config("[serial\nport=");
    let err = Config::load(Some(file.path())).unwrap_err();
    let msg = format!("{}", err);
    assert!(msg.contains("Failed to parse config file"));
}

#[test]
fn test_missing_file_is_not_an_error() {
    let config = Config::load(Some(std::path::Path::new("/no/such/file.toml"))).unwrap();
    assert!(config.serial.port.is_none());
}
