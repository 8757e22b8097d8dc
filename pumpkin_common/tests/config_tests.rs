//! Configuration loading tests.
//!
//! Tests for `PumpkinConfig`: the shipped sample file, loading from disk,
//! group channel-count mismatch, calibration and channel validation.

use pumpkin_common::config::{ConfigError, ConfigLoader, PumpkinConfig};
use pumpkin_common::consts::MAX_EYES;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SAMPLE: &str = include_str!("../../config/pumpkin.toml");

/// Write `content` as pumpkin.toml into `dir` and return its path.
fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("pumpkin.toml");
    fs::write(&path, content).unwrap();
    path
}

fn eyes_toml(count: u8) -> String {
    (0..count)
        .map(|ch| format!("[[eyes]]\nname = \"eye_{ch}\"\nchannel = {ch}\nverbose = false\n"))
        .collect()
}

// ─── Tests ──────────────────────────────────────────────────────────

/// Test: the sample configuration shipped with the repo is valid.
#[test]
fn sample_config_is_valid() {
    let config = PumpkinConfig::from_toml(SAMPLE).expect("sample parses");
    config.validate().expect("sample validates");

    assert_eq!(config.eyes.len(), MAX_EYES);
    assert_eq!(config.layout.columns, 4);
    assert_eq!(config.pwm.driver, "pca9685");
    assert_eq!(config.pwm.frequency_hz, 60);
    assert_eq!(config.eyes[3].calibration.min_bound, 30.0);
    assert_eq!(config.eyes[7].calibration.max_bound, 70.0);
    assert_eq!(config.show.repeat, 0);
    assert!(config.group("top_row").is_some());
    assert!(config.group("middle_row").is_none());
}

/// Test: loading from disk goes through the same parser.
#[test]
fn load_from_file() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(tmp.path(), &eyes_toml(2));

    let config = PumpkinConfig::load(&path).expect("should load");
    config.validate().unwrap();
    assert_eq!(config.eyes[1].name, "eye_1");
}

/// Test: a group whose channel list disagrees with its declared size is fatal.
#[test]
fn group_channel_count_mismatch() {
    let text = format!(
        "{}\n[[groups]]\nname = \"pair\"\nservo_count = 2\nchannels = [0, 1, 2]\n",
        eyes_toml(2)
    );
    let config = PumpkinConfig::from_toml(&text).unwrap();

    match config.validate() {
        Err(ConfigError::ChannelCountMismatch {
            group,
            declared,
            given,
        }) => {
            assert_eq!(group, "pair");
            assert_eq!(declared, 2);
            assert_eq!(given, 3);
        }
        other => panic!("expected ChannelCountMismatch, got {other:?}"),
    }
}

/// Test: eye on a channel the driver does not have.
#[test]
fn eye_channel_out_of_range() {
    let text = "[[eyes]]\nname = \"far\"\nchannel = 16\n";
    let config = PumpkinConfig::from_toml(text).unwrap();
    assert_eq!(config.validate(), Err(ConfigError::InvalidChannel(16)));
}

/// Test: inverted calibration bounds.
#[test]
fn inverted_calibration() {
    let text = r#"
[[eyes]]
name = "a"
channel = 0
calibration = { min_bound = 150, max_bound = 30 }
"#;
    let config = PumpkinConfig::from_toml(text).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidCalibration { .. })
    ));
}

/// Test: duplicate group names.
#[test]
fn duplicate_group_names() {
    let text = format!(
        "{}\n[[groups]]\nname = \"g\"\nservo_count = 1\nchannels = [0]\n\
         [[groups]]\nname = \"g\"\nservo_count = 1\nchannels = [1]\n",
        eyes_toml(2)
    );
    let config = PumpkinConfig::from_toml(&text).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Duplicate group name"));
}

/// Test: unknown keys inside a section are rejected at parse time.
#[test]
fn unknown_field_rejected() {
    let text = format!("{}\n[pwm]\nfrequency = 60\n", eyes_toml(1));
    assert!(matches!(
        PumpkinConfig::from_toml(&text),
        Err(ConfigError::ParseError(_))
    ));
}
