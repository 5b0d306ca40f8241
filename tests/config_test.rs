//! Loading and validating configuration files

use ram_search::config::{validate_config, Config, ConfigError, ConfigLoader};
use ram_search::{Address, WordType};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_full_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ram-search.toml");
    fs::write(
        &path,
        r#"
            [search]
            word_type = "sixteen_bit_big_endian"
            start_address = "0x7E0000"
            byte_count = 131072
            max_results = 25

            [logging]
            level = "debug"
            with_target = true
        "#,
    )
    .unwrap();

    let config = ConfigLoader::new(&path).load().unwrap();
    assert_eq!(config.search.word_type, WordType::SixteenBitBigEndian);
    assert_eq!(config.search.start().unwrap(), Address::new(0x7E0000));
    assert_eq!(config.search.byte_count, 131072);
    assert_eq!(config.search.max_results, 25);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.with_target);
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_nibble_aliases_in_config() {
    let config: Config = toml::from_str("[search]\nword_type = \"nibble_upper\"\n").unwrap();
    assert_eq!(config.search.word_type, WordType::FourBit);
}

#[test]
fn test_malformed_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    fs::write(&path, "[search]\nword_type = \"qword\"\n").unwrap();

    let loader = ConfigLoader::new(&path);
    assert!(matches!(loader.load(), Err(ConfigError::TomlParse(_))));
    // falls back to defaults
    assert_eq!(loader.load_or_default().search.word_type, WordType::EightBit);
}

#[test]
fn test_validation_rejects_bad_values() {
    let mut config = Config::default();
    config.search.start_address = "$".to_string();
    assert!(matches!(validate_config(&config), Err(ConfigError::Invalid(_))));

    let mut config = Config::default();
    config.logging.level = "verbose".to_string();
    let error = validate_config(&config).unwrap_err();
    assert!(error.to_string().contains("Invalid log level"));
}

#[test]
fn test_save_round_trip_keeps_word_type() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("saved.toml");
    let loader = ConfigLoader::new(&path);

    let mut config = Config::default();
    config.search.word_type = WordType::Mbf32LittleEndian;
    loader.save(&config).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("mbf32_little_endian"));
    assert_eq!(loader.load().unwrap().search.word_type, WordType::Mbf32LittleEndian);
}
