use std::fs;
use tempfile::TempDir;

use voterdb_core::config::{Config, LogFormat, Settings, WardSettings};
use voterdb_core::error::Error;
use voterdb_core::types::{parse_age, PollingStation, SearchMethod, VoterDetails, VoterRecord, Ward};
use voterdb_core::wards::WardRegistry;

fn record(epic: &str, name: &str) -> VoterRecord {
    VoterRecord {
        epic_number: epic.to_string(),
        full_name: name.to_string(),
        relation_name: None,
        relation_type: None,
        age: None,
        gender: None,
        ward_no: None,
        part_no: Some("163".to_string()),
        sr_no: None,
        address: None,
        house_number: None,
        pincode: None,
        ac_no: None,
    }
}

#[test]
fn config_without_files_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = Config::load_from(tmp.path(), "test").expect("load");
    let settings = config.settings().expect("settings");

    assert_eq!(settings.search.limit, 50);
    assert!((settings.search.min_score - 0.2).abs() < f64::EPSILON);
    assert_eq!(settings.wards.valid, vec![140, 141, 143, 144, 145, 146, 147, 148]);
    assert_eq!(settings.log.format, LogFormat::Text);
}

#[test]
fn env_specific_file_overrides_base_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[search]\nlimit = 20\n\n[search.trigram_weights]\nword_base = 0.7\n",
    )
    .unwrap();
    fs::write(tmp.path().join("config.test.toml"), "[search]\nlimit = 10\n").unwrap();

    let config = Config::load_from(tmp.path(), "test").expect("load");
    let settings = config.settings().expect("settings");

    assert_eq!(settings.search.limit, 10, "config.test.toml wins");
    assert!((settings.search.trigram_weights.word_base - 0.7).abs() < f64::EPSILON);
    // untouched weights keep their defaults
    assert!((settings.search.trigram_weights.exact_full_name - 0.95).abs() < f64::EPSILON);

    let limit: usize = config.get("search.limit").expect("get");
    assert_eq!(limit, 10);
}

#[test]
fn zero_limit_is_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[search]\nlimit = 0\n").unwrap();
    assert!(Config::load_from(tmp.path(), "test").is_err());
}

#[test]
fn settings_round_trip_through_json() {
    let settings = Settings::default();
    let json = serde_json::to_string(&settings).unwrap();
    let back: Settings = serde_json::from_str(&json).unwrap();
    assert_eq!(settings, back);
}

#[test]
fn ward_registry_validates_configured_wards() {
    let registry = WardRegistry::new(&WardSettings::default());

    assert_eq!(registry.validate(" 146 ").unwrap(), Ward(146));
    assert!(matches!(registry.validate("142"), Err(Error::InvalidWard(w)) if w == "142"));
    assert!(matches!(registry.validate("abc"), Err(Error::InvalidWard(_))));
}

#[test]
fn ward_sets_resolve_through_aliases() {
    let registry = WardRegistry::new(&WardSettings::default());

    assert_eq!(registry.resolve_set("Ward-165"), Some(&[Ward(165)][..]));
    assert_eq!(registry.resolve_set("ward170"), Some(&[Ward(170)][..]));
    assert_eq!(registry.resolve_set("ALL").map(<[Ward]>::len), Some(8));
    assert_eq!(registry.resolve_set("voters"), registry.resolve_set("multiple"));
    assert!(registry.resolve_set("999").is_none());
}

#[test]
fn search_method_accepts_codes_and_names() {
    assert_eq!("1".parse::<SearchMethod>().unwrap(), SearchMethod::Name);
    assert_eq!("EPIC".parse::<SearchMethod>().unwrap(), SearchMethod::Epic);
    assert_eq!("part".parse::<SearchMethod>().unwrap(), SearchMethod::Booth);
    assert_eq!("house".parse::<SearchMethod>().unwrap(), SearchMethod::House);
    assert_eq!("4".parse::<SearchMethod>().unwrap(), SearchMethod::House);
    assert!(matches!("5".parse::<SearchMethod>(), Err(Error::InvalidSearchMethod(_))));
}

#[test]
fn age_parsing_is_lenient() {
    assert_eq!(parse_age(Some(" 45 ")), Some(45));
    assert_eq!(parse_age(Some("")), None);
    assert_eq!(parse_age(Some("0")), None);
    assert_eq!(parse_age(Some("n/a")), None);
    assert_eq!(parse_age(None), None);
}

#[test]
fn voter_details_fall_back_through_station_fields() {
    let station = PollingStation {
        booth_name: Some("Municipal School No. 2".to_string()),
        english_booth_address: None,
    };
    let details = VoterDetails::resolve(record("ABC1234567", "Ram Kumar"), Ward(146), Some(station));
    assert_eq!(details.polling_station, "Municipal School No. 2");
    assert_eq!(details.polling_address, "Municipal School No. 2");

    let mut with_address = record("ABC1234567", "Ram Kumar");
    with_address.address = Some("12 Station Road".to_string());
    let details = VoterDetails::resolve(with_address, Ward(146), None);
    assert_eq!(details.polling_station, "Part 163");
    assert_eq!(details.polling_address, "12 Station Road");

    let details = VoterDetails::resolve(record("ABC1234567", "Ram Kumar"), Ward(146), None);
    assert_eq!(details.polling_address, "Address not available");
}
