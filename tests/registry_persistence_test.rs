//! File-backed registry tests.

mod helpers;

use chrono::Duration;
use helpers::{acme, epoch, fresh_key};
use relay_trust::config::Settings;
use relay_trust::org::TrustedRelay;
use relay_trust::RelayRegistry;

fn settings_in(dir: &tempfile::TempDir) -> Settings {
    let mut settings = Settings::default();
    settings.storage.database_path = dir.path().join("db/relays.db");
    settings
}

#[test]
fn relays_and_trust_lists_survive_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = settings_in(&dir);
    let key = fresh_key();

    {
        let registry = RelayRegistry::open(&settings).expect("open");
        registry
            .register_at("relay-1", &key, false, epoch())
            .expect("register");
        registry
            .set_trusted_relays(&acme(), &[TrustedRelay::new(key.clone()).with_name("edge")])
            .expect("set trusted relays");
    }

    let registry = RelayRegistry::open(&settings).expect("reopen");
    let record = registry.get("relay-1").expect("get").expect("relay exists");
    assert_eq!(record.public_key(), key);
    assert_eq!(record.first_seen(), epoch());
    assert!(registry.has_org_access("relay-1", &acme()).expect("evaluate"));
}

#[test]
fn settings_file_drives_registry_location() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("settings.json");
    settings_in(&dir).save_to(&config_path).expect("save settings");

    let settings = Settings::load_from(&config_path).expect("load settings");
    let registry = RelayRegistry::open(&settings).expect("open");
    registry
        .register_at("relay-1", &fresh_key(), true, epoch())
        .expect("register");

    assert!(settings.storage.database_path.exists());
}

#[test]
fn heartbeats_keep_first_seen_fixed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = RelayRegistry::open(&settings_in(&dir)).expect("open");
    let key = fresh_key();

    registry
        .register_at("relay-1", &key, false, epoch())
        .expect("register");
    let later = epoch() + Duration::hours(1);
    let record = registry
        .register_at("relay-1", &key, false, later)
        .expect("re-register");

    assert_eq!(record.first_seen(), epoch());
    assert_eq!(record.last_seen(), later);
    assert!(record.first_seen() <= record.last_seen());
}
