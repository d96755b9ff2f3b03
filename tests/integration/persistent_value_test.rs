//! Persistent Value Integration Tests
//!
//! Exercises `PersistentValue` over the on-disk store the way an application
//! would: values survive a restart, and a damaged store never takes the
//! application down with it.

use std::fs;

use serde::{Deserialize, Serialize};
use sharekit_local_store::{FileKeyValueStore, KeyValueStore, PersistentValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ViewSettings {
    sort_by: String,
    show_completed: bool,
    collapsed_categories: Vec<String>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            sort_by: "name".to_string(),
            show_completed: true,
            collapsed_categories: Vec::new(),
        }
    }
}

#[test]
fn test_values_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local-store.json");

    {
        let mut settings = PersistentValue::new(
            FileKeyValueStore::new(&path),
            "viewSettings",
            ViewSettings::default(),
        );
        settings.update(|current| ViewSettings {
            sort_by: "updatedAt".to_string(),
            collapsed_categories: vec!["cat-trips".to_string()],
            ..current.clone()
        });

        let mut counter = PersistentValue::new(FileKeyValueStore::new(&path), "openCount", 0u64);
        counter.update(|n| n + 1);
    }

    let settings = PersistentValue::new(
        FileKeyValueStore::new(&path),
        "viewSettings",
        ViewSettings::default(),
    );
    assert_eq!(settings.get().sort_by, "updatedAt");
    assert_eq!(settings.get().collapsed_categories, vec!["cat-trips"]);
    assert!(settings.get().show_completed);

    let counter = PersistentValue::new(FileKeyValueStore::new(&path), "openCount", 0u64);
    assert_eq!(*counter.get(), 1);
}

#[test_log::test]
fn test_corrupt_store_falls_back_and_keeps_running() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local-store.json");
    fs::write(&path, "{ this is not json").unwrap();

    let mut settings = PersistentValue::new(
        FileKeyValueStore::new(&path),
        "viewSettings",
        ViewSettings::default(),
    );
    assert_eq!(settings.get(), &ViewSettings::default());

    // The write fails too; memory still moves forward
    settings.set(ViewSettings {
        show_completed: false,
        ..ViewSettings::default()
    });
    assert!(!settings.get().show_completed);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "{ this is not json",
        "a failed write must not clobber the file"
    );
}

#[test]
fn test_construction_does_not_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local-store.json");

    let _settings = PersistentValue::new(
        FileKeyValueStore::new(&path),
        "viewSettings",
        ViewSettings::default(),
    );

    assert!(!path.exists());
    assert!(FileKeyValueStore::new(&path)
        .read("viewSettings")
        .unwrap()
        .is_none());
}

#[test]
fn test_store_path_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = sharekit_common::Config {
        database_url: None,
        resolution_policy: Default::default(),
        local_store_path: dir.path().join("configured.json"),
        rust_log: "sharekit=info".to_string(),
    };

    let mut theme = PersistentValue::new(
        FileKeyValueStore::new(&config.local_store_path),
        "theme",
        "light".to_string(),
    );
    theme.set("dark".to_string());

    let raw = fs::read_to_string(&config.local_store_path).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored["theme"], serde_json::json!("\"dark\""));
}
