use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use at_report::*;
use at_store::{
    FileStorage, KeyValueStorage, MemoryStorage, ReportStore, StoreConfig, StoreError, StoreResult,
};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn key() -> String {
    StoreConfig::default().storage_key
}

fn backup_key() -> String {
    StoreConfig::default().backup_key()
}

/// Memory storage that can refuse reads, or writes to the backup key.
#[derive(Default)]
struct FlakyStorage {
    inner: MemoryStorage,
    fail_reads: bool,
    fail_backup: bool,
}

impl KeyValueStorage for FlakyStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        if self.fail_reads {
            return Err(StoreError::Io(io::Error::other("read refused")));
        }
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        if self.fail_backup && key == backup_key() {
            return Err(StoreError::Io(io::Error::other("write refused")));
        }
        self.inner.set(key, value)
    }
}

#[test]
fn mutations_write_through_to_storage() {
    let mut store = ReportStore::open(MemoryStorage::new(), StoreConfig::default());
    assert_eq!(store.storage().get(&key()).unwrap(), None);

    store.update_general_info(GeneralInfoPatch {
        project_name: Some("Alpha".to_string()),
        ..Default::default()
    });

    let content = store.storage().get(&key()).unwrap().unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(doc["version"], 1);
    assert_eq!(doc["state"]["generalInfo"]["projectName"], "Alpha");
    assert!(doc["state"]["currentReportId"].is_null());
    assert!(doc["state"]["savedReports"].as_array().unwrap().is_empty());
}

#[test]
fn unsaved_flag_is_not_persisted() {
    let mut store = ReportStore::open(MemoryStorage::new(), StoreConfig::default());
    store.add_volume_row();
    assert!(store.has_unsaved_changes());

    let content = store.storage().get(&key()).unwrap().unwrap();
    assert!(!content.contains("hasUnsavedChanges"));

    let reopened = ReportStore::open(store.storage().clone(), StoreConfig::default());
    assert!(!reopened.has_unsaved_changes());
    assert_eq!(reopened.volume_rows().len(), 2);
}

#[test]
fn reopen_from_memory_restores_everything() {
    let mut store = ReportStore::open(MemoryStorage::new(), StoreConfig::default());
    let id = store.volume_rows()[0].id.clone();
    store.update_volume_row(
        &id,
        VolumeRowPatch {
            name: Some("Hall".to_string()),
            method: Some(VolumeMethod::LengthWidth),
            length: Some(5.0),
            width: Some(2.0),
            height: Some(2.4),
            ..Default::default()
        },
    );
    store.save(Some("Alpha"));
    store.update_building_conditions(BuildingConditionsPatch {
        envelope_area: Some(88.0),
        ..Default::default()
    });

    let reopened = ReportStore::open(store.storage().clone(), StoreConfig::default());
    assert_eq!(reopened.draft(), store.draft());
    assert_eq!(reopened.saved_reports(), store.saved_reports());
    assert_eq!(reopened.current_report_id(), store.current_report_id());
    assert_eq!(reopened.volume_rows()[0].sub_volume, 24.0);
}

#[test]
fn reopen_from_files() {
    let dir = unique_temp_dir("at_store_reopen");
    let storage = FileStorage::new(dir.clone()).unwrap();
    let mut store = ReportStore::open(storage, StoreConfig::default());
    store.update_general_info(GeneralInfoPatch {
        report_number: Some("BD-7".to_string()),
        ..Default::default()
    });
    store.save(None);
    assert!(dir.join(format!("{}.json", key())).exists());

    let storage = FileStorage::new(dir.clone()).unwrap();
    let reopened = ReportStore::open(storage, StoreConfig::default());
    assert_eq!(reopened.general_info().report_number, "BD-7");
    assert_eq!(reopened.saved_reports_list().len(), 1);
    assert_eq!(reopened.saved_reports_list()[0].name, UNTITLED_REPORT);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn unreadable_document_starts_fresh() {
    for content in ["{ not json", r#"{"state": {}, "version": 99}"#, "42"] {
        let storage = MemoryStorage::with_entry(&key(), content);
        let mut store = ReportStore::open(storage, StoreConfig::default());
        assert_eq!(store.volume_rows().len(), 1);
        assert_eq!(store.measurement_rows().len(), 5);
        assert!(store.saved_reports().is_empty());
        assert!(store.is_writing_through());

        store.add_volume_row();
        assert_eq!(
            store.storage().get(&backup_key()).unwrap().as_deref(),
            Some(content)
        );
        assert_ne!(store.storage().get(&key()).unwrap().as_deref(), Some(content));
    }
}

#[test]
fn newer_document_survives_in_backup_file() {
    let dir = unique_temp_dir("at_store_backup");
    let newer = r#"{"state": {"savedReports": [{"id": "r1", "name": "Alpha"}]}, "version": 7}"#;
    let mut storage = FileStorage::new(dir.clone()).unwrap();
    storage.set(&key(), newer).unwrap();

    let mut store = ReportStore::open(storage, StoreConfig::default());
    store.save(Some("Beta"));

    let backup = fs::read_to_string(dir.join(format!("{}.json", backup_key()))).unwrap();
    assert_eq!(backup, newer);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn failed_backup_suspends_write_through() {
    let mut inner = MemoryStorage::new();
    inner.set(&key(), "{ not json").unwrap();
    let storage = FlakyStorage {
        inner,
        fail_backup: true,
        ..FlakyStorage::default()
    };

    let mut store = ReportStore::open(storage, StoreConfig::default());
    assert!(!store.is_writing_through());

    store.add_volume_row();
    store.save(Some("Alpha"));
    assert_eq!(
        store.storage().inner.get(&key()).unwrap().as_deref(),
        Some("{ not json")
    );

    store.flush().unwrap();
    assert!(store.is_writing_through());
    let reopened = ReportStore::open(store.storage().inner.clone(), StoreConfig::default());
    assert_eq!(reopened.saved_reports().len(), 1);
}

#[test]
fn failed_read_suspends_write_through() {
    let mut inner = MemoryStorage::new();
    inner.set(&key(), "{}").unwrap();
    let storage = FlakyStorage {
        inner,
        fail_reads: true,
        ..FlakyStorage::default()
    };

    let mut store = ReportStore::open(storage, StoreConfig::default());
    assert!(!store.is_writing_through());
    store.add_seal_item();
    assert_eq!(store.storage().inner.get(&key()).unwrap().as_deref(), Some("{}"));
}

#[test]
fn overflowing_paste_keeps_document_readable() {
    let mut store = ReportStore::open(MemoryStorage::new(), StoreConfig::default());
    store.save(Some("Alpha"));
    assert_eq!(store.paste_volume_rows("Hall\t1e200\t1e200\t1"), 1);
    assert_eq!(store.volume_rows()[0].sub_volume, 0.0);

    let content = store.storage().get(&key()).unwrap().unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(doc["state"]["volumeRows"][0]["subVolume"], 0.0);

    let mut reopened = ReportStore::open(store.storage().clone(), StoreConfig::default());
    assert_eq!(reopened.saved_reports().len(), 1);
    assert_eq!(reopened.volume_rows()[0].name, "Hall");
    assert_eq!(reopened.volume_rows()[0].length, 1e200);

    reopened.add_volume_row();
    let again = ReportStore::open(reopened.storage().clone(), StoreConfig::default());
    assert_eq!(again.saved_reports().len(), 1);
}

#[test]
fn host_document_with_null_numbers_loads() {
    let content = r#"{
        "state": {
            "buildingConditions": { "envelopeArea": null, "floorArea": "80" },
            "volumeRows": [
                { "id": "v1", "name": "Hall", "method": "area", "area": 10, "height": 2, "subVolume": null }
            ],
            "results": { "requiredN50": 0.6, "depN50": null, "preN50": 1.2 },
            "savedReports": [
                { "id": "r1", "name": "Alpha", "buildingConditions": { "envelopeArea": null } }
            ]
        },
        "version": 1
    }"#;
    let store = ReportStore::open(
        MemoryStorage::with_entry(&key(), content),
        StoreConfig::default(),
    );

    assert_eq!(store.saved_reports().len(), 1);
    assert_eq!(store.building_conditions().envelope_area, 0.0);
    assert_eq!(store.building_conditions().floor_area, 80.0);
    assert_eq!(store.volume_rows()[0].sub_volume, 20.0);
    assert_eq!(store.results().dep_n50, 0.0);
    assert_eq!(store.storage().get(&backup_key()).unwrap(), None);
}

#[test]
fn host_document_without_version_is_migrated() {
    let content = r#"{
        "state": {
            "currentReportId": "r1",
            "generalInfo": { "projectName": "Legacy" },
            "volumeRows": [
                { "id": "v1", "name": "Hall", "method": "l_w", "length": 5, "width": 2, "height": 2, "subVolume": 999 }
            ],
            "measurementRows": [],
            "savedReports": [
                { "id": "r1", "name": "", "createdAt": "2025-01-01T00:00:00.000Z",
                  "updatedAt": "2025-01-01T00:00:00.000Z", "volumeRows": [] }
            ]
        }
    }"#;
    let store = ReportStore::open(
        MemoryStorage::with_entry(&key(), content),
        StoreConfig::default(),
    );

    assert_eq!(store.general_info().project_name, "Legacy");
    assert_eq!(store.current_report_id(), Some("r1"));
    // Cached volumes are recomputed, empty required tables get a row.
    assert_eq!(store.volume_rows()[0].sub_volume, 20.0);
    assert_eq!(store.measurement_rows().len(), 1);
    let saved = &store.saved_reports()[0];
    assert_eq!(saved.name, UNTITLED_REPORT);
    assert_eq!(saved.data.volume_rows.len(), 1);
}

#[test]
fn custom_key_and_defaults_from_yaml() {
    let config = StoreConfig::from_yaml_str(
        "storage_key: site-b\ndefaults:\n  pressure_ladder: [60, 30]\n  required_n50: 1.0\n",
    )
    .unwrap();
    let mut store = ReportStore::open(MemoryStorage::new(), config);
    assert_eq!(store.measurement_rows().len(), 2);
    assert_eq!(store.results().required_n50, 1.0);

    store.add_seal_item();
    assert!(store.storage().get("site-b").unwrap().is_some());
    assert_eq!(store.storage().get(&key()).unwrap(), None);
}

#[test]
fn flush_reports_storage_errors() {
    let dir = unique_temp_dir("at_store_bad_key");
    let config = StoreConfig {
        storage_key: "../outside".to_string(),
        ..StoreConfig::default()
    };
    let mut store = ReportStore::open(FileStorage::new(dir.clone()).unwrap(), config);

    // The in-memory change stands even though nothing reached storage.
    store.add_volume_row();
    assert_eq!(store.volume_rows().len(), 2);
    assert!(matches!(store.flush(), Err(StoreError::InvalidKey { .. })));

    let _ = fs::remove_dir_all(dir);
}
