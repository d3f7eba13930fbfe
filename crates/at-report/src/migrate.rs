//! Storage document migration.

use crate::ReportError;
use crate::schema::{MeasurementRow, ReportData, StorageDocument, VolumeRow};

pub const LATEST_VERSION: u32 = 1;

/// Name given to a report saved without a name or project name.
pub const UNTITLED_REPORT: &str = "Untitled Report";

pub fn migrate_to_latest(mut doc: StorageDocument) -> Result<StorageDocument, ReportError> {
    if doc.version > LATEST_VERSION {
        return Err(ReportError::UnsupportedVersion {
            version: doc.version,
        });
    }
    while doc.version < LATEST_VERSION {
        doc = migrate_one_version(doc)?;
    }
    Ok(doc)
}

fn migrate_one_version(doc: StorageDocument) -> Result<StorageDocument, ReportError> {
    match doc.version {
        0 => migrate_v0_to_v1(doc),
        v => Err(ReportError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 0 is whatever the browser host wrote before documents were
/// versioned: lists could be empty and report names blank.
fn migrate_v0_to_v1(mut doc: StorageDocument) -> Result<StorageDocument, ReportError> {
    ensure_required_rows(&mut doc.state.draft);
    for report in &mut doc.state.saved_reports {
        ensure_required_rows(&mut report.data);
        if report.name.trim().is_empty() {
            report.name = UNTITLED_REPORT.to_string();
        }
    }
    doc.version = 1;
    Ok(doc)
}

fn ensure_required_rows(data: &mut ReportData) {
    if data.volume_rows.is_empty() {
        data.volume_rows.push(VolumeRow::default());
    }
    if data.measurement_rows.is_empty() {
        data.measurement_rows.push(MeasurementRow::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Report, StoredState};

    #[test]
    fn migrate_latest_is_noop() {
        let doc = StorageDocument {
            state: StoredState::default(),
            version: LATEST_VERSION,
        };

        let migrated = migrate_to_latest(doc.clone()).unwrap();
        assert_eq!(migrated, doc);
    }

    #[test]
    fn migrate_v0_fills_required_rows_and_names() {
        let report = Report {
            id: "r1".to_string(),
            name: "  ".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
            data: ReportData::default(),
        };
        let doc = StorageDocument {
            state: StoredState {
                current_report_id: None,
                draft: ReportData::default(),
                saved_reports: vec![report],
            },
            version: 0,
        };

        let migrated = migrate_to_latest(doc).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        assert_eq!(migrated.state.draft.volume_rows.len(), 1);
        assert_eq!(migrated.state.draft.measurement_rows.len(), 1);
        assert!(migrated.state.draft.seal_items.is_empty());

        let saved = &migrated.state.saved_reports[0];
        assert_eq!(saved.name, UNTITLED_REPORT);
        assert_eq!(saved.data.volume_rows.len(), 1);
    }

    #[test]
    fn newer_version_is_rejected() {
        let doc = StorageDocument {
            state: StoredState::default(),
            version: LATEST_VERSION + 1,
        };
        assert!(matches!(
            migrate_to_latest(doc),
            Err(ReportError::UnsupportedVersion { .. })
        ));
    }
}
