//! at-report: report entities, defaults, partial updates, and the persisted
//! storage document format.

pub mod defaults;
pub mod migrate;
pub mod patch;
pub mod schema;

pub use defaults::{DEFAULT_PRESSURES, DraftDefaults};
pub use migrate::{LATEST_VERSION, UNTITLED_REPORT, migrate_to_latest};
pub use patch::*;
pub use schema::*;

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a stored document and bring it to the latest version.
pub fn load_document(content: &str) -> ReportResult<StorageDocument> {
    let doc: StorageDocument = serde_json::from_str(content)?;
    migrate_to_latest(doc)
}

/// Serialize a document at the latest version.
pub fn save_document(state: &StoredState) -> ReportResult<String> {
    #[derive(serde::Serialize)]
    struct Envelope<'a> {
        state: &'a StoredState,
        version: u32,
    }

    Ok(serde_json::to_string(&Envelope {
        state,
        version: LATEST_VERSION,
    })?)
}
