//! at-store: the stateful core of the report editor.
//!
//! [`ReportStore`] owns the working draft and the saved reports, exposes every
//! mutation the presentation layer may call, and writes its serializable
//! state through to a [`KeyValueStorage`] after each change.

pub mod config;
pub mod paste;
pub mod storage;
pub mod store;

pub use config::StoreConfig;
pub use paste::{MeasurementField, VolumeField, column_values};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::ReportStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {key}")]
    InvalidKey { key: String },

    #[error("Document error: {0}")]
    Report(#[from] at_report::ReportError),

    #[error("Codec error: {0}")]
    Codec(#[from] at_codec::CodecError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
