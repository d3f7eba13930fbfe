//! at-codec: the copy-paste interchange token.
//!
//! A token is base64-wrapped compact JSON carrying every domain field of a
//! draft, with numbers as decimal text. Ids, timestamps, and derived values
//! are not carried; decoding mints fresh ids and recomputes zone volumes.

pub mod legacy;
pub mod token;

pub use legacy::{LegacyDocument, decode_report, encode_report};

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("Invalid token encoding: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected token shape: {what}")]
    UnexpectedShape { what: &'static str },
}
