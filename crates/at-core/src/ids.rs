use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Local, SecondsFormat, Utc};

/// Opaque identifier carried by every list entity and persisted report.
///
/// Ids have no ordering semantics; display order is always list order.
pub type EntityId = String;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate a fresh identifier: `<unix-millis>-<9 random hex>-<sequence>`.
///
/// - the millisecond timestamp and uuid v4 fragment keep ids distinct across sessions
/// - the process-wide sequence keeps ids distinct within one millisecond
pub fn new_id() -> EntityId {
    let millis = Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple().to_string();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{:x}", millis, &random[..9], seq)
}

/// Current instant as an RFC 3339 timestamp (UTC, millisecond precision).
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Today's calendar date as `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}
