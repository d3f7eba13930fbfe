//! at-core: shared foundation for the airtightness report crates.
//!
//! Contains:
//! - units (uom SI types used by the volume formula)
//! - numeric (tolerances, finite clamping, lenient text parsing)
//! - ids (locally-unique entity identifiers and timestamps)

pub mod ids;
pub mod numeric;
pub mod units;

pub use ids::*;
pub use numeric::*;
pub use units::*;
