//! Fresh-entity factory.
//!
//! Every entity's `Default` impl mints a new id; this module assembles them
//! into a complete draft.

use serde::{Deserialize, Serialize};

use crate::schema::{
    LeakageItem, MeasurementRow, PASSIVE_HOUSE_N50, ReportData, Results, SealItem, VolumeRow,
};

/// Descending pressure ladder seeded into every new draft, Pa.
pub const DEFAULT_PRESSURES: [f64; 5] = [50.0, 40.0, 30.0, 20.0, 10.0];

/// Tunables for a freshly created draft.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DraftDefaults {
    pub pressure_ladder: Vec<f64>,
    pub required_n50: f64,
}

impl Default for DraftDefaults {
    fn default() -> Self {
        Self {
            pressure_ladder: DEFAULT_PRESSURES.to_vec(),
            required_n50: PASSIVE_HOUSE_N50,
        }
    }
}

impl DraftDefaults {
    /// One measurement row per ladder rung; a single zero row if the ladder is empty.
    pub fn measurement_ladder(&self) -> Vec<MeasurementRow> {
        if self.pressure_ladder.is_empty() {
            return vec![MeasurementRow::default()];
        }
        self.pressure_ladder
            .iter()
            .map(|&p| MeasurementRow::at_pressure(p))
            .collect()
    }

    pub fn results(&self) -> Results {
        Results {
            required_n50: self.required_n50,
            ..Results::default()
        }
    }

    /// A complete draft: one volume row, one seal item, one leakage item,
    /// the measurement ladder, and default results.
    pub fn new_draft(&self) -> ReportData {
        ReportData {
            general_info: Default::default(),
            building_conditions: Default::default(),
            volume_rows: vec![VolumeRow::default()],
            seal_items: vec![SealItem::default()],
            leakage_items: vec![LeakageItem::default()],
            measurement_rows: self.measurement_ladder(),
            results: self.results(),
        }
    }

    /// Refill any collection left empty so the draft satisfies the
    /// one-row minimums (and seeds the optional lists like a new draft).
    pub fn reseed_empty(&self, data: &mut ReportData) {
        if data.volume_rows.is_empty() {
            data.volume_rows.push(VolumeRow::default());
        }
        if data.seal_items.is_empty() {
            data.seal_items.push(SealItem::default());
        }
        if data.leakage_items.is_empty() {
            data.leakage_items.push(LeakageItem::default());
        }
        if data.measurement_rows.is_empty() {
            data.measurement_rows = self.measurement_ladder();
        }
    }
}
