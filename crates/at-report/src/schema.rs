//! Report schema definitions.
//!
//! Field names serialize in camelCase so the persisted document keeps the
//! same shape the browser host has always written. Every struct defaults
//! field-by-field, so documents written before a field existed still load.

use at_core::{EntityId, finite_or_zero, new_id, parse_lenient, today};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Prefix every inline image payload must carry.
pub const INLINE_IMAGE_PREFIX: &str = "data:";

pub fn is_inline_image(payload: &str) -> bool {
    payload.starts_with(INLINE_IMAGE_PREFIX)
}

/// Read a stored number without failing the document: `null` (how the host
/// writes non-finite numbers), booleans, and other shapes read as 0, and
/// numeric text is parsed leniently.
pub fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().map_or(0.0, finite_or_zero),
        Value::String(s) => parse_lenient(&s),
        _ => 0.0,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralInfo {
    pub project_name: String,
    pub report_number: String,
    pub project_address: String,
    pub technician_name: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub test_date: String,
    pub software_version: String,
}

impl Default for GeneralInfo {
    fn default() -> Self {
        Self {
            project_name: String::new(),
            report_number: String::new(),
            project_address: String::new(),
            technician_name: String::new(),
            test_date: today(),
            software_version: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildingConditions {
    /// m²
    #[serde(deserialize_with = "lenient_number")]
    pub envelope_area: f64,
    /// m²
    #[serde(deserialize_with = "lenient_number")]
    pub floor_area: f64,
    /// °C
    #[serde(deserialize_with = "lenient_number")]
    pub internal_temp: f64,
    /// °C
    #[serde(deserialize_with = "lenient_number")]
    pub external_temp: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum VolumeMethod {
    /// length × width × height
    #[serde(rename = "l_w", alias = "length_width")]
    LengthWidth,
    /// area × height
    #[default]
    #[serde(rename = "area")]
    Area,
}

impl VolumeMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            VolumeMethod::LengthWidth => "l_w",
            VolumeMethod::Area => "area",
        }
    }

    /// Interchange tokens only distinguish `area`; anything else is L×W.
    pub fn from_legacy(tag: &str) -> Self {
        if tag == "area" {
            VolumeMethod::Area
        } else {
            VolumeMethod::LengthWidth
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeRow {
    pub id: EntityId,
    pub name: String,
    pub method: VolumeMethod,
    #[serde(deserialize_with = "lenient_number")]
    pub length: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub width: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub area: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub height: f64,
    /// m³, derived from the other fields per `method`. Never set directly.
    #[serde(deserialize_with = "lenient_number")]
    pub sub_volume: f64,
}

impl Default for VolumeRow {
    fn default() -> Self {
        Self {
            id: new_id(),
            name: String::new(),
            method: VolumeMethod::default(),
            length: 0.0,
            width: 0.0,
            area: 0.0,
            height: 0.0,
            sub_volume: 0.0,
        }
    }
}

impl VolumeRow {
    /// A freshly created row nobody has typed into yet.
    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.sub_volume == 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SealItem {
    pub id: EntityId,
    pub description: String,
    pub image_data: Option<String>,
}

impl Default for SealItem {
    fn default() -> Self {
        Self {
            id: new_id(),
            description: String::new(),
            image_data: None,
        }
    }
}

impl SealItem {
    pub fn is_blank(&self) -> bool {
        self.description.is_empty() && self.image_data.as_deref().is_none_or(str::is_empty)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LeakageItem {
    pub id: EntityId,
    pub description: String,
    pub solution: String,
    pub image_data: Option<String>,
}

impl Default for LeakageItem {
    fn default() -> Self {
        Self {
            id: new_id(),
            description: String::new(),
            solution: String::new(),
            image_data: None,
        }
    }
}

impl LeakageItem {
    pub fn is_blank(&self) -> bool {
        self.description.is_empty()
            && self.solution.is_empty()
            && self.image_data.as_deref().is_none_or(str::is_empty)
    }
}

/// One point of the multi-point test, both directions.
///
/// Flows are not stored; they are `ach × total volume` at read time. Older
/// documents carrying `depFlow`/`preFlow` load fine, the keys are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasurementRow {
    pub id: EntityId,
    /// Pa
    #[serde(deserialize_with = "lenient_number")]
    pub dep_pressure: f64,
    /// h⁻¹
    #[serde(deserialize_with = "lenient_number")]
    pub dep_ach: f64,
    /// Pa
    #[serde(deserialize_with = "lenient_number")]
    pub pre_pressure: f64,
    /// h⁻¹
    #[serde(deserialize_with = "lenient_number")]
    pub pre_ach: f64,
}

impl Default for MeasurementRow {
    fn default() -> Self {
        Self::at_pressure(0.0)
    }
}

impl MeasurementRow {
    pub fn at_pressure(pressure: f64) -> Self {
        Self {
            id: new_id(),
            dep_pressure: pressure,
            dep_ach: 0.0,
            pre_pressure: pressure,
            pre_ach: 0.0,
        }
    }

    pub fn is_blank(&self) -> bool {
        !(self.dep_pressure > 0.0
            || self.dep_ach > 0.0
            || self.pre_pressure > 0.0
            || self.pre_ach > 0.0)
    }
}

/// Passive House limit at 50 Pa.
pub const PASSIVE_HOUSE_N50: f64 = 0.6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Results {
    /// h⁻¹
    #[serde(deserialize_with = "lenient_number")]
    pub required_n50: f64,
    /// h⁻¹, operator-entered
    #[serde(deserialize_with = "lenient_number")]
    pub dep_n50: f64,
    /// h⁻¹, operator-entered
    #[serde(deserialize_with = "lenient_number")]
    pub pre_n50: f64,
}

impl Default for Results {
    fn default() -> Self {
        Self {
            required_n50: PASSIVE_HOUSE_N50,
            dep_n50: 0.0,
            pre_n50: 0.0,
        }
    }
}

/// Every domain field of one report: the working draft and each persisted
/// snapshot share this shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportData {
    pub general_info: GeneralInfo,
    pub building_conditions: BuildingConditions,
    pub volume_rows: Vec<VolumeRow>,
    pub seal_items: Vec<SealItem>,
    pub leakage_items: Vec<LeakageItem>,
    pub measurement_rows: Vec<MeasurementRow>,
    pub results: Results,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default = "new_id")]
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    /// RFC 3339
    #[serde(default)]
    pub created_at: String,
    /// RFC 3339
    #[serde(default)]
    pub updated_at: String,
    #[serde(flatten)]
    pub data: ReportData,
}

/// Listing entry for the saved-reports panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedReport {
    pub id: EntityId,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Report> for SavedReport {
    fn from(report: &Report) -> Self {
        Self {
            id: report.id.clone(),
            name: report.name.clone(),
            created_at: report.created_at.clone(),
            updated_at: report.updated_at.clone(),
        }
    }
}

/// Serializable subset of the store: bound id, draft, and saved reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredState {
    pub current_report_id: Option<EntityId>,
    #[serde(flatten)]
    pub draft: ReportData,
    pub saved_reports: Vec<Report>,
}

/// Envelope written under the storage key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StorageDocument {
    #[serde(default)]
    pub state: StoredState,
    #[serde(default)]
    pub version: u32,
}
