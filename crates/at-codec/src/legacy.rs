//! Interchange document schema and the mapping to and from [`ReportData`].
//!
//! Encoding goes through typed records. Decoding walks a `serde_json::Value`
//! field by field: a missing or malformed field falls back to its default,
//! only a wrong container shape fails the whole token.

use at_calc::refresh_sub_volume;
use at_core::{format_number, parse_lenient, today};
use at_report::{
    BuildingConditions, DraftDefaults, GeneralInfo, LeakageItem, MeasurementRow, ReportData,
    Results, SealItem, VolumeMethod, VolumeRow, is_inline_image,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{CodecError, CodecResult, token};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LegacyDocument {
    pub static_inputs: StaticInputs,
    pub volume_rows: Vec<LegacyVolumeRow>,
    pub seal_items: Vec<LegacySealItem>,
    pub leakage_items: Vec<LegacyLeakageItem>,
    pub measurement_rows: Vec<LegacyMeasurementRow>,
}

/// Singleton fields, keyed by the form input names of the original page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct StaticInputs {
    pub project_name: String,
    pub report_number: String,
    pub project_address: String,
    pub technician_name: String,
    pub test_date: String,
    pub software_version: String,
    pub envelope_area: String,
    pub floor_area: String,
    pub internal_temp: String,
    pub external_temp: String,
    pub required_n50: String,
    pub dep_n50: String,
    pub pre_n50: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LegacyVolumeRow {
    pub name: String,
    pub method: String,
    pub l: String,
    pub w: String,
    pub a: String,
    pub h: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LegacySealItem {
    pub desc: String,
    pub img: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LegacyLeakageItem {
    pub desc: String,
    pub sol: String,
    pub img: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LegacyMeasurementRow {
    pub dep_p: String,
    pub dep_ach: String,
    pub pre_p: String,
    pub pre_ach: String,
}

impl From<&ReportData> for LegacyDocument {
    fn from(data: &ReportData) -> Self {
        let info = &data.general_info;
        let building = &data.building_conditions;
        let results = &data.results;

        Self {
            static_inputs: StaticInputs {
                project_name: info.project_name.clone(),
                report_number: info.report_number.clone(),
                project_address: info.project_address.clone(),
                technician_name: info.technician_name.clone(),
                test_date: info.test_date.clone(),
                software_version: info.software_version.clone(),
                envelope_area: format_number(building.envelope_area),
                floor_area: format_number(building.floor_area),
                internal_temp: format_number(building.internal_temp),
                external_temp: format_number(building.external_temp),
                required_n50: format_number(results.required_n50),
                dep_n50: format_number(results.dep_n50),
                pre_n50: format_number(results.pre_n50),
            },
            volume_rows: data
                .volume_rows
                .iter()
                .map(|row| LegacyVolumeRow {
                    name: row.name.clone(),
                    method: row.method.as_str().to_string(),
                    l: format_number(row.length),
                    w: format_number(row.width),
                    a: format_number(row.area),
                    h: format_number(row.height),
                })
                .collect(),
            seal_items: data
                .seal_items
                .iter()
                .map(|item| LegacySealItem {
                    desc: item.description.clone(),
                    img: item.image_data.clone().unwrap_or_default(),
                })
                .collect(),
            leakage_items: data
                .leakage_items
                .iter()
                .map(|item| LegacyLeakageItem {
                    desc: item.description.clone(),
                    sol: item.solution.clone(),
                    img: item.image_data.clone().unwrap_or_default(),
                })
                .collect(),
            measurement_rows: data
                .measurement_rows
                .iter()
                .map(|row| LegacyMeasurementRow {
                    dep_p: format_number(row.dep_pressure),
                    dep_ach: format_number(row.dep_ach),
                    pre_p: format_number(row.pre_pressure),
                    pre_ach: format_number(row.pre_ach),
                })
                .collect(),
        }
    }
}

/// Serialize every domain field of `data` into a single-line token.
pub fn encode_report(data: &ReportData) -> CodecResult<String> {
    let json = serde_json::to_string(&LegacyDocument::from(data))?;
    Ok(token::wrap(&json))
}

/// Rebuild a complete draft from a token. Empty collections are reseeded
/// from `defaults` so the one-row minimums hold.
pub fn decode_report(token: &str, defaults: &DraftDefaults) -> CodecResult<ReportData> {
    let json = token::unwrap(token.trim())?;
    let root: Value = serde_json::from_str(&json)?;
    let root = root.as_object().ok_or(CodecError::UnexpectedShape {
        what: "token is not a JSON object",
    })?;

    let empty = Map::new();
    let inputs = root
        .get("staticInputs")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let mut data = ReportData {
        general_info: general_info(inputs),
        building_conditions: building_conditions(inputs),
        volume_rows: records(root, "volumeRows")?
            .into_iter()
            .map(volume_row)
            .collect(),
        seal_items: records(root, "sealItems")?
            .into_iter()
            .map(seal_item)
            .collect(),
        leakage_items: records(root, "leakageItems")?
            .into_iter()
            .map(leakage_item)
            .collect(),
        measurement_rows: records(root, "measurementRows")?
            .into_iter()
            .map(measurement_row)
            .collect(),
        results: results(inputs, defaults),
    };

    defaults.reseed_empty(&mut data);
    Ok(data)
}

fn text(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn number(map: &Map<String, Value>, key: &str) -> f64 {
    match map.get(key) {
        Some(Value::String(s)) => parse_lenient(s),
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn image(map: &Map<String, Value>, key: &str) -> Option<String> {
    Some(text(map, key)).filter(|img| is_inline_image(img))
}

/// The records under `key`: absent or null reads as none, anything other
/// than an array of objects is a malformed token.
fn records<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> CodecResult<Vec<&'a Map<String, Value>>> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_object().ok_or(CodecError::UnexpectedShape {
                    what: "list entry is not an object",
                })
            })
            .collect(),
        Some(_) => Err(CodecError::UnexpectedShape {
            what: "list field is not an array",
        }),
    }
}

fn general_info(inputs: &Map<String, Value>) -> GeneralInfo {
    let test_date = text(inputs, "test-date");
    GeneralInfo {
        project_name: text(inputs, "project-name"),
        report_number: text(inputs, "report-number"),
        project_address: text(inputs, "project-address"),
        technician_name: text(inputs, "technician-name"),
        test_date: if test_date.is_empty() { today() } else { test_date },
        software_version: text(inputs, "software-version"),
    }
}

fn building_conditions(inputs: &Map<String, Value>) -> BuildingConditions {
    BuildingConditions {
        envelope_area: number(inputs, "envelope-area"),
        floor_area: number(inputs, "floor-area"),
        internal_temp: number(inputs, "internal-temp"),
        external_temp: number(inputs, "external-temp"),
    }
}

fn results(inputs: &Map<String, Value>, defaults: &DraftDefaults) -> Results {
    let required = number(inputs, "required-n50");
    Results {
        required_n50: if required == 0.0 {
            defaults.required_n50
        } else {
            required
        },
        dep_n50: number(inputs, "dep-n50"),
        pre_n50: number(inputs, "pre-n50"),
    }
}

fn volume_row(record: &Map<String, Value>) -> VolumeRow {
    let mut row = VolumeRow {
        name: text(record, "name"),
        method: VolumeMethod::from_legacy(&text(record, "method")),
        length: number(record, "l"),
        width: number(record, "w"),
        area: number(record, "a"),
        height: number(record, "h"),
        ..VolumeRow::default()
    };
    refresh_sub_volume(&mut row);
    row
}

fn seal_item(record: &Map<String, Value>) -> SealItem {
    SealItem {
        description: text(record, "desc"),
        image_data: image(record, "img"),
        ..SealItem::default()
    }
}

fn leakage_item(record: &Map<String, Value>) -> LeakageItem {
    LeakageItem {
        description: text(record, "desc"),
        solution: text(record, "sol"),
        image_data: image(record, "img"),
        ..LeakageItem::default()
    }
}

fn measurement_row(record: &Map<String, Value>) -> MeasurementRow {
    MeasurementRow {
        dep_pressure: number(record, "dep_p"),
        dep_ach: number(record, "dep_ach"),
        pre_pressure: number(record, "pre_p"),
        pre_ach: number(record, "pre_ach"),
        ..MeasurementRow::default()
    }
}
