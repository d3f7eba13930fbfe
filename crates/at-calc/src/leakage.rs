//! Leakage rates, specific leakage, and compliance.

use at_core::EntityId;
use at_report::{MeasurementRow, ReportData};
use serde::{Deserialize, Serialize};

use crate::volume::total_volume;

/// Everything the report shows that is derived rather than entered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedResults {
    /// m³
    pub total_volume: f64,
    /// m³/h at 50 Pa, depressurization
    pub dep_v50: f64,
    /// m³/h at 50 Pa, pressurization
    pub pre_v50: f64,
    pub avg_v50: f64,
    /// h⁻¹
    pub avg_n50: f64,
    /// m³/(h·m²)
    pub dep_qe50: f64,
    pub pre_qe50: f64,
    pub avg_qe50: f64,
    /// `None` until measured n50 values exist; then whether avg n50 meets the requirement.
    pub is_passing: Option<bool>,
}

/// Flow through the envelope for an air-change rate, m³/h.
pub fn flow(ach: f64, total_volume: f64) -> f64 {
    ach * total_volume
}

/// V50 / envelope area, or 0 when there is no envelope area.
fn specific_leakage(v50: f64, envelope_area: f64) -> f64 {
    if envelope_area > 0.0 {
        v50 / envelope_area
    } else {
        0.0
    }
}

/// Three-state compliance: undetermined until there is a positive average n50.
fn compliance(avg_n50: f64, required_n50: f64) -> Option<bool> {
    if avg_n50 > 0.0 {
        Some(avg_n50 <= required_n50)
    } else {
        None
    }
}

pub fn calculate(data: &ReportData) -> CalculatedResults {
    let total_volume = total_volume(&data.volume_rows);
    let envelope_area = data.building_conditions.envelope_area;
    let results = &data.results;

    let dep_v50 = flow(results.dep_n50, total_volume);
    let pre_v50 = flow(results.pre_n50, total_volume);
    let avg_v50 = (dep_v50 + pre_v50) / 2.0;
    let avg_n50 = (results.dep_n50 + results.pre_n50) / 2.0;

    CalculatedResults {
        total_volume,
        dep_v50,
        pre_v50,
        avg_v50,
        avg_n50,
        dep_qe50: specific_leakage(dep_v50, envelope_area),
        pre_qe50: specific_leakage(pre_v50, envelope_area),
        avg_qe50: specific_leakage(avg_v50, envelope_area),
        is_passing: compliance(avg_n50, results.required_n50),
    }
}

/// Derived flows for one measurement row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementFlows {
    pub id: EntityId,
    pub dep_flow: f64,
    pub pre_flow: f64,
}

pub fn measurement_flows(rows: &[MeasurementRow], total_volume: f64) -> Vec<MeasurementFlows> {
    rows.iter()
        .map(|row| MeasurementFlows {
            id: row.id.clone(),
            dep_flow: flow(row.dep_ach, total_volume),
            pre_flow: flow(row.pre_ach, total_volume),
        })
        .collect()
}
