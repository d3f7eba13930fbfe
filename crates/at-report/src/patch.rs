//! Typed partial updates.
//!
//! A patch carries `Some` for every field the caller wants to change. Derived
//! fields (`VolumeRow::sub_volume`) and ids are not patchable; the store
//! refreshes derived values after every merge.

use at_core::finite_or_zero;
use serde::{Deserialize, Serialize};

use crate::schema::{
    BuildingConditions, GeneralInfo, LeakageItem, MeasurementRow, Results, SealItem, VolumeMethod,
    VolumeRow,
};

fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

/// Non-finite input is stored as 0.
fn merge_number(slot: &mut f64, value: Option<f64>) {
    merge(slot, value.map(finite_or_zero));
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralInfoPatch {
    pub project_name: Option<String>,
    pub report_number: Option<String>,
    pub project_address: Option<String>,
    pub technician_name: Option<String>,
    pub test_date: Option<String>,
    pub software_version: Option<String>,
}

impl GeneralInfoPatch {
    pub fn apply(self, target: &mut GeneralInfo) {
        merge(&mut target.project_name, self.project_name);
        merge(&mut target.report_number, self.report_number);
        merge(&mut target.project_address, self.project_address);
        merge(&mut target.technician_name, self.technician_name);
        merge(&mut target.test_date, self.test_date);
        merge(&mut target.software_version, self.software_version);
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildingConditionsPatch {
    pub envelope_area: Option<f64>,
    pub floor_area: Option<f64>,
    pub internal_temp: Option<f64>,
    pub external_temp: Option<f64>,
}

impl BuildingConditionsPatch {
    pub fn apply(self, target: &mut BuildingConditions) {
        merge_number(&mut target.envelope_area, self.envelope_area);
        merge_number(&mut target.floor_area, self.floor_area);
        merge_number(&mut target.internal_temp, self.internal_temp);
        merge_number(&mut target.external_temp, self.external_temp);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeRowPatch {
    pub name: Option<String>,
    pub method: Option<VolumeMethod>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub area: Option<f64>,
    pub height: Option<f64>,
}

impl VolumeRowPatch {
    /// Merge the supplied fields. `sub_volume` is left for the caller to refresh.
    pub fn apply(self, target: &mut VolumeRow) {
        merge(&mut target.name, self.name);
        merge(&mut target.method, self.method);
        merge_number(&mut target.length, self.length);
        merge_number(&mut target.width, self.width);
        merge_number(&mut target.area, self.area);
        merge_number(&mut target.height, self.height);
    }
}

/// `image_data: Some(None)` clears the image; `None` leaves it alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SealItemPatch {
    pub description: Option<String>,
    pub image_data: Option<Option<String>>,
}

impl SealItemPatch {
    pub fn apply(self, target: &mut SealItem) {
        merge(&mut target.description, self.description);
        merge(&mut target.image_data, self.image_data);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LeakageItemPatch {
    pub description: Option<String>,
    pub solution: Option<String>,
    pub image_data: Option<Option<String>>,
}

impl LeakageItemPatch {
    pub fn apply(self, target: &mut LeakageItem) {
        merge(&mut target.description, self.description);
        merge(&mut target.solution, self.solution);
        merge(&mut target.image_data, self.image_data);
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasurementRowPatch {
    pub dep_pressure: Option<f64>,
    pub dep_ach: Option<f64>,
    pub pre_pressure: Option<f64>,
    pub pre_ach: Option<f64>,
}

impl MeasurementRowPatch {
    pub fn apply(self, target: &mut MeasurementRow) {
        merge_number(&mut target.dep_pressure, self.dep_pressure);
        merge_number(&mut target.dep_ach, self.dep_ach);
        merge_number(&mut target.pre_pressure, self.pre_pressure);
        merge_number(&mut target.pre_ach, self.pre_ach);
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultsPatch {
    pub required_n50: Option<f64>,
    pub dep_n50: Option<f64>,
    pub pre_n50: Option<f64>,
}

impl ResultsPatch {
    pub fn apply(self, target: &mut Results) {
        merge_number(&mut target.required_n50, self.required_n50);
        merge_number(&mut target.dep_n50, self.dep_n50);
        merge_number(&mut target.pre_n50, self.pre_n50);
    }
}
