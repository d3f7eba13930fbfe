//! Clipboard text ingestion (rows by newline, columns by tab).

use at_calc::refresh_sub_volume;
use at_core::parse_lenient;
use at_report::{MeasurementRow, VolumeMethod, VolumeRow};
use serde::{Deserialize, Serialize};

/// Volume table column a column-fill paste writes into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VolumeField {
    Name,
    Length,
    Width,
    Area,
    Height,
}

impl VolumeField {
    /// Write one pasted cell, then refresh the row's volume.
    pub(crate) fn write(self, row: &mut VolumeRow, value: &str) {
        match self {
            VolumeField::Name => row.name = value.trim().to_string(),
            VolumeField::Length => row.length = parse_lenient(value),
            VolumeField::Width => row.width = parse_lenient(value),
            VolumeField::Area => row.area = parse_lenient(value),
            VolumeField::Height => row.height = parse_lenient(value),
        }
        refresh_sub_volume(row);
    }
}

/// Measurement table column a column-fill paste writes into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MeasurementField {
    DepPressure,
    DepAch,
    PrePressure,
    PreAch,
}

impl MeasurementField {
    pub(crate) fn write(self, row: &mut MeasurementRow, value: &str) {
        let value = parse_lenient(value);
        match self {
            MeasurementField::DepPressure => row.dep_pressure = value,
            MeasurementField::DepAch => row.dep_ach = value,
            MeasurementField::PrePressure => row.pre_pressure = value,
            MeasurementField::PreAch => row.pre_ach = value,
        }
    }
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.trim()
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// First cell of each pasted line, trimmed: the values a column-fill writes.
pub fn column_values(text: &str) -> Vec<String> {
    lines(text)
        .map(|line| line.split('\t').next().unwrap_or_default().trim().to_string())
        .collect()
}

/// Parse whole volume rows from spreadsheet text.
///
/// Lines need at least three columns and one positive number after the name;
/// anything else (headers, blank lines, all-zero rows) is skipped. Four or
/// more columns read as name/length/width/height, three as name/area/height.
pub fn parse_volume_rows(text: &str) -> Vec<VolumeRow> {
    lines(text)
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_volume_line)
        .collect()
}

fn parse_volume_line(line: &str) -> Option<VolumeRow> {
    let cols: Vec<&str> = line.split('\t').map(str::trim).collect();
    if cols.len() < 3 {
        return None;
    }

    let nums: Vec<f64> = cols[1..].iter().map(|c| parse_lenient(c)).collect();
    if !nums.iter().any(|&n| n > 0.0) {
        return None;
    }

    let mut row = if cols.len() >= 4 {
        VolumeRow {
            name: cols[0].to_string(),
            method: VolumeMethod::LengthWidth,
            length: nums[0],
            width: nums[1],
            height: nums[2],
            ..VolumeRow::default()
        }
    } else {
        VolumeRow {
            name: cols[0].to_string(),
            method: VolumeMethod::Area,
            area: nums[0],
            height: nums[1],
            ..VolumeRow::default()
        }
    };
    refresh_sub_volume(&mut row);
    Some(row)
}
