//! Series for the flow-vs-pressure charts.

use at_report::{MeasurementRow, PASSIVE_HOUSE_N50};
use serde::{Deserialize, Serialize};

use crate::leakage::flow;

/// Reference pressure for n50, Pa.
pub const REFERENCE_PRESSURE: f64 = 50.0;

/// Assumed highest pressure when no points exist yet, Pa.
const EMPTY_MAX_PRESSURE: f64 = 70.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

/// (pressure, flow) points per test direction, ascending by pressure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FlowSeries {
    pub depressurization: Vec<ChartPoint>,
    pub pressurization: Vec<ChartPoint>,
}

impl FlowSeries {
    pub fn is_empty(&self) -> bool {
        self.depressurization.is_empty() && self.pressurization.is_empty()
    }

    fn pressures(&self) -> impl Iterator<Item = f64> + '_ {
        self.depressurization
            .iter()
            .chain(&self.pressurization)
            .map(|p| p.x)
    }
}

pub fn flow_series(rows: &[MeasurementRow], total_volume: f64) -> FlowSeries {
    let mut series = FlowSeries::default();

    for row in rows {
        let dep_flow = flow(row.dep_ach, total_volume);
        if row.dep_pressure > 0.0 && dep_flow > 0.0 {
            series.depressurization.push(ChartPoint {
                x: row.dep_pressure,
                y: dep_flow,
            });
        }
        let pre_flow = flow(row.pre_ach, total_volume);
        if row.pre_pressure > 0.0 && pre_flow > 0.0 {
            series.pressurization.push(ChartPoint {
                x: row.pre_pressure,
                y: pre_flow,
            });
        }
    }

    series.depressurization.sort_by(|a, b| a.x.total_cmp(&b.x));
    series.pressurization.sort_by(|a, b| a.x.total_cmp(&b.x));
    series
}

/// (ln pressure, ln flow) for the strictly positive points.
pub fn log_log(points: &[ChartPoint]) -> Vec<ChartPoint> {
    points
        .iter()
        .filter(|p| p.x > 0.0 && p.y > 0.0)
        .map(|p| ChartPoint {
            x: p.x.ln(),
            y: p.y.ln(),
        })
        .collect()
}

/// `max pressure + 10` rounded up to a multiple of 10.
pub fn chart_max_pressure(series: &FlowSeries) -> f64 {
    let max_pressure = series.pressures().reduce(f64::max).unwrap_or(EMPTY_MAX_PRESSURE);
    ((max_pressure + 10.0) / 10.0).ceil() * 10.0
}

/// Passive House limit as a straight line through the origin and
/// `0.6 × volume` at 50 Pa, drawn out to the chart edge. Empty without volume.
pub fn target_line(total_volume: f64, series: &FlowSeries) -> Vec<ChartPoint> {
    if total_volume <= 0.0 {
        return Vec::new();
    }
    let slope = PASSIVE_HOUSE_N50 * total_volume / REFERENCE_PRESSURE;
    let x_max = chart_max_pressure(series);
    vec![
        ChartPoint { x: 0.0, y: 0.0 },
        ChartPoint {
            x: x_max,
            y: slope * x_max,
        },
    ]
}
