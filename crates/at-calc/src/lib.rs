//! at-calc: derived quantities of an airtightness report.
//!
//! Every function here is pure and re-evaluated on demand; nothing is cached
//! between mutations of the draft.

pub mod chart;
pub mod leakage;
pub mod volume;

pub use chart::{ChartPoint, FlowSeries, chart_max_pressure, flow_series, log_log, target_line};
pub use leakage::{CalculatedResults, MeasurementFlows, calculate, flow, measurement_flows};
pub use volume::{refresh_sub_volume, sub_volume, total_volume};
