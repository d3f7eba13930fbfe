//! Building volume from the zone table.

use at_core::{Volume, finite_or_zero, in_m3, m, m2};
use at_report::{VolumeMethod, VolumeRow};

/// Zone volume in m³ per the row's active method.
pub fn sub_volume(row: &VolumeRow) -> f64 {
    let v: Volume = match row.method {
        VolumeMethod::LengthWidth => m(row.length) * m(row.width) * m(row.height),
        VolumeMethod::Area => m2(row.area) * m(row.height),
    };
    in_m3(v)
}

/// Recompute the derived `sub_volume` after any change to the row. A product
/// that overflows is stored as 0.
pub fn refresh_sub_volume(row: &mut VolumeRow) {
    row.sub_volume = finite_or_zero(sub_volume(row));
}

/// Sum of all zone volumes, in list order.
pub fn total_volume(rows: &[VolumeRow]) -> f64 {
    rows.iter().map(|r| r.sub_volume).sum()
}
