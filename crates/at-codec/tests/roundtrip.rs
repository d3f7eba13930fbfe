use at_codec::{decode_report, encode_report};
use at_report::*;
use proptest::prelude::*;

/// Domain content of a draft with ids stripped.
fn content(data: &ReportData) -> serde_json::Value {
    let mut value = serde_json::to_value(data).unwrap();
    for list in ["volumeRows", "sealItems", "leakageItems", "measurementRows"] {
        for entry in value[list].as_array_mut().unwrap() {
            entry.as_object_mut().unwrap().remove("id");
        }
    }
    value
}

fn sample_draft() -> ReportData {
    let mut data = DraftDefaults::default().new_draft();
    data.general_info = GeneralInfo {
        project_name: "Maple Street Passive House".to_string(),
        report_number: "BD-2026-014".to_string(),
        project_address: "12 Maple St, Innsbruck".to_string(),
        technician_name: "Kim Novak".to_string(),
        test_date: "2026-10-01".to_string(),
        software_version: "TECTITE Express 5.1".to_string(),
    };
    data.building_conditions = BuildingConditions {
        envelope_area: 150.0,
        floor_area: 82.5,
        internal_temp: 21.0,
        external_temp: -3.5,
    };
    data.volume_rows = vec![
        VolumeRow {
            name: "Ground floor".to_string(),
            method: VolumeMethod::LengthWidth,
            length: 4.0,
            width: 3.0,
            height: 2.5,
            sub_volume: 30.0,
            ..VolumeRow::default()
        },
        VolumeRow {
            name: "Loft".to_string(),
            method: VolumeMethod::Area,
            area: 15.0,
            height: 2.5,
            sub_volume: 37.5,
            ..VolumeRow::default()
        },
    ];
    data.seal_items[0].description = "Taped service penetrations".to_string();
    data.seal_items[0].image_data = Some("data:image/png;base64,iVBORw0KGgo=".to_string());
    data.leakage_items[0].description = "Front door threshold".to_string();
    data.leakage_items[0].solution = "Adjust door sweep".to_string();
    data.measurement_rows[0].dep_ach = 3.0;
    data.measurement_rows[0].pre_ach = 2.6;
    data.results.dep_n50 = 3.0;
    data.results.pre_n50 = 2.6;
    data
}

#[test]
fn roundtrip_sample_draft() {
    let data = sample_draft();
    let token = encode_report(&data).unwrap();

    assert!(!token.contains('\n'));

    let decoded = decode_report(&token, &DraftDefaults::default()).unwrap();
    assert_eq!(content(&decoded), content(&data));
}

#[test]
fn roundtrip_non_ascii_text() {
    let mut data = sample_draft();
    data.general_info.technician_name = "Zoë Müller".to_string();
    data.leakage_items[0].solution = "Fensteranschluss abdichten (≤ 0,6 h⁻¹)".to_string();

    let token = encode_report(&data).unwrap();
    let decoded = decode_report(&token, &DraftDefaults::default()).unwrap();
    assert_eq!(content(&decoded), content(&data));
}

#[test]
fn blank_requirement_and_date_fold_to_defaults() {
    let mut data = sample_draft();
    data.results.required_n50 = 0.0;
    data.general_info.test_date = String::new();

    let decoded = decode_report(&encode_report(&data).unwrap(), &DraftDefaults::default()).unwrap();
    assert_eq!(decoded.results.required_n50, PASSIVE_HOUSE_N50);
    assert_eq!(decoded.general_info.test_date, at_core::today());

    // everything else survives
    data.results.required_n50 = PASSIVE_HOUSE_N50;
    data.general_info.test_date = decoded.general_info.test_date.clone();
    assert_eq!(content(&decoded), content(&data));
}

#[test]
fn invalid_tokens_fail() {
    let defaults = DraftDefaults::default();
    assert!(decode_report("%%% definitely not a token %%%", &defaults).is_err());
    // valid base64 of plain text
    assert!(decode_report("aGVsbG8gd29ybGQ=", &defaults).is_err());
    assert!(decode_report("", &defaults).is_err());
}

fn text() -> impl Strategy<Value = String> {
    "[ -~]{0,24}"
}

fn number() -> impl Strategy<Value = f64> {
    (-1.0e6_f64..1.0e6).prop_map(|v| if v == 0.0 { 0.0 } else { v })
}

prop_compose! {
    fn volume_row()(name in text(), use_area in any::<bool>(), l in number(), w in number(), a in number(), h in number()) -> VolumeRow {
        let method = if use_area { VolumeMethod::Area } else { VolumeMethod::LengthWidth };
        let sub_volume = if use_area { a * h } else { l * w * h };
        VolumeRow { name, method, length: l, width: w, area: a, height: h, sub_volume, ..VolumeRow::default() }
    }
}

prop_compose! {
    fn measurement_row()(dp in number(), da in number(), pp in number(), pa in number()) -> MeasurementRow {
        MeasurementRow { dep_pressure: dp, dep_ach: da, pre_pressure: pp, pre_ach: pa, ..MeasurementRow::default() }
    }
}

prop_compose! {
    fn draft()(
        project_name in text(),
        technician in text(),
        envelope in number(),
        // zero reads back as the default, see blank_requirement_and_date_fold_to_defaults
        required in 0.1_f64..5.0,
        dep in number(),
        volume_rows in prop::collection::vec(volume_row(), 1..6),
        seal_desc in prop::collection::vec(text(), 1..4),
        leak_desc in prop::collection::vec((text(), text()), 1..4),
        measurement_rows in prop::collection::vec(measurement_row(), 1..8),
    ) -> ReportData {
        let mut data = DraftDefaults::default().new_draft();
        data.general_info.project_name = project_name;
        data.general_info.technician_name = technician;
        data.building_conditions.envelope_area = envelope;
        data.results.required_n50 = required;
        data.results.dep_n50 = dep;
        data.volume_rows = volume_rows;
        data.seal_items = seal_desc
            .into_iter()
            .map(|description| SealItem { description, ..SealItem::default() })
            .collect();
        data.leakage_items = leak_desc
            .into_iter()
            .map(|(description, solution)| LeakageItem { description, solution, ..LeakageItem::default() })
            .collect();
        data.measurement_rows = measurement_rows;
        data
    }
}

proptest! {
    #[test]
    fn encode_then_decode_preserves_content(data in draft()) {
        let token = encode_report(&data).unwrap();
        let decoded = decode_report(&token, &DraftDefaults::default()).unwrap();
        prop_assert_eq!(content(&decoded), content(&data));
    }
}
