use notice_canvas::records::{load_records, normalize_text, parse_records};
use notice_canvas::{Error, FontWeight, LayoutSettings, Palette, Record, Rgb, TextRole};

#[test]
fn normalize_text_collapses_line_breaks_and_runs() {
    assert_eq!(normalize_text("  a\r\nb\nc\rd   e  "), "a b c d e");
    assert_eq!(normalize_text("\n\n"), "");
    assert_eq!(normalize_text("세대\t안내"), "세대 안내");
}

#[test]
fn parse_records_normalizes_titles_and_bodies() {
    let json = r#"[
        {"index": 2, "title": " Parking\n", "body": "Use the\r\nvisitor lots"},
        {"index": 1, "title": "Noise", "body": "Quiet hours  after 22:00"}
    ]"#;
    let records = parse_records(json).unwrap();
    assert_eq!(
        records,
        vec![
            Record::new(2, "Parking", "Use the visitor lots"),
            Record::new(1, "Noise", "Quiet hours after 22:00"),
        ]
    );
}

#[test]
fn parse_records_rejects_duplicate_indices() {
    let json = r#"[{"index":1,"title":"a","body":"b"},{"index":1,"title":"c","body":"d"}]"#;
    let err = parse_records(json).unwrap_err();
    assert!(matches!(err, Error::LayoutInconsistency(_)), "{err}");
}

#[test]
fn parse_records_rejects_malformed_json() {
    let err = parse_records(r#"[{"index":1,"title":"a"}]"#).unwrap_err();
    assert!(matches!(err, Error::Json(_)), "{err}");
}

#[test]
fn load_records_reports_the_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let err = load_records(&missing).unwrap_err();
    assert!(matches!(err, Error::Io(_)), "{err}");
    assert!(err.to_string().contains("nope.json"), "{err}");
}

#[test]
fn index_label_is_zero_padded() {
    assert_eq!(Record::new(3, "", "").index_label(), "03");
    assert_eq!(Record::new(12, "", "").index_label(), "12");
    assert_eq!(Record::new(105, "", "").index_label(), "105");
}

#[test]
fn rgb_hex_parsing() {
    assert_eq!(Rgb::from_hex("#EE7500"), Some(Rgb::new(238, 117, 0)));
    assert_eq!(Rgb::from_hex("0a0a0a"), Some(Rgb::new(10, 10, 10)));
    assert_eq!(Rgb::from_hex("#12345"), None);
    assert_eq!(Rgb::from_hex("#GG0000"), None);
    assert_eq!(Rgb::new(238, 117, 0).to_hex(), "#EE7500");
}

#[test]
fn default_palette_uses_the_brand_accent() {
    let palette = Palette::default();
    assert_eq!(palette.color(TextRole::Index), Palette::DEFAULT_ACCENT);
    assert_eq!(palette.color(TextRole::Title), Palette::DEFAULT_ACCENT);
    assert_eq!(palette.color(TextRole::Body), Rgb::new(10, 10, 10));
    assert_eq!(palette.separator, Rgb::new(200, 200, 200));
}

#[test]
fn default_settings_match_the_reference_geometry() {
    let settings = LayoutSettings::default();
    assert_eq!(settings.start_y, 430);
    assert_eq!(settings.layer_spacing, 20);
    assert_eq!(settings.title_width, 800.0);
    assert_eq!(settings.style(TextRole::Index).weight, FontWeight::Bold);
    assert_eq!(settings.style(TextRole::Body).size, 28.0);
    settings.validate().unwrap();
}

#[test]
fn settings_round_trip_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("layout.json");
    let mut settings = LayoutSettings::default();
    settings.layer_spacing = 40;
    settings.body_style.weight = FontWeight::Bold;

    settings.save(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"weight\": \"bold\""), "{text}");
    assert_eq!(LayoutSettings::load(&path).unwrap(), settings);
}

#[test]
fn settings_with_a_missing_key_are_a_configuration_error() {
    let mut value = serde_json::to_value(LayoutSettings::default()).unwrap();
    value.as_object_mut().unwrap().remove("content_width");
    let err = LayoutSettings::from_json(&value.to_string()).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)), "{err}");
    assert!(err.to_string().contains("content_width"), "{err}");
}

#[test]
fn settings_with_invalid_values_are_rejected_on_load() {
    let mut settings = LayoutSettings::default();
    settings.title_style.size = -1.0;
    let json = serde_json::to_string(&settings).unwrap();
    assert!(matches!(LayoutSettings::from_json(&json), Err(Error::Configuration(_))));
}
