use bustrack_rs::pipeline::format::format_duration;
use bustrack_rs::types::tracking::Eta;

#[test]
fn formats_seconds_minutes_and_hours() {
    assert_eq!(format_duration(42.0), "42s");
    assert_eq!(format_duration(59.4), "59s");
    assert_eq!(format_duration(59.6), "1m 0s");
    assert_eq!(format_duration(200.0), "3m 20s");
    assert_eq!(format_duration(3725.0), "1h 2m");
}

#[test]
fn negative_durations_show_as_zero() {
    assert_eq!(format_duration(-12.0), "0s");
}

#[test]
fn unknown_eta_renders_as_dash() {
    assert_eq!(Eta::Unknown.to_string(), "–");
    assert_eq!(Eta::Known(125.0).to_string(), "2m 5s");
    assert_eq!(Eta::from_seconds(f64::INFINITY), Eta::Unknown);
    assert_eq!(Eta::from_seconds(f64::NAN), Eta::Unknown);
}

#[test]
fn eta_serializes_with_status_tag() {
    let known = serde_json::to_value(Eta::Known(90.0)).expect("serialize");
    assert_eq!(known, serde_json::json!({ "status": "known", "seconds": 90.0 }));
    let unknown = serde_json::to_value(Eta::Unknown).expect("serialize");
    assert_eq!(unknown, serde_json::json!({ "status": "unknown" }));
}
