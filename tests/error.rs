//! Tests for error module

use territory_capture::CaptureConfig;
use territory_capture::error::{CaptureError, OptionExt};

#[test]
fn test_error_display() {
    let err = CaptureError::InsufficientPoints {
        context: "territory centroid".to_string(),
        point_count: 0,
        minimum_required: 1,
    };
    assert!(err.to_string().contains("territory centroid"));
    assert!(err.to_string().contains("0 points"));
}

#[test]
fn test_option_ext() {
    let none: Option<i32> = None;
    let result = none.ok_or_insufficient_points("test", 0, 2);
    assert!(matches!(
        result,
        Err(CaptureError::InsufficientPoints { .. })
    ));

    assert_eq!(Some(3).ok_or_insufficient_points("test", 1, 1).unwrap(), 3);
}

#[test]
fn test_invalid_config_names_field() {
    let config = CaptureConfig {
        min_point_distance: -1.0,
        ..CaptureConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert!(matches!(
        err,
        CaptureError::InvalidConfig {
            field: "minPointDistance",
            ..
        }
    ));
    assert!(err.to_string().contains("minPointDistance"));
}

#[test]
fn test_json_error_converts() {
    let parsed: Result<CaptureConfig, _> = serde_json::from_str("{ not json");
    let err: CaptureError = parsed.unwrap_err().into();
    assert!(matches!(err, CaptureError::Json(_)));
}
