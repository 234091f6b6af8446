//! Tests for error types

use openml_evaluations::error::NO_RESULT_CODES;
use openml_evaluations::Error;

#[test]
fn test_invalid_output_format_error() {
    let error = Error::InvalidOutputFormat("table".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid output format selected"));
    assert!(error_str.contains("table"));
    assert!(error_str.contains("'dataframe'"));
}

#[test]
fn test_missing_tag_error() {
    let error = Error::MissingTag {
        expected: "oml:evaluations",
        payload: "<oml:runs/>".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("does not contain \"oml:evaluations\""));
    assert!(error_str.contains("<oml:runs/>"));
}

#[test]
fn test_server_error_with_details() {
    let error = Error::from_server(
        110,
        "Please provide api key".to_string(),
        Some("Authentication required".to_string()),
    );
    let error_str = format!("{error}");
    assert!(error_str.contains("Server error 110"));
    assert!(error_str.contains("Please provide api key - Authentication required"));
    assert!(!error.is_no_result());
}

#[test]
fn test_server_error_without_details() {
    let error = Error::from_server(541, "Unknown measure".to_string(), None);
    assert_eq!(format!("{error}"), "Server error 541: Unknown measure");
}

#[test]
fn test_no_result_codes_classified() {
    for code in NO_RESULT_CODES {
        let error = Error::from_server(code, "No results".to_string(), None);
        assert!(error.is_no_result(), "code {code}");
        assert!(matches!(error, Error::NoResult { .. }));
    }
}

#[test]
fn test_malformed_field_error() {
    let error = Error::MalformedField {
        record: "evaluation",
        field: "value",
        value: "abc".to_string(),
        reason: "invalid float literal".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Malformed field \"value\" in evaluation record"));
    assert!(error_str.contains("\"abc\""));
}

#[test]
fn test_http_error() {
    let error = Error::Http {
        status: 503,
        body: "Service Unavailable".to_string(),
    };
    assert_eq!(format!("{error}"), "HTTP 503: Service Unavailable");
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    assert!(format!("{error}").contains("IO error"));
}
