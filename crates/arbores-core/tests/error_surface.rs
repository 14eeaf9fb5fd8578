use arbores_core::errors::{ArgError, ErrorInfo};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("site", "3")
        .with_context("iteration", "17")
}

#[test]
fn invariant_errors_are_flagged_as_defects() {
    let err = ArgError::Invariant(sample_info("I001", "tree has two roots"));
    assert!(err.is_invariant_violation());
    assert_eq!(err.info().code, "I001");
    assert!(err.info().context.contains_key("site"));
}

#[test]
fn other_families_are_not_defects() {
    for err in [
        ArgError::Data(sample_info("D001", "ragged matrix")),
        ArgError::Path(sample_info("P001", "unknown node")),
        ArgError::Config(sample_info("C001", "zero chain length")),
        ArgError::Declined(sample_info("G001", "user declined")),
        ArgError::Serde(sample_info("S001", "bad json")),
    ] {
        assert!(!err.is_invariant_violation());
        assert!(err.info().context.contains_key("iteration"));
    }
}

#[test]
fn display_includes_context_and_hint() {
    let err = ArgError::Config(
        ErrorInfo::new("bridge-length", "bridge length must be positive")
            .with_context("value", "0")
            .with_hint("use a positive segment length"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("config error: bridge length must be positive"));
    assert!(rendered.contains("value=0"));
    assert!(rendered.contains("hint: use a positive segment length"));
}

#[test]
fn errors_round_trip_through_json() {
    let err = ArgError::Path(sample_info("P002", "op out of range"));
    let json = serde_json::to_string(&err).unwrap();
    let decoded: ArgError = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, err);
}
