//! Property tests for the decision enum codec.

use decision_core::{
    decode_decision_type, decode_severity, encode_decision_type, encode_severity, DecisionType,
    RawDecisionType, RawSeverity, Severity,
};
use proptest::prelude::*;

fn decision_type_strategy() -> impl Strategy<Value = DecisionType> {
    prop::sample::select(DecisionType::ALL.to_vec())
}

fn severity_strategy() -> impl Strategy<Value = Severity> {
    prop::sample::select(Severity::ALL.to_vec())
}

proptest! {
    #[test]
    fn decision_type_round_trips(decision_type in decision_type_strategy()) {
        let raw = encode_decision_type(decision_type);
        prop_assert_eq!(decode_decision_type(raw.code()).unwrap(), decision_type);
        prop_assert_eq!(raw.decode(), decision_type);
    }

    #[test]
    fn severity_round_trips(severity in severity_strategy()) {
        let raw = encode_severity(severity);
        prop_assert_eq!(decode_severity(raw.code()).unwrap(), severity);
        prop_assert_eq!(raw.decode(), severity);
    }

    #[test]
    fn symbolic_names_round_trip(severity in severity_strategy(), decision_type in decision_type_strategy()) {
        prop_assert_eq!(severity.to_string().parse::<Severity>().unwrap(), severity);
        prop_assert_eq!(decision_type.to_string().parse::<DecisionType>().unwrap(), decision_type);
    }

    #[test]
    fn decision_type_codes_outside_range_rejected(code in 3u8..=u8::MAX) {
        prop_assert!(decode_decision_type(code).is_err());
        prop_assert!(RawDecisionType::try_from(code).is_err());
    }

    #[test]
    fn severity_codes_outside_range_rejected(code in 5u8..=u8::MAX) {
        prop_assert!(decode_severity(code).is_err());
        prop_assert!(RawSeverity::try_from(code).is_err());
    }

    #[test]
    fn valid_codes_decode_then_encode(code in 0u8..5) {
        let severity = decode_severity(code).unwrap();
        prop_assert_eq!(encode_severity(severity).code(), code);
        if code < 3 {
            let decision_type = decode_decision_type(code).unwrap();
            prop_assert_eq!(encode_decision_type(decision_type).code(), code);
        }
    }
}

#[test]
fn codes_are_distinct() {
    let mut severity_codes: Vec<u8> = Severity::ALL.iter().map(|s| s.encode().code()).collect();
    severity_codes.dedup();
    assert_eq!(severity_codes.len(), Severity::ALL.len());

    let mut type_codes: Vec<u8> = DecisionType::ALL.iter().map(|t| t.encode().code()).collect();
    type_codes.dedup();
    assert_eq!(type_codes.len(), DecisionType::ALL.len());
}
