pub mod codec;
pub mod decision;
pub mod error;
pub mod ids;
pub mod payload;

pub use codec::{
    decode_decision_type, decode_severity, encode_decision_type, encode_severity, DecisionType,
    RawDecisionType, RawSeverity, Severity,
};
pub use decision::{Decision, DecisionBuilder, DecisionHeader, RawDecision, RawDecisionHeader};
pub use error::{InvalidVariant, PatternError};
pub use ids::SubjectId;
pub use payload::{Payload, PayloadIterable, PayloadMap, PayloadSet, PatternMatcher, Symbol};

pub use bigdecimal::num_bigint::BigInt;
