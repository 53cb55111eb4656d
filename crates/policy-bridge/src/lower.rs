//! Lowering typed decisions into their wire form.

use decision_core::{
    encode_decision_type, encode_severity, Decision, RawDecision, RawDecisionHeader,
};
use tracing::trace;

use crate::error::SerializeError;
use crate::serializer::PayloadSerializer;

/// Consumes `decision`; header strings, maps and subject move across as-is.
pub fn lower_decision(
    decision: Decision,
    serializer: &PayloadSerializer,
) -> Result<RawDecision, SerializeError> {
    let Decision { header, payload } = decision;
    let payload = serializer.serialize(&payload)?;
    trace!(
        subject = %header.subject,
        decision_type = %header.decision_type,
        severity = %header.severity,
        "decision lowered"
    );
    Ok(RawDecision {
        header: RawDecisionHeader {
            api_version: header.api_version,
            kind: header.kind,
            subject: header.subject,
            decision_type: encode_decision_type(header.decision_type),
            labels: header.labels,
            annotations: header.annotations,
            locator: header.locator,
            severity: encode_severity(header.severity),
        },
        payload,
    })
}

/// Lowers every decision into a fresh sequence of the same length and
/// order. Fails as a whole on the first payload that cannot be serialized.
pub fn lower_decisions(
    decisions: Vec<Decision>,
    serializer: &PayloadSerializer,
) -> Result<Vec<RawDecision>, SerializeError> {
    decisions
        .into_iter()
        .map(|decision| lower_decision(decision, serializer))
        .collect()
}
