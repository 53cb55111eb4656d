use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{DecisionType, RawDecisionType, RawSeverity, Severity};
use crate::ids::SubjectId;
use crate::payload::Payload;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionHeader {
    pub api_version: String,
    pub kind: String,
    pub subject: SubjectId,
    #[serde(rename = "type")]
    pub decision_type: DecisionType,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    pub locator: String,
    pub severity: Severity,
}

/// One judgment emitted by a policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub header: DecisionHeader,
    pub payload: Payload,
}

/// Fluent constructor for [`Decision`]. Starts out undetermined, at
/// [`Severity::Info`], with an empty locator and a `Null` payload.
#[derive(Debug, Clone)]
pub struct DecisionBuilder {
    header: DecisionHeader,
    payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDecisionHeader {
    pub api_version: String,
    pub kind: String,
    pub subject: SubjectId,
    #[serde(rename = "type")]
    pub decision_type: RawDecisionType,
    pub labels: HashMap<String, String>,
    pub annotations: HashMap<String, String>,
    pub locator: String,
    pub severity: RawSeverity,
}

/// Wire form of a [`Decision`]: enum fields are integer codes and the
/// payload is JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDecision {
    pub header: RawDecisionHeader,
    pub payload: String,
}

impl Decision {
    pub fn new(header: DecisionHeader, payload: impl Into<Payload>) -> Self {
        Self {
            header,
            payload: payload.into(),
        }
    }

    pub fn builder(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        subject: impl Into<SubjectId>,
    ) -> DecisionBuilder {
        DecisionBuilder {
            header: DecisionHeader {
                api_version: api_version.into(),
                kind: kind.into(),
                subject: subject.into(),
                decision_type: DecisionType::Undetermined,
                labels: HashMap::new(),
                annotations: HashMap::new(),
                locator: String::new(),
                severity: Severity::Info,
            },
            payload: Payload::Null,
        }
    }
}

impl DecisionBuilder {
    pub fn decision_type(mut self, decision_type: DecisionType) -> Self {
        self.header.decision_type = decision_type;
        self
    }

    pub fn allow(self) -> Self {
        self.decision_type(DecisionType::Allow)
    }

    pub fn deny(self) -> Self {
        self.decision_type(DecisionType::Deny)
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.header.severity = severity;
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.header.labels.insert(key.into(), value.into());
        self
    }

    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.header.annotations.insert(key.into(), value.into());
        self
    }

    pub fn locator(mut self, locator: impl Into<String>) -> Self {
        self.header.locator = locator.into();
        self
    }

    pub fn payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn build(self) -> Decision {
        Decision {
            header: self.header,
            payload: self.payload,
        }
    }
}

impl RawDecision {
    /// Parses the payload text back into a JSON value.
    pub fn payload_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }

    pub fn decode_header(&self) -> (DecisionType, Severity) {
        (
            self.header.decision_type.decode(),
            self.header.severity.decode(),
        )
    }
}
