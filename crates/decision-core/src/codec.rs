//! Symbolic decision enumerations and their integer wire codes.
//!
//! Every mapping here is an exhaustive `match` without a wildcard arm, so a
//! new variant will not compile until it has a code.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecisionType {
    Undetermined,
    Allow,
    Deny,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// Wire code of a [`DecisionType`]. Wraps the symbolic value, so only the
/// codes 0, 1 and 2 can exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RawDecisionType(DecisionType);

/// Wire code of a [`Severity`]. Only 0 through 4 can exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RawSeverity(Severity);

pub fn encode_decision_type(decision_type: DecisionType) -> RawDecisionType {
    RawDecisionType(decision_type)
}

pub fn encode_severity(severity: Severity) -> RawSeverity {
    RawSeverity(severity)
}

pub fn decode_decision_type(code: u8) -> Result<DecisionType, InvalidVariant> {
    match code {
        0 => Ok(DecisionType::Undetermined),
        1 => Ok(DecisionType::Allow),
        2 => Ok(DecisionType::Deny),
        other => Err(InvalidVariant::new("DecisionType", other)),
    }
}

pub fn decode_severity(code: u8) -> Result<Severity, InvalidVariant> {
    match code {
        0 => Ok(Severity::Info),
        1 => Ok(Severity::Low),
        2 => Ok(Severity::Medium),
        3 => Ok(Severity::High),
        4 => Ok(Severity::Critical),
        other => Err(InvalidVariant::new("Severity", other)),
    }
}

impl DecisionType {
    pub const ALL: [DecisionType; 3] = [
        DecisionType::Undetermined,
        DecisionType::Allow,
        DecisionType::Deny,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionType::Undetermined => "UNDETERMINED",
            DecisionType::Allow => "ALLOW",
            DecisionType::Deny => "DENY",
        }
    }

    pub fn encode(self) -> RawDecisionType {
        encode_decision_type(self)
    }
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Info,
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }

    pub fn encode(self) -> RawSeverity {
        encode_severity(self)
    }
}

impl RawDecisionType {
    pub fn code(self) -> u8 {
        match self.0 {
            DecisionType::Undetermined => 0,
            DecisionType::Allow => 1,
            DecisionType::Deny => 2,
        }
    }

    pub fn decode(self) -> DecisionType {
        self.0
    }
}

impl RawSeverity {
    pub fn code(self) -> u8 {
        match self.0 {
            Severity::Info => 0,
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }

    pub fn decode(self) -> Severity {
        self.0
    }
}

impl TryFrom<u8> for RawDecisionType {
    type Error = InvalidVariant;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        decode_decision_type(code).map(RawDecisionType)
    }
}

impl TryFrom<u8> for RawSeverity {
    type Error = InvalidVariant;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        decode_severity(code).map(RawSeverity)
    }
}

impl From<RawDecisionType> for u8 {
    fn from(raw: RawDecisionType) -> Self {
        raw.code()
    }
}

impl From<RawSeverity> for u8 {
    fn from(raw: RawSeverity) -> Self {
        raw.code()
    }
}

impl From<DecisionType> for RawDecisionType {
    fn from(decision_type: DecisionType) -> Self {
        encode_decision_type(decision_type)
    }
}

impl From<Severity> for RawSeverity {
    fn from(severity: Severity) -> Self {
        encode_severity(severity)
    }
}

impl FromStr for DecisionType {
    type Err = InvalidVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_uppercase().as_str() {
            "UNDETERMINED" => Ok(DecisionType::Undetermined),
            "ALLOW" => Ok(DecisionType::Allow),
            "DENY" => Ok(DecisionType::Deny),
            _ => Err(InvalidVariant::new("DecisionType", value)),
        }
    }
}

impl FromStr for Severity {
    type Err = InvalidVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_uppercase().as_str() {
            "INFO" => Ok(Severity::Info),
            "LOW" => Ok(Severity::Low),
            "MEDIUM" => Ok(Severity::Medium),
            "HIGH" => Ok(Severity::High),
            "CRITICAL" => Ok(Severity::Critical),
            _ => Err(InvalidVariant::new("Severity", value)),
        }
    }
}

impl fmt::Display for DecisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
