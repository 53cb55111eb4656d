//! Conversion boundary between typed decision policies and their raw,
//! wire-safe calling convention.

pub mod config;
pub mod error;
pub mod lower;
pub mod serializer;
pub mod wrapper;

pub use config::{BridgeConfig, SerializerConfig};
pub use error::{Error, SerializeError};
pub use lower::{lower_decision, lower_decisions};
pub use serializer::{serialize_payload, PayloadSerializer, ReplacerRule};
pub use wrapper::{
    adapter, json_adapter, BoxedRawPolicy, InputAdapter, RawPolicy, RawPolicyResult, WrappedPolicy,
};

pub use decision_core;
