//! Turning a typed policy into the raw calling convention.
//!
//! Construction happens in two steps so each half is checked on its own:
//!
//! ```ignore
//! let raw = adapter(convert_query).wrap(my_policy);
//! let out = raw.invoke(raw_input, params)?;
//! ```
//!
//! `adapter` fixes how the untyped input is read; `wrap` takes the policy
//! itself, so a policy with the wrong signature is reported against that
//! argument.

use decision_core::{Decision, RawDecision};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::SerializeError;
use crate::lower::lower_decisions;
use crate::serializer::PayloadSerializer;

/// The only shape a host runtime needs to know about.
pub trait RawPolicy<D> {
    type Error;

    /// `raw_data` has already been validated upstream and reaches the
    /// policy unchanged.
    fn invoke(&self, raw_input: Value, raw_data: D) -> Result<RawPolicyResult, Self::Error>;
}

pub type BoxedRawPolicy<D, E> = Box<dyn RawPolicy<D, Error = E> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPolicyResult {
    pub result: Vec<RawDecision>,
}

impl RawPolicyResult {
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// First construction stage: holds the input converter.
#[derive(Debug, Clone)]
pub struct InputAdapter<C> {
    convert: C,
}

pub struct WrappedPolicy<C, P> {
    convert: C,
    policy: P,
    serializer: PayloadSerializer,
}

pub fn adapter<C>(input_converter: C) -> InputAdapter<C> {
    InputAdapter {
        convert: input_converter,
    }
}

/// Adapter whose converter deserializes the raw input into `Q` with serde.
pub fn json_adapter<Q, E>() -> InputAdapter<fn(Value) -> Result<Q, E>>
where
    Q: DeserializeOwned,
    E: From<serde_json::Error>,
{
    adapter(convert_json::<Q, E> as fn(Value) -> Result<Q, E>)
}

fn convert_json<Q, E>(raw_input: Value) -> Result<Q, E>
where
    Q: DeserializeOwned,
    E: From<serde_json::Error>,
{
    serde_json::from_value(raw_input).map_err(E::from)
}

impl<C> InputAdapter<C> {
    pub fn wrap<Q, D, E, P>(self, policy: P) -> WrappedPolicy<C, P>
    where
        C: Fn(Value) -> Result<Q, E>,
        P: Fn(Q, D) -> Result<Vec<Decision>, E>,
        E: From<SerializeError>,
    {
        self.wrap_with(policy, PayloadSerializer::new())
    }

    pub fn wrap_with<Q, D, E, P>(
        self,
        policy: P,
        serializer: PayloadSerializer,
    ) -> WrappedPolicy<C, P>
    where
        C: Fn(Value) -> Result<Q, E>,
        P: Fn(Q, D) -> Result<Vec<Decision>, E>,
        E: From<SerializeError>,
    {
        WrappedPolicy {
            convert: self.convert,
            policy,
            serializer,
        }
    }
}

impl<C, P> WrappedPolicy<C, P> {
    pub fn serializer(&self) -> &PayloadSerializer {
        &self.serializer
    }

    pub fn boxed<D, E>(self) -> BoxedRawPolicy<D, E>
    where
        Self: RawPolicy<D, Error = E> + Send + Sync + 'static,
    {
        Box::new(self)
    }
}

impl<C, P, Q, D, E> RawPolicy<D> for WrappedPolicy<C, P>
where
    C: Fn(Value) -> Result<Q, E>,
    P: Fn(Q, D) -> Result<Vec<Decision>, E>,
    E: From<SerializeError>,
{
    type Error = E;

    fn invoke(&self, raw_input: Value, raw_data: D) -> Result<RawPolicyResult, E> {
        let query = (self.convert)(raw_input)?;
        let decisions = (self.policy)(query, raw_data)?;
        debug!(decisions = decisions.len(), "policy returned decisions");
        let result = lower_decisions(decisions, &self.serializer)?;
        Ok(RawPolicyResult { result })
    }
}
