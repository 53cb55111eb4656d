//! Payload to JSON text conversion.
//!
//! Encoding walks the payload once. At every position, top-level or nested,
//! the registered [`ReplacerRule`]s are consulted in order. The first rule
//! that recognises the value supplies a replacement, which is then encoded
//! with the default JSON rules (its children go through the rules again).
//! Values no rule claims are encoded as plain JSON.
//!
//! Plain arrays and objects nest without limit. Only the number of
//! [`Payload::Iterable`] expansions on the current path is bounded, since a
//! user iterable may yield itself.

use std::fmt;

use anyhow::{bail, Result};
use decision_core::Payload;
use serde_json::{Map, Value};
use tracing::{trace, warn};

use crate::config::SerializerConfig;
use crate::error::SerializeError;

pub const DEFAULT_MAX_ITERABLE_DEPTH: usize = 128;

/// Names of the built-in rules, in their default registration order.
pub const BUILTIN_RULES: [&str; 6] = ["bigint", "symbol", "set", "map", "pattern", "iterable"];

pub trait ReplacerRule: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the stand-in value when this rule handles `value`.
    fn replace(&self, value: &Payload) -> Option<Payload>;
}

/// Arbitrary-precision integers become their exact decimal digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct BigIntRule;

/// Symbols become their display string.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolRule;

/// Sets become an array of their elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetRule;

/// Maps become an array of `[key, value]` pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapRule;

/// Regular expressions become `/source/flags`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternRule;

/// Any other iterable becomes an array of what it yields.
#[derive(Debug, Clone, Copy, Default)]
pub struct IterableRule;

impl ReplacerRule for BigIntRule {
    fn name(&self) -> &str {
        "bigint"
    }

    fn replace(&self, value: &Payload) -> Option<Payload> {
        match value {
            Payload::BigInt(number) => Some(Payload::String(number.to_string())),
            _ => None,
        }
    }
}

impl ReplacerRule for SymbolRule {
    fn name(&self) -> &str {
        "symbol"
    }

    fn replace(&self, value: &Payload) -> Option<Payload> {
        match value {
            Payload::Symbol(symbol) => Some(Payload::String(symbol.to_string())),
            _ => None,
        }
    }
}

impl ReplacerRule for SetRule {
    fn name(&self) -> &str {
        "set"
    }

    fn replace(&self, value: &Payload) -> Option<Payload> {
        match value {
            Payload::Set(set) => Some(Payload::Array(set.iter().cloned().collect())),
            _ => None,
        }
    }
}

impl ReplacerRule for MapRule {
    fn name(&self) -> &str {
        "map"
    }

    fn replace(&self, value: &Payload) -> Option<Payload> {
        match value {
            Payload::Map(map) => Some(Payload::Array(
                map.iter()
                    .map(|(key, value)| Payload::Array(vec![key.clone(), value.clone()]))
                    .collect(),
            )),
            _ => None,
        }
    }
}

impl ReplacerRule for PatternRule {
    fn name(&self) -> &str {
        "pattern"
    }

    fn replace(&self, value: &Payload) -> Option<Payload> {
        match value {
            Payload::Pattern(pattern) => Some(Payload::String(pattern.to_string())),
            _ => None,
        }
    }
}

impl ReplacerRule for IterableRule {
    fn name(&self) -> &str {
        "iterable"
    }

    fn replace(&self, value: &Payload) -> Option<Payload> {
        match value {
            Payload::Iterable(iterable) => Some(Payload::Array(iterable.iter_values().collect())),
            _ => None,
        }
    }
}

pub fn builtin_rule(name: &str) -> Option<Box<dyn ReplacerRule>> {
    let rule: Box<dyn ReplacerRule> = match name {
        "bigint" => Box::new(BigIntRule),
        "symbol" => Box::new(SymbolRule),
        "set" => Box::new(SetRule),
        "map" => Box::new(MapRule),
        "pattern" => Box::new(PatternRule),
        "iterable" => Box::new(IterableRule),
        _ => return None,
    };
    Some(rule)
}

pub struct PayloadSerializer {
    rules: Vec<Box<dyn ReplacerRule>>,
    max_iterable_depth: usize,
}

impl PayloadSerializer {
    /// Serializer with every built-in rule registered.
    pub fn new() -> Self {
        let mut serializer = Self::bare();
        serializer.rules = vec![
            Box::new(BigIntRule),
            Box::new(SymbolRule),
            Box::new(SetRule),
            Box::new(MapRule),
            Box::new(PatternRule),
            Box::new(IterableRule),
        ];
        serializer
    }

    /// Serializer with no rules: only JSON-native payloads encode.
    pub fn bare() -> Self {
        Self {
            rules: Vec::new(),
            max_iterable_depth: DEFAULT_MAX_ITERABLE_DEPTH,
        }
    }

    pub fn from_config(config: &SerializerConfig) -> Result<Self> {
        let mut serializer = Self::bare().with_max_iterable_depth(config.max_iterable_depth);
        for name in &config.rules {
            match builtin_rule(name) {
                Some(rule) => serializer.rules.push(rule),
                None => bail!("unknown replacer rule: {name}"),
            }
        }
        Ok(serializer)
    }

    /// Appends a rule after the ones already registered.
    pub fn with_rule(mut self, rule: impl ReplacerRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Bounds how many iterables may be nested inside one another.
    pub fn with_max_iterable_depth(mut self, max_iterable_depth: usize) -> Self {
        self.max_iterable_depth = max_iterable_depth;
        self
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn max_iterable_depth(&self) -> usize {
        self.max_iterable_depth
    }

    /// Produces compact JSON text for `payload`.
    pub fn serialize(&self, payload: &Payload) -> Result<String, SerializeError> {
        let value = self.to_value(payload)?;
        Ok(serde_json::to_string(&value)?)
    }

    pub fn to_value(&self, payload: &Payload) -> Result<Value, SerializeError> {
        self.encode(payload, 0)
    }

    /// `iterables` counts the iterable expansions above `value`.
    fn encode(&self, value: &Payload, iterables: usize) -> Result<Value, SerializeError> {
        let iterables = match value {
            Payload::Iterable(_) if iterables >= self.max_iterable_depth => {
                warn!(
                    max_iterable_depth = self.max_iterable_depth,
                    "iterable nesting limit reached"
                );
                return Err(SerializeError::DepthExceeded {
                    max_depth: self.max_iterable_depth,
                });
            }
            Payload::Iterable(_) => iterables + 1,
            _ => iterables,
        };
        for rule in &self.rules {
            if let Some(replacement) = rule.replace(value) {
                trace!(rule = rule.name(), kind = value.kind(), "replacer rule applied");
                return self.encode_default(&replacement, iterables);
            }
        }
        self.encode_default(value, iterables)
    }

    fn encode_default(&self, value: &Payload, iterables: usize) -> Result<Value, SerializeError> {
        let encoded = match value {
            Payload::Null => Value::Null,
            Payload::Bool(flag) => Value::Bool(*flag),
            Payload::Number(number) => Value::Number(number.clone()),
            Payload::String(text) => Value::String(text.clone()),
            Payload::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.encode(item, iterables))
                    .collect::<Result<_, _>>()?,
            ),
            Payload::Object(members) => {
                let mut object = Map::with_capacity(members.len());
                for (key, member) in members {
                    object.insert(key.clone(), self.encode(member, iterables)?);
                }
                Value::Object(object)
            }
            other => {
                warn!(kind = other.kind(), "payload value has no JSON encoding");
                return Err(SerializeError::Unsupported { kind: other.kind() });
            }
        };
        Ok(encoded)
    }
}

impl Default for PayloadSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PayloadSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadSerializer")
            .field("rules", &self.rule_names())
            .field("max_iterable_depth", &self.max_iterable_depth)
            .finish()
    }
}

/// Serializes with the built-in rules and the default iterable nesting limit.
pub fn serialize_payload(payload: &Payload) -> Result<String, SerializeError> {
    PayloadSerializer::new().serialize(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use decision_core::{BigInt, PatternMatcher, PayloadIterable, Symbol};
    use serde_json::json;

    #[derive(Debug)]
    struct Countdown(i64);

    impl PayloadIterable for Countdown {
        fn iter_values(&self) -> Box<dyn Iterator<Item = Payload> + '_> {
            Box::new((1..=self.0).rev().map(Payload::from))
        }
    }

    /// Yields itself forever, one level deeper each time.
    #[derive(Debug)]
    struct Ouroboros;

    impl PayloadIterable for Ouroboros {
        fn iter_values(&self) -> Box<dyn Iterator<Item = Payload> + '_> {
            Box::new(std::iter::once(Payload::iterable(Ouroboros)))
        }
    }

    struct UpperCaseStrings;

    impl ReplacerRule for UpperCaseStrings {
        fn name(&self) -> &str {
            "upper"
        }

        fn replace(&self, value: &Payload) -> Option<Payload> {
            match value {
                Payload::String(text) => Some(Payload::String(text.to_uppercase())),
                _ => None,
            }
        }
    }

    #[test]
    fn test_plain_json_matches_serde_json() {
        let value = json!({"b": [1, 2.5, null, true], "a": {"nested": "text"}, "c": "\u{1F600}\""});
        let expected = serde_json::to_string(&value).unwrap();
        let actual = serialize_payload(&Payload::from(value)).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_big_integer_keeps_digits() {
        let n: BigInt = "9007199254740993".parse().unwrap();
        let payload = Payload::object([("n", Payload::from(n))]);
        let text = serialize_payload(&payload).unwrap();
        assert_eq!(text, r#"{"n":"9007199254740993"}"#);
    }

    #[test]
    fn test_set_matches_equivalent_array() {
        let set = Payload::set([
            Payload::from(1),
            Payload::Array(vec![Payload::from(1)]),
            Payload::from(2),
            Payload::from(3),
        ]);
        let as_set = serialize_payload(&Payload::object([("s", set)])).unwrap();
        let as_array = serialize_payload(&Payload::from(json!({"s": [1, [1], 2, 3]}))).unwrap();
        assert_eq!(as_set, as_array);
    }

    #[test]
    fn test_map_becomes_entry_pairs() {
        let map = Payload::map([("a", 1), ("b", 2)]);
        let text = serialize_payload(&Payload::object([("m", map)])).unwrap();
        assert_eq!(text, r#"{"m":[["a",1],["b",2]]}"#);
    }

    #[test]
    fn test_symbol_and_pattern_strings() {
        let payload = Payload::Array(vec![
            Payload::from(Symbol::new("marker")),
            Payload::from(PatternMatcher::new("^v[0-9]+$", "i").unwrap()),
        ]);
        let text = serialize_payload(&payload).unwrap();
        assert_eq!(text, r#"["Symbol(marker)","/^v[0-9]+$/i"]"#);
    }

    #[test]
    fn test_iterable_becomes_array() {
        let text = serialize_payload(&Payload::iterable(Countdown(3))).unwrap();
        assert_eq!(text, "[3,2,1]");
    }

    #[test]
    fn test_rules_apply_at_depth() {
        let inner_map = Payload::map([(Payload::from(BigInt::from(7)), Payload::set([Symbol::new("x")]))]);
        let payload = Payload::object([(
            "outer",
            Payload::Array(vec![Payload::object([("deep", inner_map)])]),
        )]);
        let text = serialize_payload(&payload).unwrap();
        assert_eq!(text, r#"{"outer":[{"deep":[["7",["Symbol(x)"]]]}]}"#);
    }

    #[test]
    fn test_bare_serializer_rejects_extended_values() {
        let err = PayloadSerializer::bare()
            .serialize(&Payload::from(BigInt::from(1)))
            .unwrap_err();
        assert!(matches!(err, SerializeError::Unsupported { kind: "bigint" }));
    }

    #[test]
    fn test_deeply_nested_plain_json_matches_serde_json() {
        let mut value = json!(1);
        for _ in 0..200 {
            value = Value::Array(vec![value]);
        }
        let expected = serde_json::to_string(&value).unwrap();
        let actual = serialize_payload(&Payload::from(value)).unwrap();
        assert_eq!(actual.len(), 401);
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_self_referential_iterable_fails() {
        let serializer = PayloadSerializer::new().with_max_iterable_depth(16);
        let err = serializer.serialize(&Payload::iterable(Ouroboros)).unwrap_err();
        assert!(matches!(err, SerializeError::DepthExceeded { max_depth: 16 }));
    }

    #[test]
    fn test_iterable_limit_counts_only_iterables() {
        let mut nested = Payload::iterable(Countdown(1));
        for _ in 0..300 {
            nested = Payload::object([("next", Payload::Array(vec![nested]))]);
        }
        let serializer = PayloadSerializer::new().with_max_iterable_depth(1);
        assert!(serializer.serialize(&nested).is_ok());

        let twice = Payload::Array(vec![Payload::iterable(Countdown(1)), Payload::iterable(Countdown(2))]);
        assert_eq!(serializer.serialize(&twice).unwrap(), "[[1],[2,1]]");

        let serializer = PayloadSerializer::new().with_max_iterable_depth(0);
        let err = serializer.serialize(&nested).unwrap_err();
        assert!(matches!(err, SerializeError::DepthExceeded { max_depth: 0 }));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let serializer = PayloadSerializer::bare()
            .with_rule(UpperCaseStrings)
            .with_rule(SymbolRule);
        let text = serializer
            .serialize(&Payload::from(vec![Payload::from("abc"), Payload::from(Symbol::new("s"))]))
            .unwrap();
        // Replacements are not fed back through the rules, only their children.
        assert_eq!(text, r#"["ABC","Symbol(s)"]"#);
    }

    #[test]
    fn test_from_config_rejects_unknown_rule() {
        let config = SerializerConfig {
            max_iterable_depth: 8,
            rules: vec!["set".to_string(), "tuple".to_string()],
        };
        assert!(PayloadSerializer::from_config(&config).is_err());

        let config = SerializerConfig {
            max_iterable_depth: 8,
            rules: vec!["map".to_string(), "set".to_string()],
        };
        let serializer = PayloadSerializer::from_config(&config).unwrap();
        assert_eq!(serializer.rule_names(), vec!["map", "set"]);
        assert_eq!(serializer.max_iterable_depth(), 8);
    }
}
