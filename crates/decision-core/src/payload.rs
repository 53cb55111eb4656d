//! Evidence values carried by decisions.
//!
//! A [`Payload`] is a JSON value extended with the kinds a policy may hand
//! back that JSON has no native form for: arbitrary-precision integers,
//! unique symbols, sets, ordered maps, regular expressions and user-defined
//! iterables.

use std::fmt;
use std::sync::Arc;

use bigdecimal::num_bigint::BigInt;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use serde_json::{Number, Value};
use uuid::Uuid;

use crate::error::PatternError;

#[derive(Debug, Clone)]
pub enum Payload {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Payload>),
    /// Members in insertion order.
    Object(Vec<(String, Payload)>),
    BigInt(BigInt),
    Symbol(Symbol),
    Set(PayloadSet),
    Map(PayloadMap),
    Pattern(PatternMatcher),
    Iterable(Arc<dyn PayloadIterable>),
}

/// A value that can only be walked, not indexed.
pub trait PayloadIterable: fmt::Debug + Send + Sync {
    fn iter_values(&self) -> Box<dyn Iterator<Item = Payload> + '_>;
}

/// Unique token. Two symbols are equal only if they come from the same
/// [`Symbol::new`] call, whatever their descriptions.
#[derive(Debug, Clone)]
pub struct Symbol {
    id: Uuid,
    description: Option<String>,
}

/// Unique elements, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadSet {
    items: Vec<Payload>,
}

/// Key/value entries, kept in insertion order. Re-inserting a key replaces
/// its value without moving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadMap {
    entries: Vec<(Payload, Payload)>,
}

#[derive(Debug, Clone)]
pub struct PatternMatcher {
    source: String,
    flags: String,
    regex: Regex,
}

const PATTERN_FLAGS: &str = "imsxU";

impl Payload {
    pub fn object<I, K>(members: I) -> Self
    where
        I: IntoIterator<Item = (K, Payload)>,
        K: Into<String>,
    {
        let mut object: Vec<(String, Payload)> = Vec::new();
        for (key, value) in members {
            let key = key.into();
            match object.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => object.push((key, value)),
            }
        }
        Payload::Object(object)
    }

    pub fn set<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Payload>,
    {
        Payload::Set(items.into_iter().map(Into::<Payload>::into).collect())
    }

    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Payload>,
        V: Into<Payload>,
    {
        Payload::Map(
            entries
                .into_iter()
                .map(|(key, value)| -> (Payload, Payload) { (key.into(), value.into()) })
                .collect(),
        )
    }

    pub fn iterable(value: impl PayloadIterable + 'static) -> Self {
        Payload::Iterable(Arc::new(value))
    }

    /// Converts any serde value. Map keys must be strings, as with
    /// `serde_json::to_value`.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Payload::from)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Null => "null",
            Payload::Bool(_) => "bool",
            Payload::Number(_) => "number",
            Payload::String(_) => "string",
            Payload::Array(_) => "array",
            Payload::Object(_) => "object",
            Payload::BigInt(_) => "bigint",
            Payload::Symbol(_) => "symbol",
            Payload::Set(_) => "set",
            Payload::Map(_) => "map",
            Payload::Pattern(_) => "pattern",
            Payload::Iterable(_) => "iterable",
        }
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Payload::Null, Payload::Null) => true,
            (Payload::Bool(a), Payload::Bool(b)) => a == b,
            (Payload::Number(a), Payload::Number(b)) => a == b,
            (Payload::String(a), Payload::String(b)) => a == b,
            (Payload::Array(a), Payload::Array(b)) => a == b,
            (Payload::Object(a), Payload::Object(b)) => a == b,
            (Payload::BigInt(a), Payload::BigInt(b)) => a == b,
            (Payload::Symbol(a), Payload::Symbol(b)) => a == b,
            (Payload::Set(a), Payload::Set(b)) => a == b,
            (Payload::Map(a), Payload::Map(b)) => a == b,
            (Payload::Pattern(a), Payload::Pattern(b)) => a == b,
            (Payload::Iterable(a), Payload::Iterable(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Null
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Payload::Null,
            Value::Bool(flag) => Payload::Bool(flag),
            Value::Number(number) => Payload::Number(number),
            Value::String(text) => Payload::String(text),
            Value::Array(items) => Payload::Array(items.into_iter().map(Payload::from).collect()),
            Value::Object(members) => Payload::Object(
                members
                    .into_iter()
                    .map(|(key, value)| (key, Payload::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Payload {
    fn from(value: bool) -> Self {
        Payload::Bool(value)
    }
}

impl From<i32> for Payload {
    fn from(value: i32) -> Self {
        Payload::Number(value.into())
    }
}

impl From<i64> for Payload {
    fn from(value: i64) -> Self {
        Payload::Number(value.into())
    }
}

impl From<u64> for Payload {
    fn from(value: u64) -> Self {
        Payload::Number(value.into())
    }
}

/// Non-finite floats become `Null`, matching what a JSON encoder emits.
impl From<f64> for Payload {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Payload::Null, Payload::Number)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::String(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::String(value)
    }
}

impl From<Vec<Payload>> for Payload {
    fn from(items: Vec<Payload>) -> Self {
        Payload::Array(items)
    }
}

impl From<BigInt> for Payload {
    fn from(value: BigInt) -> Self {
        Payload::BigInt(value)
    }
}

impl From<Symbol> for Payload {
    fn from(value: Symbol) -> Self {
        Payload::Symbol(value)
    }
}

impl From<PayloadSet> for Payload {
    fn from(value: PayloadSet) -> Self {
        Payload::Set(value)
    }
}

impl From<PayloadMap> for Payload {
    fn from(value: PayloadMap) -> Self {
        Payload::Map(value)
    }
}

impl From<PatternMatcher> for Payload {
    fn from(value: PatternMatcher) -> Self {
        Payload::Pattern(value)
    }
}

impl Symbol {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: Some(description.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            id: Uuid::new_v4(),
            description: None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description.as_deref().unwrap_or(""))
    }
}

impl PayloadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if an equal element was already present.
    pub fn insert(&mut self, value: impl Into<Payload>) -> bool {
        let value = value.into();
        if self.items.contains(&value) {
            return false;
        }
        self.items.push(value);
        true
    }

    pub fn contains(&self, value: &Payload) -> bool {
        self.items.contains(value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Payload> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Payload> for PayloadSet {
    fn from_iter<I: IntoIterator<Item = Payload>>(iter: I) -> Self {
        let mut set = PayloadSet::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

impl PayloadMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<Payload>, value: impl Into<Payload>) -> Option<Payload> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => Some(std::mem::replace(&mut slot.1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &Payload) -> Option<&Payload> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (Payload, Payload)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Payload, Payload)> for PayloadMap {
    fn from_iter<I: IntoIterator<Item = (Payload, Payload)>>(iter: I) -> Self {
        let mut map = PayloadMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl PatternMatcher {
    /// Compiles `source` with the given flags, any of `i`, `m`, `s`, `x`
    /// and `U`. Flags are stored deduplicated in that order.
    pub fn new(source: &str, flags: &str) -> Result<Self, PatternError> {
        let mut builder = RegexBuilder::new(source);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                'U' => builder.swap_greed(true),
                other => return Err(PatternError::UnsupportedFlag(other)),
            };
        }
        let regex = builder.build()?;
        let flags = PATTERN_FLAGS
            .chars()
            .filter(|flag| flags.contains(*flag))
            .collect();
        Ok(Self {
            source: source.to_string(),
            flags,
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl PartialEq for PatternMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl fmt::Display for PatternMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_keeps_first_occurrence() {
        let set: PayloadSet = vec![Payload::from(1), Payload::from(2), Payload::from(1)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        let items: Vec<&Payload> = set.iter().collect();
        assert_eq!(items, vec![&Payload::from(1), &Payload::from(2)]);
    }

    #[test]
    fn test_map_overwrites_in_place() {
        let mut map = PayloadMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        let previous = map.insert("a", 3);
        assert_eq!(previous, Some(Payload::from(1)));
        let keys: Vec<&Payload> = map.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![&Payload::from("a"), &Payload::from("b")]);
        assert_eq!(map.get(&Payload::from("a")), Some(&Payload::from(3)));
    }

    #[test]
    fn test_object_overwrites_duplicate_keys() {
        let object = Payload::object([("x", Payload::from(1)), ("y", Payload::from(2)), ("x", Payload::from(9))]);
        assert_eq!(
            object,
            Payload::Object(vec![
                ("x".to_string(), Payload::from(9)),
                ("y".to_string(), Payload::from(2)),
            ])
        );
    }

    #[test]
    fn test_symbols_are_unique() {
        let first = Symbol::new("token");
        let second = Symbol::new("token");
        assert_ne!(first, second);
        assert_eq!(first, first.clone());
        assert_eq!(first.to_string(), "Symbol(token)");
        assert_eq!(Symbol::anonymous().to_string(), "Symbol()");
    }

    #[test]
    fn test_pattern_flags() {
        let pattern = PatternMatcher::new("^ab+c$", "mii").unwrap();
        assert_eq!(pattern.to_string(), "/^ab+c$/im");
        assert!(pattern.is_match("ABBC"));
        assert!(matches!(
            PatternMatcher::new("abc", "g"),
            Err(PatternError::UnsupportedFlag('g'))
        ));
        assert!(matches!(
            PatternMatcher::new("(", ""),
            Err(PatternError::Syntax(_))
        ));
    }

    #[test]
    fn test_from_value_preserves_member_order() {
        let payload = Payload::from(json!({"z": 1, "a": [true, null]}));
        let Payload::Object(members) = payload else {
            panic!("expected object");
        };
        assert_eq!(members[0].0, "z");
        assert_eq!(members[1].1, Payload::Array(vec![Payload::Bool(true), Payload::Null]));
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert_eq!(Payload::from(f64::NAN), Payload::Null);
        assert_eq!(Payload::from(f64::INFINITY), Payload::Null);
        assert!(matches!(Payload::from(1.5), Payload::Number(_)));
    }

    #[test]
    fn test_from_serialize() {
        #[derive(Serialize)]
        struct Evidence {
            count: u32,
        }
        let payload = Payload::from_serialize(&Evidence { count: 5 }).unwrap();
        assert_eq!(payload, Payload::object([("count", Payload::from(5))]));
    }
}
