// Polymorphic wire fields
//
// The vendor API changes field types between versions: identifiers are
// numbers in one generation and strings in another, `active` is a bool or a
// status word, and visit countries/IPs are a scalar or an array. Each shape
// is an untagged enum whose variant order is the decode priority, so the
// accepted input set is exactly the listed shapes -- no numeric/string
// coercion happens.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// ── FlexId ───────────────────────────────────────────────────────────

/// Identifier that is an integer in some API generations and a string in others.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlexId {
    Int(i64),
    Str(String),
}

impl FlexId {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Int(_) => None,
        }
    }
}

impl fmt::Display for FlexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FlexId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<String> for FlexId {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for FlexId {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

// ── ActiveFlag ───────────────────────────────────────────────────────

/// Site `active` field: `true`/`false` or a status word such as `"active"`.
///
/// Anything else (numbers, objects) lands in `Other` instead of failing the
/// whole site record, and counts as not active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActiveFlag {
    Bool(bool),
    Text(String),
    Other(serde_json::Value),
}

impl ActiveFlag {
    pub fn is_active(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => s == "active" || s == "true",
            Self::Other(_) => false,
        }
    }
}

// ── OneOrMany ────────────────────────────────────────────────────────

/// A field the API has emitted both as a single value and as an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }

    pub fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

// ── Null handling ────────────────────────────────────────────────────

/// Decode an explicit JSON `null` as the type's default.
///
/// Pair with `#[serde(default)]` so an absent field and a `null` field
/// land in the same place.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flex_id_keeps_wire_type() {
        let n: FlexId = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(n, FlexId::Int(42));
        let s: FlexId = serde_json::from_value(json!("42")).unwrap();
        assert_eq!(s, FlexId::Str("42".into()));
        assert_eq!(n.to_string(), s.to_string());
    }

    #[test]
    fn flex_id_rejects_other_shapes() {
        assert!(serde_json::from_value::<FlexId>(json!(true)).is_err());
        assert!(serde_json::from_value::<FlexId>(json!(1.5)).is_err());
        assert!(serde_json::from_value::<FlexId>(json!({"id": 1})).is_err());
    }

    #[test]
    fn active_flag_truthy_shapes() {
        for value in [json!(true), json!("active"), json!("true")] {
            let flag: ActiveFlag = serde_json::from_value(value.clone()).unwrap();
            assert!(flag.is_active(), "{value} should be active");
        }
    }

    #[test]
    fn active_flag_falsy_shapes() {
        for value in [json!(false), json!("inactive"), json!("pending"), json!(1)] {
            let flag: ActiveFlag = serde_json::from_value(value.clone()).unwrap();
            assert!(!flag.is_active(), "{value} should not be active");
        }
    }

    #[test]
    fn one_or_many_accepts_scalar_and_array() {
        let one: OneOrMany<String> = serde_json::from_value(json!("US")).unwrap();
        assert_eq!(one.as_slice(), ["US".to_owned()]);

        let many: OneOrMany<String> = serde_json::from_value(json!(["US", "FR"])).unwrap();
        assert_eq!(many.first().map(String::as_str), Some("US"));
        assert_eq!(many.into_vec().len(), 2);

        assert!(OneOrMany::<String>::default().is_empty());
    }

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "null_as_default")]
        names: Vec<String>,
        #[serde(default, deserialize_with = "null_as_default")]
        countries: OneOrMany<String>,
    }

    #[test]
    fn null_decodes_as_default() {
        let held: Holder =
            serde_json::from_value(json!({"names": null, "countries": null})).unwrap();
        assert!(held.names.is_empty());
        assert!(held.countries.is_empty());

        let held: Holder = serde_json::from_value(json!({"countries": "US"})).unwrap();
        assert!(held.names.is_empty());
        assert_eq!(held.countries.as_slice(), ["US".to_owned()]);
    }
}
