//! Normalization of dynamically decoded chain responses.
//!
//! Runtime API results and storage values arrive as untyped
//! [`scale_value`](subxt::ext::scale_value) trees. The node may wrap a record
//! in `Option`, in a `{ value }` envelope, or in a one-element tuple. Everything
//! here reduces those shapes to either a [`Record`] of named fields or a list,
//! so callers never unwrap envelopes themselves.

use super::fixed::decode_price;
use super::primitive::{decode_address, decode_bool, decode_text, decode_u128};
use std::collections::BTreeMap;
use subxt::dynamic::Value;
use subxt::ext::scale_value::{Composite, ValueDef};

/// Strip `Option` and `{ value }` envelopes.
///
/// Returns `None` for an explicit `None` variant.
pub fn unwrap_envelope(value: Value) -> Option<Value> {
    let mut current = value;
    loop {
        current = match current.value {
            ValueDef::Variant(v) if v.name == "None" && v.values.is_empty() => return None,
            ValueDef::Variant(v) if v.name == "Some" && v.values.len() == 1 => {
                v.values.into_values().next()?
            }
            ValueDef::Composite(Composite::Named(mut fields))
                if fields.len() == 1 && fields[0].0 == "value" =>
            {
                fields.pop()?.1
            }
            other => {
                return Some(Value {
                    value: other,
                    context: current.context,
                })
            }
        };
    }
}

fn is_record(value: &Value) -> bool {
    matches!(value.value, ValueDef::Composite(Composite::Named(_)))
}

/// Elements of a sequence response, after envelope removal.
///
/// A non-sequence yields an empty list.
pub fn into_list(value: Value) -> Vec<Value> {
    match unwrap_envelope(value) {
        Some(Value {
            value: ValueDef::Composite(Composite::Unnamed(vals)),
            ..
        }) => vals,
        _ => Vec::new(),
    }
}

/// Named fields of a decoded struct.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Normalize a response into a record, or `None` if it is absent or not
    /// struct-shaped.
    pub fn from_value(value: Value) -> Option<Self> {
        match unwrap_envelope(value)?.value {
            ValueDef::Composite(Composite::Named(fields)) => Some(Self {
                fields: fields.into_iter().collect(),
            }),
            ValueDef::Composite(Composite::Unnamed(mut vals))
                if vals.len() == 1 && is_record(&vals[0]) =>
            {
                vals.pop().and_then(Self::from_value)
            }
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Integer field, 0 when missing or not numeric.
    pub fn u128(&self, name: &str) -> u128 {
        self.get(name).and_then(decode_u128).unwrap_or(0)
    }

    pub fn u64(&self, name: &str) -> u64 {
        u64::try_from(self.u128(name)).unwrap_or(u64::MAX)
    }

    pub fn u16(&self, name: &str) -> u16 {
        u16::try_from(self.u128(name)).unwrap_or(u16::MAX)
    }

    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.get(name).and_then(decode_bool).unwrap_or(default)
    }

    /// Text field, empty when missing.
    pub fn text(&self, name: &str) -> String {
        self.get(name).map(decode_text).unwrap_or_default()
    }

    pub fn address(&self, name: &str) -> String {
        self.get(name).map(decode_address).unwrap_or_default()
    }

    pub fn price(&self, name: &str) -> f64 {
        self.get(name).map(decode_price).unwrap_or(0.0)
    }

    /// Nested record field.
    pub fn record(&self, name: &str) -> Option<Record> {
        self.get(name).cloned().and_then(Record::from_value)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        Value::named_composite([
            ("netuid", Value::u128(3)),
            ("tempo", Value::u128(360)),
            ("name", Value::from_bytes(b"apex")),
            ("moving_price", Value::named_composite([("bits", Value::i128(1 << 31))])),
            ("registration_allowed", Value::bool(false)),
        ])
    }

    #[test]
    fn test_record_accessors() {
        let record = Record::from_value(sample()).unwrap();
        assert_eq!(record.u16("netuid"), 3);
        assert_eq!(record.u64("tempo"), 360);
        assert_eq!(record.text("name"), "apex");
        assert_eq!(record.price("moving_price"), 0.5);
        assert!(!record.bool_or("registration_allowed", true));
        assert!(record.bool_or("missing", true));
        assert_eq!(record.u128("missing"), 0);
    }

    #[test]
    fn test_envelopes_are_removed() {
        let some = Value::unnamed_variant("Some", [sample()]);
        let enveloped = Value::named_composite([("value", sample())]);
        let tupled = Value::unnamed_composite([sample()]);
        for wrapped in [some, enveloped, tupled] {
            let record = Record::from_value(wrapped).unwrap();
            assert_eq!(record.u16("netuid"), 3);
        }
    }

    #[test]
    fn test_none_is_absent() {
        let none = Value::unnamed_variant("None", Vec::<Value>::new());
        assert!(unwrap_envelope(none.clone()).is_none());
        assert!(Record::from_value(none).is_none());
        assert!(Record::from_value(Value::u128(1)).is_none());
    }

    #[test]
    fn test_into_list() {
        let list = Value::unnamed_composite([sample(), sample()]);
        assert_eq!(into_list(list).len(), 2);
        let wrapped = Value::unnamed_variant("Some", [Value::unnamed_composite([sample()])]);
        assert_eq!(into_list(wrapped).len(), 1);
        assert!(into_list(Value::bool(true)).is_empty());
    }
}
