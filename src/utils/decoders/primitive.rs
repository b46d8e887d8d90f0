use crate::utils::ss58::ss58_encode;
use subxt::dynamic::Value;
use subxt::ext::scale_value::{Composite, Primitive, ValueDef};

/// Peel single-field newtype wrappers (`NetUid(u16)`, `Compact<T>`,
/// `Some(x)`) down to the inner value.
fn peel(value: &Value) -> &Value {
    let mut current = value;
    loop {
        let next = match &current.value {
            ValueDef::Composite(Composite::Unnamed(vals)) if vals.len() == 1 => &vals[0],
            ValueDef::Composite(Composite::Named(fields)) if fields.len() == 1 => &fields[0].1,
            ValueDef::Variant(v) if v.name == "Some" && v.values.len() == 1 => {
                match v.values.values().next() {
                    Some(inner) => inner,
                    None => return current,
                }
            }
            _ => return current,
        };
        current = next;
    }
}

/// Unsigned integer from a primitive or a newtype around one.
pub fn decode_u128(value: &Value) -> Option<u128> {
    match &peel(value).value {
        ValueDef::Primitive(Primitive::U128(n)) => Some(*n),
        ValueDef::Primitive(Primitive::I128(n)) if *n >= 0 => Some(*n as u128),
        ValueDef::Primitive(Primitive::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn decode_u64(value: &Value) -> Option<u64> {
    decode_u128(value).and_then(|n| u64::try_from(n).ok())
}

pub fn decode_u16(value: &Value) -> Option<u16> {
    decode_u128(value).and_then(|n| u16::try_from(n).ok())
}

pub fn decode_bool(value: &Value) -> Option<bool> {
    match &peel(value).value {
        ValueDef::Primitive(Primitive::Bool(b)) => Some(*b),
        _ => None,
    }
}

/// Byte sequence from a composite of `u8` primitives.
///
/// Accepts the sequence itself or the same sequence wrapped in one or more
/// single-element containers.
pub fn decode_byte_vec(value: &Value) -> Option<Vec<u8>> {
    let mut current = value;
    loop {
        let ValueDef::Composite(Composite::Unnamed(vals)) = &current.value else {
            return None;
        };
        if vals.len() == 1 && matches!(vals[0].value, ValueDef::Composite(_)) {
            current = &vals[0];
            continue;
        }
        return vals
            .iter()
            .map(|v| match v.value {
                ValueDef::Primitive(Primitive::U128(b)) => u8::try_from(b).ok(),
                _ => None,
            })
            .collect();
    }
}

/// Text from a byte sequence or string; invalid UTF-8 is replaced, never fails.
pub fn decode_text(value: &Value) -> String {
    if let ValueDef::Primitive(Primitive::String(s)) = &value.value {
        return s.clone();
    }
    match decode_byte_vec(value) {
        Some(bytes) => text_from_bytes(&bytes),
        None => value.to_string(),
    }
}

fn text_from_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Canonical SS58 string for an account field.
///
/// Strings pass through. A 32-byte sequence, bare or wrapped in single-element
/// containers, is SS58 encoded. Other byte sequences become `0x` hex and
/// anything else falls back to its string form.
pub fn decode_address(value: &Value) -> String {
    if let ValueDef::Primitive(Primitive::String(s)) = &value.value {
        return s.clone();
    }
    match decode_byte_vec(value) {
        Some(bytes) => match <[u8; 32]>::try_from(bytes.as_slice()) {
            Ok(key) => ss58_encode(&key),
            Err(_) => bytes_to_hex(&bytes),
        },
        None => value.to_string(),
    }
}

/// `0x`-prefixed hex for a byte sequence.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
