use crate::core::constants::PRICE_FIXED_POINT_DIVISOR;
use subxt::dynamic::Value;
use subxt::ext::scale_value::{Composite, Primitive, ValueDef};

/// Real value of a fixed-point price: `bits / 2^32`.
///
/// Accepts the structured `{ bits }` form or a bare integer, optionally inside
/// single-element wrappers. Any other shape decodes to `0.0`.
pub fn decode_price(value: &Value) -> f64 {
    fixed_bits(value)
        .map(fixed_bits_to_f64)
        .unwrap_or(0.0)
}

fn fixed_bits_to_f64(bits: i128) -> f64 {
    bits as f64 / PRICE_FIXED_POINT_DIVISOR
}

fn fixed_bits(value: &Value) -> Option<i128> {
    match &value.value {
        ValueDef::Primitive(Primitive::I128(n)) => Some(*n),
        ValueDef::Primitive(Primitive::U128(n)) => i128::try_from(*n).ok(),
        ValueDef::Composite(Composite::Named(fields)) => fields
            .iter()
            .find(|(name, _)| name == "bits")
            .and_then(|(_, v)| fixed_bits(v)),
        ValueDef::Composite(Composite::Unnamed(vals)) if vals.len() == 1 => fixed_bits(&vals[0]),
        ValueDef::Variant(v) if v.name == "Some" && v.values.len() == 1 => {
            v.values.values().next().and_then(fixed_bits)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(n: i128) -> Value {
        Value::named_composite([("bits", Value::i128(n))])
    }

    #[test]
    fn test_decode_price_structured() {
        assert_eq!(decode_price(&bits(1 << 32)), 1.0);
        assert_eq!(decode_price(&bits(0)), 0.0);
        assert_eq!(decode_price(&bits(1 << 31)), 0.5);
    }

    #[test]
    fn test_decode_price_bare_integer() {
        assert_eq!(decode_price(&Value::u128(3 << 32)), 3.0);
        assert_eq!(decode_price(&Value::i128(-(1 << 32))), -1.0);
    }

    #[test]
    fn test_decode_price_unrecognized_shape() {
        assert_eq!(decode_price(&Value::unnamed_variant("None", Vec::<Value>::new())), 0.0);
        assert_eq!(decode_price(&Value::string("1.0")), 0.0);
        assert_eq!(decode_price(&Value::named_composite([("other", Value::u128(5))])), 0.0);
    }
}
