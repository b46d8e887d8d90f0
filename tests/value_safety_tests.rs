//! Unit and decoding invariants.
//!
//! # Property-Based Testing
//! Uses proptest to check conversions and decoders across wide input ranges.

use btmanager::core::constants::{RAOPERTAO, ROOT_NETUID};
use btmanager::utils::balance_newtypes::{rao_to_tao, tao_to_rao, Alpha, Rao, Tao};
use btmanager::utils::decoders::{decode_address, decode_price, Record};
use btmanager::{ss58_decode, ss58_encode};
use proptest::prelude::*;
use subxt::dynamic::Value;

const _: () = assert!(RAOPERTAO == 1_000_000_000, "RAOPERTAO must be 1e9");

#[test]
fn test_display_units() {
    assert_eq!(rao_to_tao(1_000_000_000), 1.0);
    assert_eq!(Rao(5_000_000_000).as_tao(), 5.0);
    assert_eq!(Tao(1.5).as_rao(), Rao(1_500_000_000));
}

#[test]
fn test_decode_price_shapes() {
    let bits = |n: u128| Value::named_composite([("bits", Value::u128(n))]);
    assert_eq!(decode_price(&bits(1 << 32)), 1.0);
    assert_eq!(decode_price(&bits(0)), 0.0);
    assert_eq!(
        decode_price(&Value::unnamed_variant("None", Vec::<Value>::new())),
        0.0
    );
}

#[test]
fn test_record_strips_value_envelope() {
    let wrapped = Value::unnamed_variant(
        "Some",
        [Value::named_composite([(
            "value",
            Value::named_composite([("netuid", Value::u128(4))]),
        )])],
    );
    let record = Record::from_value(wrapped).unwrap();
    assert_eq!(record.u16("netuid"), 4);
    assert!(Record::from_value(Value::unnamed_variant("None", Vec::<Value>::new())).is_none());
}

proptest! {
    #[test]
    fn prop_rao_roundtrip_is_exact(rao in 0u128..(1u128 << 52)) {
        prop_assert_eq!(tao_to_rao(rao_to_tao(rao)), rao);
    }

    #[test]
    fn prop_tao_to_rao_never_panics(tao in proptest::num::f64::ANY) {
        let _ = tao_to_rao(tao);
    }

    #[test]
    fn prop_decode_address_ignores_single_wrappers(bytes in proptest::array::uniform32(any::<u8>())) {
        let bare = Value::from_bytes(bytes);
        let once = Value::unnamed_composite([Value::from_bytes(bytes)]);
        let twice = Value::unnamed_composite([Value::unnamed_composite([Value::from_bytes(bytes)])]);
        let expected = ss58_encode(&bytes);
        prop_assert_eq!(decode_address(&bare), expected.clone());
        prop_assert_eq!(decode_address(&once), expected.clone());
        prop_assert_eq!(decode_address(&twice), expected.clone());
        prop_assert_eq!(ss58_decode(&expected).unwrap(), bytes);
    }

    #[test]
    fn prop_root_stake_ignores_price(stake in 0u128..(1u128 << 53), price in proptest::num::f64::ANY) {
        prop_assert_eq!(
            Alpha(stake).value_in_tao(ROOT_NETUID, price),
            rao_to_tao(stake)
        );
    }

    #[test]
    fn prop_unknown_price_values_to_zero(stake in 0u128..(1u128 << 60), netuid in 1u16..1024) {
        prop_assert_eq!(Alpha(stake).value_in_tao(netuid, 0.0), 0.0);
    }
}
