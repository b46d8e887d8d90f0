//! Per-subnet pool state from `SubnetInfoRuntimeApi.get_dynamic_info`.

use crate::utils::balance_newtypes::{Alpha, Rao};
use crate::utils::decoders::Record;
use serde::{Deserialize, Serialize};

/// Dynamic information about a subnet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SubnetDynamicInfo {
    pub netuid: u16,
    /// Blocks per epoch
    pub tempo: u64,
    /// TAO held by the pool
    pub tao_in: Rao,
    /// Alpha held by the pool
    pub alpha_in: Alpha,
    /// Alpha outstanding
    pub alpha_out: Alpha,
    /// Smoothed TAO per alpha, already decoded from fixed point
    pub moving_price: f64,
    pub token_symbol: String,
    /// Identity name when set, otherwise the legacy `subnet_name`.
    /// Empty if neither is present.
    pub subnet_name: String,
    pub owner_coldkey: String,
    pub owner_hotkey: String,
}

impl SubnetDynamicInfo {
    pub fn from_record(record: &Record) -> Self {
        Self {
            netuid: record.u16("netuid"),
            tempo: record.u64("tempo"),
            tao_in: Rao(record.u128("tao_in")),
            alpha_in: Alpha(record.u128("alpha_in")),
            alpha_out: Alpha(record.u128("alpha_out")),
            moving_price: record.price("moving_price"),
            token_symbol: record.text("token_symbol"),
            subnet_name: resolve_subnet_name(record),
            owner_coldkey: record.address("owner_coldkey"),
            owner_hotkey: record.address("owner_hotkey"),
        }
    }

    /// Name for display: `SN{netuid}` when the chain has none.
    pub fn display_name(&self) -> String {
        if self.subnet_name.is_empty() {
            format!("SN{}", self.netuid)
        } else {
            self.subnet_name.clone()
        }
    }

    pub fn display_symbol(&self) -> &str {
        if self.token_symbol.is_empty() {
            "?"
        } else {
            &self.token_symbol
        }
    }
}

/// The identity's `subnet_name` wins over the top-level one when non-empty.
fn resolve_subnet_name(record: &Record) -> String {
    let identity_name = record
        .record("subnet_identity")
        .map(|identity| identity.text("subnet_name"))
        .unwrap_or_default();
    if identity_name.is_empty() {
        record.text("subnet_name")
    } else {
        identity_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subxt::dynamic::Value;

    fn info(identity: Value) -> Record {
        Record::from_value(Value::named_composite([
            ("netuid", Value::u128(3)),
            ("tempo", Value::u128(360)),
            ("tao_in", Value::u128(1_000)),
            ("subnet_name", Value::from_bytes(b"legacy")),
            ("token_symbol", Value::from_bytes("γ".as_bytes())),
            (
                "moving_price",
                Value::named_composite([("bits", Value::i128(1 << 31))]),
            ),
            ("subnet_identity", identity),
        ]))
        .unwrap()
    }

    #[test]
    fn test_identity_name_preferred() {
        let identity = Value::variant(
            "Some",
            subxt::ext::scale_value::Composite::unnamed([Value::named_composite([(
                "subnet_name",
                Value::from_bytes(b"Apex"),
            )])]),
        );
        let parsed = SubnetDynamicInfo::from_record(&info(identity));
        assert_eq!(parsed.subnet_name, "Apex");
        assert_eq!(parsed.token_symbol, "γ");
        assert_eq!(parsed.moving_price, 0.5);
        assert_eq!(parsed.tempo, 360);
    }

    #[test]
    fn test_legacy_name_when_identity_missing_or_blank() {
        let none = Value::variant("None", subxt::ext::scale_value::Composite::unnamed(Vec::<Value>::new()));
        assert_eq!(SubnetDynamicInfo::from_record(&info(none)).subnet_name, "legacy");

        let blank = Value::named_composite([("subnet_name", Value::from_bytes(b""))]);
        assert_eq!(SubnetDynamicInfo::from_record(&info(blank)).subnet_name, "legacy");
    }

    #[test]
    fn test_display_fallbacks() {
        let info = SubnetDynamicInfo {
            netuid: 12,
            ..Default::default()
        };
        assert_eq!(info.display_name(), "SN12");
        assert_eq!(info.display_symbol(), "?");
    }
}
