use crate::utils::balance_newtypes::{u16_normalized_float, Alpha};
use crate::utils::decoders::Record;
use serde::{Deserialize, Serialize};

/// Lightweight neuron information from `NeuronInfoRuntimeApi`
///
/// Score fields keep the chain's raw u16 scale (0..=65535).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NeuronRecord {
    /// Hotkey (SS58 address)
    pub hotkey: String,
    /// Coldkey (SS58 address)
    pub coldkey: String,
    pub netuid: u16,
    pub uid: u16,
    /// Emission per tempo, in alpha base units
    pub emission: Alpha,
    pub incentive: u16,
    pub trust: u16,
    pub dividends: u16,
    pub rank: u16,
    pub consensus: u16,
    pub validator_trust: u16,
    pub active: bool,
    pub validator_permit: bool,
}

impl NeuronRecord {
    pub fn from_record(record: &Record) -> Self {
        Self {
            hotkey: record.address("hotkey"),
            coldkey: record.address("coldkey"),
            netuid: record.u16("netuid"),
            uid: record.u16("uid"),
            emission: Alpha(record.u128("emission")),
            incentive: record.u16("incentive"),
            trust: record.u16("trust"),
            dividends: record.u16("dividends"),
            rank: record.u16("rank"),
            consensus: record.u16("consensus"),
            validator_trust: record.u16("validator_trust"),
            active: record.bool_or("active", false),
            validator_permit: record.bool_or("validator_permit", false),
        }
    }

    /// Incentive as a fraction of the u16 range.
    pub fn incentive_fraction(&self) -> f64 {
        u16_normalized_float(self.incentive as u128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subxt::dynamic::Value;

    #[test]
    fn test_neuron_from_record() {
        let record = Record::from_value(Value::named_composite([
            ("hotkey", Value::from_bytes([1u8; 32])),
            ("netuid", Value::u128(5)),
            ("uid", Value::u128(17)),
            ("emission", Value::u128(72_000_000_000)),
            ("incentive", Value::u128(65535)),
            ("active", Value::bool(true)),
        ]))
        .unwrap();
        let neuron = NeuronRecord::from_record(&record);
        assert_eq!(neuron.uid, 17);
        assert_eq!(neuron.netuid, 5);
        assert_eq!(neuron.emission, Alpha(72_000_000_000));
        assert_eq!(neuron.incentive_fraction(), 1.0);
        assert!(neuron.active);
        assert!(!neuron.validator_permit);
    }
}
