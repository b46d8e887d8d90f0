use crate::utils::balance_newtypes::Rao;
use crate::utils::decoders::Record;
use serde::{Deserialize, Serialize};

/// Subnet hyperparameters from `SubnetInfoRuntimeApi.get_subnet_hyperparams`
///
/// The commonly used fields are typed; everything else stays reachable
/// through [`fields`](Self::fields).
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SubnetHyperparams {
    pub registration_allowed: bool,
    pub min_burn: Rao,
    pub max_burn: Rao,
    pub max_regs_per_block: u64,
    pub tempo: u64,
    pub immunity_period: u64,
    pub max_validators: u64,
    pub difficulty: u64,
    #[serde(skip)]
    pub fields: Record,
}

impl SubnetHyperparams {
    pub fn from_record(record: Record) -> Self {
        Self {
            registration_allowed: record.bool_or("registration_allowed", true),
            min_burn: Rao(record.u128("min_burn")),
            max_burn: Rao(record.u128("max_burn")),
            max_regs_per_block: record.u64("max_regs_per_block"),
            tempo: record.u64("tempo"),
            immunity_period: record.u64("immunity_period"),
            max_validators: record.u64("max_validators"),
            difficulty: record.u64("difficulty"),
            fields: record,
        }
    }
}

/// The parts of `get_subnet_info_v2` this manager uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SubnetInfoSummary {
    pub netuid: u16,
    pub burn: Rao,
    /// Registered neurons
    pub subnetwork_n: u16,
    pub max_allowed_uids: u16,
    pub tempo: u64,
}

impl SubnetInfoSummary {
    pub fn from_record(record: &Record) -> Self {
        Self {
            netuid: record.u16("netuid"),
            burn: Rao(record.u128("burn")),
            subnetwork_n: record.u16("subnetwork_n"),
            max_allowed_uids: record.u16("max_allowed_uids"),
            tempo: record.u64("tempo"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subxt::dynamic::Value;

    #[test]
    fn test_hyperparams_registration_defaults_to_allowed() {
        let record = Record::from_value(Value::named_composite([
            ("min_burn", Value::u128(500_000)),
            ("max_regs_per_block", Value::u128(1)),
        ]))
        .unwrap();
        let params = SubnetHyperparams::from_record(record);
        assert!(params.registration_allowed);
        assert_eq!(params.min_burn, Rao(500_000));
        assert_eq!(params.max_regs_per_block, 1);
        assert!(params.fields.contains("min_burn"));
    }

    #[test]
    fn test_subnet_info_summary() {
        let record = Record::from_value(Value::named_composite([
            ("netuid", Value::u128(9)),
            ("burn", Value::u128(1_000_000_000)),
            ("subnetwork_n", Value::u128(250)),
            ("max_allowed_uids", Value::u128(256)),
        ]))
        .unwrap();
        let info = SubnetInfoSummary::from_record(&record);
        assert_eq!(info.burn, Rao(1_000_000_000));
        assert_eq!(info.subnetwork_n, 250);
        assert_eq!(info.max_allowed_uids, 256);
    }
}
