use crate::utils::balance_newtypes::{Alpha, Rao};
use crate::utils::decoders::Record;
use serde::{Deserialize, Serialize};

/// One staked position of a coldkey, as reported by `StakeInfoRuntimeApi`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeEntry {
    /// Hotkey (SS58 address)
    pub hotkey: String,
    /// Coldkey (SS58 address)
    pub coldkey: String,
    pub netuid: u16,
    /// Stake in the subnet's alpha
    pub stake: Alpha,
    /// Alpha emission per tempo
    pub emission: Alpha,
    /// TAO emission per tempo
    pub tao_emission: Rao,
    pub is_registered: bool,
}

impl StakeEntry {
    pub fn from_record(record: &Record) -> Self {
        Self {
            hotkey: record.address("hotkey"),
            coldkey: record.address("coldkey"),
            netuid: record.u16("netuid"),
            stake: Alpha(record.u128("stake")),
            emission: Alpha(record.u128("emission")),
            tao_emission: Rao(record.u128("tao_emission")),
            is_registered: record.bool_or("is_registered", false),
        }
    }
}
