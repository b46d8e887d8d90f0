pub mod dynamic_info;
pub mod neuron_lite;
pub mod stake;
pub mod subnet;

pub use dynamic_info::SubnetDynamicInfo;
pub use neuron_lite::NeuronRecord;
pub use stake::StakeEntry;
pub use subnet::{SubnetHyperparams, SubnetInfoSummary};
