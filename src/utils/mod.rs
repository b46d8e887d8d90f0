pub mod balance_newtypes;
pub mod decoders;
pub mod ss58;

pub use balance_newtypes::{rao_to_tao, tao_to_rao, u16_normalized_float, Alpha, Rao, Tao};
pub use ss58::*;
