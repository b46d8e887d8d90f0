//! Read-only chain queries.
//!
//! Every function takes the caller's [`ChainConnection`] and returns
//! `Err` only when that connection is not live. Any RPC or decoding failure
//! after that point is logged as a [`QueryDegradation`] and replaced with the
//! function's documented default (`0`, empty list or `None`), so display and
//! stats flows never abort on one bad subnet.

pub mod balances;
pub mod chain_info;
pub mod neurons;
pub mod stakes;
pub mod subnets;

pub use balances::*;
pub use chain_info::*;
pub use neurons::*;
pub use stakes::*;
pub use subnets::*;

use crate::chain::Error as ChainError;
use crate::errors::QueryDegradation;
use crate::utils::ss58::parse_account;
use parity_scale_codec::Encode;
use subxt::dynamic::Value;
use tracing::warn;

/// SCALE-encoded account id as a storage key or call argument.
pub(crate) fn account_value(address: &str) -> Result<Value, ChainError> {
    let account = parse_account(address)?;
    Ok(Value::from_bytes(account.encode()))
}

pub(crate) fn netuid_value(netuid: u16) -> Value {
    Value::u128(netuid as u128)
}

/// Record a failed read. The caller returns its default afterwards.
pub(crate) fn degrade(source: &str, context: &str, err: impl std::fmt::Display) {
    let degradation = QueryDegradation::new(source, err);
    warn!(
        source = %degradation.source_name,
        context,
        error = %degradation.message,
        "Query failed, using default"
    );
}
