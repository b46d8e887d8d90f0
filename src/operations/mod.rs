//! Mutating operations and balance checks built on the query layer and the
//! submission protocol.
//!
//! Every operation signs with the caller's coldkey. An operation returns
//! `Err` only when the connection is not live; everything else, including
//! local precondition failures, comes back as an [`ExtrinsicOutcome`].

pub mod balance;
pub mod registration;
pub mod staking;
pub mod transfer;

pub use balance::{check_all_balances, check_balance, BalanceReport};
pub use registration::{
    burn_register, check_registration_status, get_registration_info, RegistrationInfo,
    RegistrationOutcome,
};
pub use staking::{
    add_stake, add_stake_limit, remove_stake, remove_stake_full_limit, remove_stake_limit,
    unstake_all, PriceLimit,
};
pub use transfer::{transfer, TransferOptions};

use crate::chain::ExtrinsicOutcome;
use crate::queries::account_value;
use subxt::dynamic::Value;
use tracing::warn;

/// Account argument for a call, or a precondition failure naming the field.
pub(crate) fn account_arg(field: &str, address: &str) -> Result<Value, ExtrinsicOutcome> {
    account_value(address).map_err(|e| {
        warn!(field, address, error = %e, "Rejected invalid address");
        ExtrinsicOutcome::precondition_failed(format!("Invalid {field} address {address}: {e}"))
    })
}
