//! Stake management. Stake is added in TAO and removed in the subnet's
//! alpha; the two amount types are kept apart in the signatures.

use super::account_arg;
use crate::chain::{
    compose_and_submit_checked, CallDescriptor, ChainConnection, ExtrinsicOutcome, KeySigner,
    SubmitOptions,
};
use crate::core::constants::SUBTENSOR_MODULE;
use crate::errors::ChainConnectionError;
use crate::utils::balance_newtypes::{tao_to_rao, Alpha, Tao};
use crate::utils::ss58::short_address;
use subxt::dynamic::Value;
use tracing::info;

/// Price protection for a stake movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceLimit {
    /// Limit in TAO per alpha; rescaled to base units on the wire.
    pub price: f64,
    /// Fill what the limit allows instead of failing outright.
    pub allow_partial: bool,
}

impl PriceLimit {
    pub fn new(price: f64) -> Self {
        Self {
            price,
            allow_partial: true,
        }
    }

    pub fn all_or_nothing(mut self) -> Self {
        self.allow_partial = false;
        self
    }

    fn wire_price(&self) -> Value {
        Value::u128(tao_to_rao(self.price))
    }
}

/// Stake `amount` TAO on `hotkey` in a subnet. With a limit this submits
/// `add_stake_limit`.
pub async fn add_stake(
    conn: &ChainConnection,
    signer: &dyn KeySigner,
    hotkey: &str,
    netuid: u16,
    amount: Tao,
    limit: Option<PriceLimit>,
    options: &SubmitOptions,
) -> Result<ExtrinsicOutcome, ChainConnectionError> {
    if let Some(limit) = limit {
        return add_stake_limit(conn, signer, hotkey, netuid, amount, limit, options).await;
    }
    conn.rpc()?;
    let hotkey_id = match account_arg("hotkey", hotkey) {
        Ok(v) => v,
        Err(outcome) => return Ok(outcome),
    };
    let amount = amount.as_rao();
    info!(hotkey = %short_address(hotkey), netuid, amount = %amount, "add_stake");
    let call = CallDescriptor::new(SUBTENSOR_MODULE, "add_stake")
        .param("hotkey", hotkey_id)
        .param("netuid", Value::u128(netuid as u128))
        .param("amount_staked", Value::u128(amount.as_u128()));
    Ok(compose_and_submit_checked(conn, &call, signer, options).await)
}

pub async fn add_stake_limit(
    conn: &ChainConnection,
    signer: &dyn KeySigner,
    hotkey: &str,
    netuid: u16,
    amount: Tao,
    limit: PriceLimit,
    options: &SubmitOptions,
) -> Result<ExtrinsicOutcome, ChainConnectionError> {
    conn.rpc()?;
    let hotkey_id = match account_arg("hotkey", hotkey) {
        Ok(v) => v,
        Err(outcome) => return Ok(outcome),
    };
    let amount = amount.as_rao();
    info!(
        hotkey = %short_address(hotkey),
        netuid,
        amount = %amount,
        limit_price = limit.price,
        allow_partial = limit.allow_partial,
        "add_stake_limit"
    );
    let call = CallDescriptor::new(SUBTENSOR_MODULE, "add_stake_limit")
        .param("hotkey", hotkey_id)
        .param("netuid", Value::u128(netuid as u128))
        .param("amount_staked", Value::u128(amount.as_u128()))
        .param("limit_price", limit.wire_price())
        .param("allow_partial", Value::bool(limit.allow_partial));
    Ok(compose_and_submit_checked(conn, &call, signer, options).await)
}

/// Unstake `amount` alpha from `hotkey` in a subnet. With a limit this
/// submits `remove_stake_limit`.
pub async fn remove_stake(
    conn: &ChainConnection,
    signer: &dyn KeySigner,
    hotkey: &str,
    netuid: u16,
    amount: Alpha,
    limit: Option<PriceLimit>,
    options: &SubmitOptions,
) -> Result<ExtrinsicOutcome, ChainConnectionError> {
    if let Some(limit) = limit {
        return remove_stake_limit(conn, signer, hotkey, netuid, amount, limit, options).await;
    }
    conn.rpc()?;
    let hotkey_id = match account_arg("hotkey", hotkey) {
        Ok(v) => v,
        Err(outcome) => return Ok(outcome),
    };
    info!(hotkey = %short_address(hotkey), netuid, amount = %amount, "remove_stake");
    let call = CallDescriptor::new(SUBTENSOR_MODULE, "remove_stake")
        .param("hotkey", hotkey_id)
        .param("netuid", Value::u128(netuid as u128))
        .param("amount_unstaked", Value::u128(amount.as_u128()));
    Ok(compose_and_submit_checked(conn, &call, signer, options).await)
}

pub async fn remove_stake_limit(
    conn: &ChainConnection,
    signer: &dyn KeySigner,
    hotkey: &str,
    netuid: u16,
    amount: Alpha,
    limit: PriceLimit,
    options: &SubmitOptions,
) -> Result<ExtrinsicOutcome, ChainConnectionError> {
    conn.rpc()?;
    let hotkey_id = match account_arg("hotkey", hotkey) {
        Ok(v) => v,
        Err(outcome) => return Ok(outcome),
    };
    info!(
        hotkey = %short_address(hotkey),
        netuid,
        amount = %amount,
        limit_price = limit.price,
        allow_partial = limit.allow_partial,
        "remove_stake_limit"
    );
    let call = CallDescriptor::new(SUBTENSOR_MODULE, "remove_stake_limit")
        .param("hotkey", hotkey_id)
        .param("netuid", Value::u128(netuid as u128))
        .param("amount_unstaked", Value::u128(amount.as_u128()))
        .param("limit_price", limit.wire_price())
        .param("allow_partial", Value::bool(limit.allow_partial));
    Ok(compose_and_submit_checked(conn, &call, signer, options).await)
}

/// Remove all stake of the signer from `hotkey` on every subnet.
///
/// One transaction per hotkey; unstaking a whole coldkey means calling this
/// for each of its hotkeys.
pub async fn unstake_all(
    conn: &ChainConnection,
    signer: &dyn KeySigner,
    hotkey: &str,
    options: &SubmitOptions,
) -> Result<ExtrinsicOutcome, ChainConnectionError> {
    conn.rpc()?;
    let hotkey_id = match account_arg("hotkey", hotkey) {
        Ok(v) => v,
        Err(outcome) => return Ok(outcome),
    };
    info!(hotkey = %short_address(hotkey), "unstake_all");
    let call = CallDescriptor::new(SUBTENSOR_MODULE, "unstake_all").param("hotkey", hotkey_id);
    Ok(compose_and_submit_checked(conn, &call, signer, options).await)
}

/// Remove all of the signer's alpha from `hotkey` in one subnet.
///
/// `min_price` is a floor in TAO per alpha. `None` and `0` both mean no floor.
pub async fn remove_stake_full_limit(
    conn: &ChainConnection,
    signer: &dyn KeySigner,
    hotkey: &str,
    netuid: u16,
    min_price: Option<f64>,
    options: &SubmitOptions,
) -> Result<ExtrinsicOutcome, ChainConnectionError> {
    conn.rpc()?;
    let hotkey_id = match account_arg("hotkey", hotkey) {
        Ok(v) => v,
        Err(outcome) => return Ok(outcome),
    };
    info!(
        hotkey = %short_address(hotkey),
        netuid,
        min_price = ?min_price,
        "remove_stake_full_limit"
    );
    let call = CallDescriptor::new(SUBTENSOR_MODULE, "remove_stake_full_limit")
        .param("hotkey", hotkey_id)
        .param("netuid", Value::u128(netuid as u128))
        .param("limit_price", price_floor(min_price));
    Ok(compose_and_submit_checked(conn, &call, signer, options).await)
}

/// `Option<u64>` limit argument; a zero floor is sent as `None`.
fn price_floor(min_price: Option<f64>) -> Value {
    match min_price.map(tao_to_rao) {
        Some(rao) if rao > 0 => Value::unnamed_variant("Some", [Value::u128(rao)]),
        _ => Value::unnamed_variant("None", Vec::<Value>::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_floor_zero_is_none() {
        let none = Value::unnamed_variant("None", Vec::<Value>::new());
        assert_eq!(price_floor(None), none);
        assert_eq!(price_floor(Some(0.0)), none);
        assert_eq!(
            price_floor(Some(0.25)),
            Value::unnamed_variant("Some", [Value::u128(250_000_000)])
        );
    }

    #[test]
    fn test_price_limit_defaults_to_partial() {
        let limit = PriceLimit::new(1.5);
        assert!(limit.allow_partial);
        assert!(!limit.all_or_nothing().allow_partial);
        assert_eq!(limit.wire_price(), Value::u128(1_500_000_000));
    }
}
