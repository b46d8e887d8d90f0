use super::{account_value, degrade};
use crate::chain::ChainConnection;
use crate::core::constants::{BALANCES_MODULE, DEFAULT_EXISTENTIAL_DEPOSIT, SYSTEM_MODULE};
use crate::errors::ChainConnectionError;
use crate::utils::balance_newtypes::Rao;
use crate::utils::decoders::{decode_u128, Record};
use subxt::dynamic::Value;

/// Free balance of an account.
///
/// An account that never existed on chain has no `System.Account` entry and
/// reports zero.
pub async fn get_balance(
    conn: &ChainConnection,
    address: &str,
) -> Result<Rao, ChainConnectionError> {
    let rpc = conn.rpc()?;
    let key = match account_value(address) {
        Ok(key) => key,
        Err(e) => {
            degrade("System.Account", address, e);
            return Ok(Rao::ZERO);
        }
    };
    match rpc.storage(SYSTEM_MODULE, "Account", vec![key]).await {
        Ok(Some(value)) => Ok(Rao(extract_free_balance(value))),
        Ok(None) => Ok(Rao::ZERO),
        Err(e) => {
            degrade("System.Account", address, e);
            Ok(Rao::ZERO)
        }
    }
}

/// Minimum balance that keeps an account alive.
pub async fn get_existential_deposit(
    conn: &ChainConnection,
) -> Result<Rao, ChainConnectionError> {
    let rpc = conn.rpc()?;
    let fallback = Rao(DEFAULT_EXISTENTIAL_DEPOSIT);
    match rpc.constant(BALANCES_MODULE, "ExistentialDeposit").await {
        Ok(value) => Ok(decode_u128(&value).map(Rao).unwrap_or(fallback)),
        Err(e) => {
            degrade("Balances.ExistentialDeposit", "constant", e);
            Ok(fallback)
        }
    }
}

/// `AccountInfo { nonce, .., data: { free, reserved, .. } }` -> free
fn extract_free_balance(value: Value) -> u128 {
    Record::from_value(value)
        .and_then(|info| info.record("data"))
        .map(|data| data.u128("free"))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_free_balance() {
        let info = Value::named_composite([
            ("nonce", Value::u128(3)),
            (
                "data",
                Value::named_composite([
                    ("free", Value::u128(5_000_000_000)),
                    ("reserved", Value::u128(1)),
                ]),
            ),
        ]);
        assert_eq!(extract_free_balance(info), 5_000_000_000);
        assert_eq!(extract_free_balance(Value::u128(1)), 0);
    }
}
