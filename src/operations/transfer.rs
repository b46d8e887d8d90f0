use super::account_arg;
use crate::chain::{
    compose_and_submit_checked, CallDescriptor, ChainConnection, ExtrinsicOutcome, KeySigner,
    SubmitOptions,
};
use crate::core::constants::BALANCES_MODULE;
use crate::errors::{ChainConnectionError, PreconditionFailure};
use crate::queries::get_balance;
use crate::utils::balance_newtypes::Tao;
use crate::utils::ss58::short_address;
use subxt::dynamic::Value;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    /// Use `transfer_keep_alive`, which refuses to reap the sender.
    pub keep_alive: bool,
    /// Compare the sender's free balance with the amount before submitting.
    pub check_balance: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            keep_alive: true,
            check_balance: false,
        }
    }
}

/// Send `amount` TAO from the signer's coldkey to `dest`.
pub async fn transfer(
    conn: &ChainConnection,
    signer: &dyn KeySigner,
    dest: &str,
    amount: Tao,
    options: TransferOptions,
    submit: &SubmitOptions,
) -> Result<ExtrinsicOutcome, ChainConnectionError> {
    conn.rpc()?;
    let dest_id = match account_arg("destination", dest) {
        Ok(v) => v,
        Err(outcome) => return Ok(outcome),
    };
    let value = amount.as_rao();

    if options.check_balance {
        let balance = get_balance(conn, &signer.ss58_address()).await?;
        if balance < value {
            let failure = PreconditionFailure::insufficient_balance(balance, value, "transfer amount");
            return Ok(ExtrinsicOutcome::precondition_failed(failure.to_string()));
        }
    }

    let function = if options.keep_alive {
        "transfer_keep_alive"
    } else {
        "transfer_allow_death"
    };
    info!(
        function,
        amount = %value,
        dest = %short_address(dest),
        "Submitting transfer"
    );
    let call = CallDescriptor::new(BALANCES_MODULE, function)
        .param("dest", Value::unnamed_variant("Id", [dest_id]))
        .param("value", Value::u128(value.as_u128()));
    Ok(compose_and_submit_checked(conn, &call, signer, submit).await)
}
