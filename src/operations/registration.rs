//! Burn registration. Only burn registration is supported, signed by the
//! coldkey that pays the burn.

use super::account_arg;
use crate::chain::{
    compose_and_submit_checked, CallDescriptor, ChainConnection, ChainEvent, KeySigner,
    SubmitOptions,
};
use crate::core::constants::SUBTENSOR_MODULE;
use crate::errors::{ChainConnectionError, PreconditionFailure};
use crate::queries::{get_balance, get_burn_cost, get_subnet_hyperparams, get_subnet_info, get_uid_for_hotkey};
use crate::utils::balance_newtypes::Rao;
use crate::utils::decoders::decode_u16;
use crate::utils::ss58::short_address;
use serde::Serialize;
use subxt::dynamic::Value;
use tracing::{error, info};

/// Registration conditions of a subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationInfo {
    pub netuid: u16,
    pub burn: Rao,
    /// True unless the hyperparameters say otherwise
    pub registration_allowed: bool,
    pub max_regs_per_block: u64,
    pub current_neurons: Option<u16>,
    pub max_neurons: Option<u16>,
}

/// Result of [`burn_register`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationOutcome {
    pub success: bool,
    /// Failure reason, or a note such as "Already registered with UID 7"
    pub message: Option<String>,
    pub uid: Option<u16>,
}

impl RegistrationOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            uid: None,
        }
    }
}

pub async fn get_registration_info(
    conn: &ChainConnection,
    netuid: u16,
) -> Result<RegistrationInfo, ChainConnectionError> {
    let burn = get_burn_cost(conn, netuid).await?;
    let params = get_subnet_hyperparams(conn, netuid).await?;
    let summary = get_subnet_info(conn, netuid).await?;
    Ok(RegistrationInfo {
        netuid,
        burn,
        registration_allowed: params.as_ref().map_or(true, |p| p.registration_allowed),
        max_regs_per_block: params.as_ref().map_or(0, |p| p.max_regs_per_block),
        current_neurons: summary.map(|s| s.subnetwork_n),
        max_neurons: summary.map(|s| s.max_allowed_uids),
    })
}

/// UID of `hotkey` on the subnet, if registered.
pub async fn check_registration_status(
    conn: &ChainConnection,
    hotkey: &str,
    netuid: u16,
) -> Result<Option<u16>, ChainConnectionError> {
    get_uid_for_hotkey(conn, netuid, hotkey).await
}

/// Register `hotkey` on a subnet by burning the current registration cost.
///
/// An already registered hotkey is reported as success with its UID and no
/// transaction is sent. With `check_balance`, a signer whose free balance is
/// below the burn cost fails before anything is submitted.
pub async fn burn_register(
    conn: &ChainConnection,
    signer: &dyn KeySigner,
    hotkey: &str,
    netuid: u16,
    check_balance: bool,
    options: &SubmitOptions,
) -> Result<RegistrationOutcome, ChainConnectionError> {
    let burn = get_burn_cost(conn, netuid).await?;
    info!(netuid, burn = %burn, "Burn cost");

    if check_balance {
        let balance = get_balance(conn, &signer.ss58_address()).await?;
        if balance < burn {
            let failure = PreconditionFailure::insufficient_balance(balance, burn, "burn cost");
            return Ok(RegistrationOutcome::failed(failure.message));
        }
    }

    if let Some(uid) = check_registration_status(conn, hotkey, netuid).await? {
        return Ok(RegistrationOutcome {
            success: true,
            message: Some(format!("Already registered with UID {uid}")),
            uid: Some(uid),
        });
    }

    let hotkey_id = match account_arg("hotkey", hotkey) {
        Ok(v) => v,
        Err(outcome) => {
            return Ok(RegistrationOutcome::failed(
                outcome.error.unwrap_or_default(),
            ))
        }
    };
    info!(netuid, hotkey = %short_address(hotkey), "Submitting burn registration");
    let call = CallDescriptor::new(SUBTENSOR_MODULE, "burned_register")
        .param("netuid", Value::u128(netuid as u128))
        .param("hotkey", hotkey_id);
    let outcome = compose_and_submit_checked(conn, &call, signer, options).await;

    if !outcome.success {
        let message = outcome.error.unwrap_or_else(|| "Unknown error".to_string());
        error!(netuid, error = %message, "Registration failed");
        return Ok(RegistrationOutcome::failed(message));
    }

    let uid = match uid_from_events(outcome.events()) {
        Some(uid) => Some(uid),
        None => check_registration_status(conn, hotkey, netuid).await?,
    };
    info!(netuid, uid = ?uid, "Registration successful");
    Ok(RegistrationOutcome {
        success: true,
        message: None,
        uid,
    })
}

/// UID carried by a `NeuronRegistered(netuid, uid, hotkey)` event.
fn uid_from_events(events: &[ChainEvent]) -> Option<u16> {
    events
        .iter()
        .filter(|event| event.is(SUBTENSOR_MODULE, "NeuronRegistered"))
        .find_map(|event| event.field("uid", 1).and_then(decode_u16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_from_positional_event() {
        let events = vec![
            ChainEvent {
                pallet: "Balances".into(),
                variant: "Withdraw".into(),
                fields: vec![],
            },
            ChainEvent {
                pallet: SUBTENSOR_MODULE.into(),
                variant: "NeuronRegistered".into(),
                fields: vec![
                    (None, Value::u128(3)),
                    (None, Value::u128(42)),
                    (None, Value::from_bytes([1u8; 32])),
                ],
            },
        ];
        assert_eq!(uid_from_events(&events), Some(42));
    }

    #[test]
    fn test_uid_from_named_event_and_absence() {
        let named = ChainEvent {
            pallet: SUBTENSOR_MODULE.into(),
            variant: "NeuronRegistered".into(),
            fields: vec![(Some("uid".into()), Value::u128(9))],
        };
        assert_eq!(uid_from_events(&[named]), Some(9));
        assert_eq!(uid_from_events(&[]), None);
    }
}
