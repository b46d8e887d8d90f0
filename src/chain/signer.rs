//! Signing capability handed in by the key custody layer.
//!
//! The manager never touches key material. Mutating operations receive a
//! [`KeySigner`] for the coldkey and hand it to the RPC backend, which adapts
//! it to subxt's signer trait.

use crate::chain::Error;
use crate::utils::ss58::ss58_encode;
use sp_core::{sr25519, Pair};
use subxt::{
    config::substrate::{AccountId32, MultiSignature},
    tx::Signer,
    Config, PolkadotConfig,
};

/// An sr25519 key that can sign extrinsic payloads.
pub trait KeySigner: Send + Sync {
    /// Raw 32-byte public key.
    fn public_key(&self) -> [u8; 32];

    /// Sign a payload, returning the raw 64-byte sr25519 signature.
    fn sign(&self, payload: &[u8]) -> [u8; 64];

    /// SS58 address of this key.
    fn ss58_address(&self) -> String {
        ss58_encode(&self.public_key())
    }
}

/// [`KeySigner`] over an in-memory sr25519 pair.
#[derive(Clone)]
pub struct PairSigner {
    signer: sr25519::Pair,
}

impl PairSigner {
    pub fn new(signer: sr25519::Pair) -> Self {
        Self { signer }
    }

    /// Returns the sr25519::Pair used for signing
    pub fn signer(&self) -> &sr25519::Pair {
        &self.signer
    }
}

impl KeySigner for PairSigner {
    fn public_key(&self) -> [u8; 32] {
        self.signer.public().0
    }

    fn sign(&self, payload: &[u8]) -> [u8; 64] {
        Pair::sign(&self.signer, payload).0
    }
}

impl std::fmt::Debug for PairSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairSigner")
            .field("address", &self.ss58_address())
            .finish()
    }
}

/// Create a signer from a secret URI such as a mnemonic, hex seed or `//Alice`.
pub fn signer_from_seed(seed: &str) -> Result<PairSigner, Error> {
    let pair = sr25519::Pair::from_string(seed, None)
        .map_err(|e| Error::InvalidAccount(format!("Failed to create pair from seed: {e:?}")))?;
    Ok(PairSigner::new(pair))
}

/// Borrowed [`KeySigner`] presented to subxt.
pub(crate) struct SubxtSigner<'a>(pub &'a dyn KeySigner);

impl Signer<PolkadotConfig> for SubxtSigner<'_> {
    fn account_id(&self) -> <PolkadotConfig as Config>::AccountId {
        AccountId32(self.0.public_key())
    }

    fn sign(&self, signer_payload: &[u8]) -> <PolkadotConfig as Config>::Signature {
        MultiSignature::Sr25519(self.0.sign(signer_payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_core::crypto::Ss58Codec;

    #[test]
    fn test_signer_from_dev_seed() {
        let signer = signer_from_seed("//Alice").unwrap();
        assert_eq!(
            signer.ss58_address(),
            "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"
        );
    }

    #[test]
    fn test_signature_verifies() {
        let signer = signer_from_seed("//Bob").unwrap();
        let sig = sr25519::Signature::from_raw(KeySigner::sign(&signer, b"payload"));
        let public = sr25519::Public::from_raw(signer.public_key());
        assert!(sr25519::Pair::verify(&sig, b"payload", &public));
        assert!(sp_core::crypto::AccountId32::from_ss58check(&signer.ss58_address()).is_ok());
    }

    #[test]
    fn test_invalid_seed() {
        assert!(signer_from_seed("not a valid uri ///").is_err());
    }

    #[test]
    fn test_subxt_adapter_account() {
        let signer = signer_from_seed("//Alice").unwrap();
        let adapter = SubxtSigner(&signer);
        assert_eq!(Signer::account_id(&adapter).0, signer.public_key());
    }
}
