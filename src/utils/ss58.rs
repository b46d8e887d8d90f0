//! SS58 address encoding/decoding utilities

use crate::chain::Error;
use crate::core::constants::SS58_FORMAT;
use sp_core::crypto::{AccountId32, Ss58AddressFormat, Ss58Codec};

/// Encode a 32-byte public key to an SS58 address
pub fn ss58_encode(public_key: &[u8; 32]) -> String {
    let account = AccountId32::from(*public_key);
    account.to_ss58check_with_version(Ss58AddressFormat::custom(SS58_FORMAT))
}

/// Parse an SS58 address into an account id
pub fn parse_account(address: &str) -> Result<AccountId32, Error> {
    AccountId32::from_ss58check(address)
        .map_err(|e| Error::InvalidAccount(format!("{address}: {e:?}")))
}

/// Decode an SS58 address to its 32-byte public key
pub fn ss58_decode(address: &str) -> Result<[u8; 32], Error> {
    Ok(parse_account(address)?.into())
}

pub fn is_valid_ss58_address(address: &str) -> bool {
    AccountId32::from_ss58check(address).is_ok()
}

/// Shorten an address for log lines: `5Grwva...utQY`
///
/// Works on characters, so unvalidated input never splits a code point.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

    #[test]
    fn test_ss58_roundtrip() {
        let pubkey = [1u8; 32];
        let address = ss58_encode(&pubkey);
        assert_eq!(ss58_decode(&address).unwrap(), pubkey);
    }

    #[test]
    fn test_is_valid_ss58() {
        assert!(is_valid_ss58_address(ALICE));
        assert!(!is_valid_ss58_address("invalid"));
        assert!(!is_valid_ss58_address(""));
    }

    #[test]
    fn test_parse_account_error_names_input() {
        let err = parse_account("nope").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_short_address() {
        assert_eq!(short_address(ALICE), "5Grwva...utQY");
        assert_eq!(short_address("abc"), "abc");
    }

    #[test]
    fn test_short_address_non_ascii() {
        assert_eq!(short_address("aéééééé"), "aéééééé");
        assert_eq!(short_address("ααααααββββββγγγγ"), "αααααα...γγγγ");
    }
}
