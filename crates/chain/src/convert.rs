//! Conversions between on-chain primitives and domain types.

use std::str::FromStr;

use alloy::primitives::{Address, B256, U256};
use keepwatch_core::{Network, SourceError};

pub fn network_from_b256(raw: B256) -> Network {
    Network::new(format!("{raw}"))
}

pub fn network_to_b256(network: &Network) -> Result<B256, SourceError> {
    B256::from_str(network.as_str())
        .map_err(|e| SourceError::InvalidIdentifier(format!("network {network}: {e}")))
}

pub fn parse_address(raw: &str) -> Result<Address, SourceError> {
    Address::from_str(raw)
        .map_err(|e| SourceError::InvalidIdentifier(format!("address {raw}: {e}")))
}

/// Narrow a `uint256` to `u64`, failing instead of truncating.
pub fn to_u64(what: &'static str, value: U256) -> Result<u64, SourceError> {
    u64::try_from(value).map_err(|_| SourceError::OutOfRange {
        what,
        value: value.to_string(),
    })
}

/// Largest registry count accepted from `numNetworks` / `numJobs`.
pub const MAX_REGISTRY_LEN: u64 = 100_000;

/// Narrow a registry count, rejecting values too large to enumerate.
pub fn registry_len(what: &'static str, value: U256) -> Result<u64, SourceError> {
    let len = to_u64(what, value)?;
    if len > MAX_REGISTRY_LEN {
        return Err(SourceError::OutOfRange {
            what,
            value: len.to_string(),
        });
    }
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_hex_round_trips() {
        let raw = B256::repeat_byte(0xab);
        let network = network_from_b256(raw);
        assert!(network.as_str().starts_with("0xabab"));
        assert_eq!(network.as_str().len(), 66);
        assert_eq!(network_to_b256(&network).unwrap(), raw);
    }

    #[test]
    fn non_hex_network_is_rejected() {
        let err = network_to_b256(&Network::from("network1")).unwrap_err();
        assert!(matches!(err, SourceError::InvalidIdentifier(_)));
    }

    #[test]
    fn address_parses_checksummed_and_lowercase() {
        assert!(parse_address("0x238b4E35dAed6100C6162fAE4510261f88996EC9").is_ok());
        assert!(parse_address("0x238b4e35daed6100c6162fae4510261f88996ec9").is_ok());
        assert!(parse_address("job1").is_err());
    }

    #[test]
    fn oversized_registry_count_is_rejected() {
        assert_eq!(registry_len("numJobs", U256::from(3u64)).unwrap(), 3);
        assert_eq!(
            registry_len("numJobs", U256::from(MAX_REGISTRY_LEN)).unwrap(),
            MAX_REGISTRY_LEN
        );
        let err = registry_len("numJobs", U256::from(u64::MAX)).unwrap_err();
        assert!(matches!(err, SourceError::OutOfRange { what: "numJobs", .. }));
    }

    #[test]
    fn u256_narrowing() {
        assert_eq!(to_u64("totalWindowSize", U256::from(48u64)).unwrap(), 48);
        let err = to_u64("totalWindowSize", U256::MAX).unwrap_err();
        assert!(matches!(err, SourceError::OutOfRange { what: "totalWindowSize", .. }));
    }
}
