use alloy_primitives::Address;
use k256::ecdsa::VerifyingKey;
use sha3::{Digest, Keccak256};

use crate::error::EvmError;

/// Parses a 0x-prefixed hex address string.
///
/// All-lowercase and all-uppercase inputs are accepted as-is. Mixed-case
/// inputs must carry a valid EIP-55 checksum.
pub fn parse_address(address: &str) -> Result<Address, EvmError> {
    let hex_part = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EvmError::InvalidAddress(format!("{address}: must start with 0x")))?;

    if hex_part.len() != 40 {
        return Err(EvmError::InvalidAddress(format!(
            "{address}: expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    let bytes = hex::decode(hex_part)
        .map_err(|e| EvmError::InvalidAddress(format!("{address}: {e}")))?;
    let parsed = Address::from_slice(&bytes);

    let is_all_lower = hex_part.chars().all(|c| !c.is_ascii_uppercase());
    let is_all_upper = hex_part.chars().all(|c| !c.is_ascii_lowercase());

    if !is_all_lower && !is_all_upper && checksum_address(&parsed)[2..] != *hex_part {
        return Err(EvmError::InvalidAddress(format!(
            "{address}: EIP-55 checksum mismatch"
        )));
    }

    Ok(parsed)
}

/// Formats an address with EIP-55 mixed-case checksum encoding.
pub fn checksum_address(address: &Address) -> String {
    let hex_part = hex::encode(address.as_slice());

    // EIP-55: hash the lowercase hex address (without 0x).
    let hash = Keccak256::digest(hex_part.as_bytes());

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");

    for (i, c) in hex_part.chars().enumerate() {
        let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }

    checksummed
}

/// Derives the address controlled by a secp256k1 verifying key.
///
/// Keccak-256 over the 64-byte uncompressed point (without the 0x04
/// prefix); the address is the last 20 bytes.
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let uncompressed = key.to_encoded_point(false);
    let hash = Keccak256::digest(&uncompressed.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}
