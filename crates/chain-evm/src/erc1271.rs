use alloy_primitives::B256;

use crate::abi::{encode_function_call, AbiToken};

/// Function selector for `isValidSignature(bytes32,bytes)`: `0x1626ba7e`.
pub const IS_VALID_SIGNATURE_SELECTOR: [u8; 4] = [0x16, 0x26, 0xba, 0x7e];

/// Value a contract returns from `isValidSignature` when the signature is
/// accepted. Equal to the function selector.
pub const MAGIC_VALUE: [u8; 4] = IS_VALID_SIGNATURE_SELECTOR;

/// Encodes an ERC-1271 `isValidSignature(bytes32 hash, bytes signature)` call.
///
/// For a smart account, `hash` is the original (unwrapped) message hash and
/// `signature` is the wrapped signature.
pub fn encode_is_valid_signature(hash: B256, signature: &[u8]) -> Vec<u8> {
    let params = [AbiToken::FixedBytes(hash), AbiToken::Bytes(signature.to_vec())];
    encode_function_call(IS_VALID_SIGNATURE_SELECTOR, &params)
}

/// Interprets the return data of an `isValidSignature` call.
///
/// The `bytes4` result is left-aligned in a 32-byte word.
pub fn is_magic_value(return_data: &[u8]) -> bool {
    return_data.len() >= 4 && return_data[..4] == MAGIC_VALUE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_call_layout() {
        let hash = B256::repeat_byte(0x42);
        let signature = vec![0x11; 65];

        let data = encode_is_valid_signature(hash, &signature);

        assert_eq!(&data[..4], &IS_VALID_SIGNATURE_SELECTOR);
        assert_eq!(&data[4..36], hash.as_slice());
        // Offset to the bytes argument.
        assert_eq!(data[67], 0x40);
        // Length word.
        assert_eq!(data[99], 65);
        assert_eq!(&data[100..165], &signature[..]);
        // 4 + hash + offset + length + three data words
        assert_eq!(data.len(), 4 + 32 * 6);
    }

    #[test]
    fn magic_value_detection() {
        let mut word = [0u8; 32];
        word[..4].copy_from_slice(&MAGIC_VALUE);
        assert!(is_magic_value(&word));
        assert!(!is_magic_value(&[0xff; 32]));
        assert!(!is_magic_value(&[0x16, 0x26]));
    }
}
