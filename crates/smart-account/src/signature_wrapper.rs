use std::fmt;

use alloy_primitives::U256;
use chain_evm::abi::{self, AbiKind, AbiToken};
use chain_evm::signature::RawSignature;
use serde::{Serialize, Serializer};

use crate::error::SmartAccountError;

/// Position of an owner key in the smart account's owner list.
pub type OwnerIndex = u8;

/// `abi.encode(SignatureWrapper { uint256 ownerIndex; bytes signatureData })`,
/// the signature format a Coinbase Smart Wallet accepts in
/// `isValidSignature`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedSignature(Vec<u8>);

impl WrappedSignature {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl Serialize for WrappedSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl fmt::Display for WrappedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn wrapper_kind() -> Vec<AbiKind> {
    vec![AbiKind::Tuple(vec![AbiKind::Uint, AbiKind::Bytes])]
}

/// Wraps a 65-byte `r || s || v` signature for the owner at `owner_index`.
///
/// Any other length fails with `InvalidSignatureLength`; the signature is
/// never truncated or padded.
pub fn wrap_signature(
    signature: &[u8],
    owner_index: OwnerIndex,
) -> Result<WrappedSignature, SmartAccountError> {
    let raw = RawSignature::from_bytes(signature)?;
    Ok(wrap_raw_signature(&raw, owner_index))
}

/// Like [`wrap_signature`], for an already-validated signature.
pub fn wrap_raw_signature(signature: &RawSignature, owner_index: OwnerIndex) -> WrappedSignature {
    let signature_data = signature.to_bytes().to_vec();

    let wrapper = AbiToken::Tuple(vec![
        AbiToken::Uint(U256::from(owner_index)),
        AbiToken::Bytes(signature_data),
    ]);

    WrappedSignature(abi::encode(&[wrapper]))
}

/// Decodes a wrapped signature back into its owner index and raw signature.
pub fn unwrap_signature(wrapped: &[u8]) -> Result<(OwnerIndex, RawSignature), SmartAccountError> {
    let mut tokens = abi::decode(wrapped, &wrapper_kind())?;

    let members = match tokens.pop() {
        Some(AbiToken::Tuple(members)) => members,
        _ => {
            return Err(SmartAccountError::InvalidSignature(
                "expected a SignatureWrapper tuple".into(),
            ))
        }
    };

    match members.as_slice() {
        [AbiToken::Uint(index), AbiToken::Bytes(data)] => {
            let owner_index = owner_index_from_word(*index)?;
            let raw = RawSignature::from_bytes(data)?;
            Ok((owner_index, raw))
        }
        _ => Err(SmartAccountError::InvalidSignature(
            "unexpected SignatureWrapper members".into(),
        )),
    }
}

fn owner_index_from_word(word: U256) -> Result<OwnerIndex, SmartAccountError> {
    if word > U256::from(OwnerIndex::MAX) {
        return Err(SmartAccountError::InvalidSignature(format!(
            "owner index {word} does not fit in a byte"
        )));
    }
    Ok(word.as_limbs()[0] as OwnerIndex)
}
