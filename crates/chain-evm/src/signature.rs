use std::fmt;

use alloy_primitives::{Address, B256};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

use crate::address::address_from_verifying_key;
use crate::error::EvmError;

/// Length of an `r || s || v` secp256k1 signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// A 65-byte ECDSA signature: 32-byte `r`, 32-byte `s`, 1-byte `v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSignature {
    r: B256,
    s: B256,
    v: u8,
}

impl RawSignature {
    pub fn new(r: B256, s: B256, v: u8) -> Self {
        Self { r, s, v }
    }

    /// Splits exactly 65 bytes into `r = [0..32]`, `s = [32..64]`, `v = [64]`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EvmError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(EvmError::InvalidSignatureLength(bytes.len()));
        }

        Ok(Self {
            r: B256::from_slice(&bytes[..32]),
            s: B256::from_slice(&bytes[32..64]),
            v: bytes[64],
        })
    }

    /// Parses a hex signature, with or without the `0x` prefix.
    pub fn from_hex(signature: &str) -> Result<Self, EvmError> {
        let hex_part = signature
            .strip_prefix("0x")
            .or_else(|| signature.strip_prefix("0X"))
            .unwrap_or(signature);

        let bytes = hex::decode(hex_part)
            .map_err(|e| EvmError::EncodingError(format!("invalid signature hex: {e}")))?;

        Self::from_bytes(&bytes)
    }

    pub fn r(&self) -> B256 {
        self.r
    }

    pub fn s(&self) -> B256 {
        self.s
    }

    pub fn v(&self) -> u8 {
        self.v
    }

    /// Packs the signature tightly as `r || s || v`.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..32].copy_from_slice(self.r.as_slice());
        out[32..64].copy_from_slice(self.s.as_slice());
        out[64] = self.v;
        out
    }

    /// Recovers the address that produced this signature over `prehash`.
    ///
    /// Accepts both `v ∈ {27, 28}` and raw recovery ids `{0, 1}`.
    pub fn recover_address(&self, prehash: &B256) -> Result<Address, EvmError> {
        let recovery_byte = if self.v >= 27 { self.v - 27 } else { self.v };
        let recovery_id = RecoveryId::from_byte(recovery_byte)
            .ok_or_else(|| EvmError::SigningError(format!("invalid recovery id: {}", self.v)))?;

        let mut r_s = [0u8; 64];
        r_s[..32].copy_from_slice(self.r.as_slice());
        r_s[32..].copy_from_slice(self.s.as_slice());
        let signature = Signature::from_slice(&r_s)
            .map_err(|e| EvmError::SigningError(format!("invalid signature: {e}")))?;

        let key = VerifyingKey::recover_from_prehash(prehash.as_slice(), &signature, recovery_id)
            .map_err(|e| EvmError::SigningError(format!("recovery failed: {e}")))?;

        Ok(address_from_verifying_key(&key))
    }
}

impl fmt::Display for RawSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}

/// Signs a 32-byte prehash (no EIP-191 prefix), returning `v` as 27 or 28.
pub fn sign_prehash(signing_key: &SigningKey, prehash: &B256) -> Result<RawSignature, EvmError> {
    let (signature, recovery_id): (Signature, RecoveryId) = signing_key
        .sign_prehash(prehash.as_slice())
        .map_err(|e| EvmError::SigningError(e.to_string()))?;

    let r = B256::from_slice(&signature.r().to_bytes());
    let s = B256::from_slice(&signature.s().to_bytes());
    let v = recovery_id.is_y_odd() as u8 + 27;

    Ok(RawSignature::new(r, s, v))
}
