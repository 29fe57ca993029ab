use std::collections::HashMap;
use std::fmt;

use alloy_primitives::Address;
use async_trait::async_trait;
use chain_evm::address::{address_from_verifying_key, checksum_address};
use chain_evm::error::EvmError;
use chain_evm::signature::sign_prehash;
use k256::ecdsa::SigningKey;
use tracing::debug;
use zeroize::Zeroize;

use crate::oracle::{OracleError, SignTypedDataRequest, SignTypedDataResponse, SigningOracle};

/// A signing oracle backed by in-process secp256k1 owner keys.
///
/// Signs the EIP-712 signing hash of the requested typed data, returning
/// `r || s || v` with `v` as 27 or 28.
#[derive(Default)]
pub struct LocalSigningOracle {
    keys: HashMap<Address, SigningKey>,
}

impl LocalSigningOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an owner key and returns the address it signs for.
    pub fn add_key(&mut self, private_key: &[u8; 32]) -> Result<Address, EvmError> {
        let mut key_bytes = *private_key;
        let signing_key = SigningKey::from_bytes((&key_bytes).into())
            .map_err(|e| EvmError::InvalidPrivateKey(e.to_string()));
        key_bytes.zeroize();
        let signing_key = signing_key?;

        let address = address_from_verifying_key(signing_key.verifying_key());
        self.keys.insert(address, signing_key);
        Ok(address)
    }

    /// Addresses this oracle can sign for.
    pub fn addresses(&self) -> Vec<Address> {
        self.keys.keys().copied().collect()
    }
}

impl fmt::Debug for LocalSigningOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigningOracle")
            .field("addresses", &self.addresses())
            .finish()
    }
}

#[async_trait]
impl SigningOracle for LocalSigningOracle {
    async fn sign_typed_data(
        &self,
        request: SignTypedDataRequest,
    ) -> Result<SignTypedDataResponse, OracleError> {
        let signing_key = self.keys.get(&request.signer_address).ok_or_else(|| {
            format!(
                "no key registered for signer {}",
                checksum_address(&request.signer_address)
            )
        })?;

        let hash = request.typed_data.signing_hash();
        debug!(
            signer = %request.signer_address,
            primary_type = request.typed_data.primary_type(),
            %hash,
            "signing typed data locally"
        );

        let signature = sign_prehash(signing_key, &hash)?;
        Ok(SignTypedDataResponse {
            signature: signature.to_string(),
        })
    }
}
