use chain_evm::chains;
use chain_evm::eip712::{hash_typed_data, TypedData};
use chain_evm::error::EvmError;
use chain_evm::signature::RawSignature;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::account::EvmSmartAccount;
use crate::error::SmartAccountError;
use crate::oracle::{SignTypedDataRequest, SigningOracle};
use crate::replay_safe::replay_safe_typed_data;
use crate::signature_wrapper::{wrap_raw_signature, OwnerIndex, WrappedSignature};

/// Parameters for [`sign_and_wrap_typed_data`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTypedDataOptions {
    /// Chain the signature is bound to.
    pub chain_id: u64,
    pub typed_data: TypedData,
    /// Which owner signs; defaults to the first.
    #[serde(default)]
    pub owner_index: OwnerIndex,
    /// Forwarded verbatim to the signing oracle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl SignTypedDataOptions {
    pub fn new(chain_id: u64, typed_data: TypedData) -> Self {
        Self {
            chain_id,
            typed_data,
            owner_index: 0,
            idempotency_key: None,
        }
    }

    /// Resolves a network name such as `base-sepolia` to its chain ID.
    pub fn for_network(network: &str, typed_data: TypedData) -> Result<Self, SmartAccountError> {
        let chain = chains::get_chain_by_network(network)
            .ok_or_else(|| SmartAccountError::UnsupportedNetwork(network.to_string()))?;
        Ok(Self::new(chain.chain_id, typed_data))
    }

    pub fn owner_index(mut self, owner_index: OwnerIndex) -> Self {
        self.owner_index = owner_index;
        self
    }

    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignTypedDataResult {
    /// The wrapped signature, ready for `isValidSignature`.
    pub signature: WrappedSignature,
}

/// Signs typed data on behalf of a smart account.
///
/// 1. Resolves the signer as `account.owners[owner_index]`.
/// 2. Hashes `typed_data` and wraps the hash in the account's replay-safe
///    envelope for `chain_id`.
/// 3. Asks the oracle to sign the envelope (one call, no retries).
/// 4. Wraps the returned `r || s || v` signature with the owner index.
///
/// An out-of-range owner index fails before the oracle is contacted.
/// Oracle errors are returned unchanged as [`SmartAccountError::Oracle`].
#[instrument(
    skip_all,
    fields(
        account = %account.address,
        chain_id = options.chain_id,
        owner_index = options.owner_index,
    )
)]
pub async fn sign_and_wrap_typed_data<O>(
    oracle: &O,
    account: &EvmSmartAccount,
    options: SignTypedDataOptions,
) -> Result<SignTypedDataResult, SmartAccountError>
where
    O: SigningOracle + ?Sized,
{
    let SignTypedDataOptions {
        chain_id,
        typed_data,
        owner_index,
        idempotency_key,
    } = options;

    let signer_address = match account.owner(owner_index) {
        Some(owner) => owner,
        None => {
            warn!(owners = account.owners.len(), "owner index out of range");
            return Err(SmartAccountError::OwnerIndexOutOfRange {
                index: owner_index,
                owners: account.owners.len(),
            });
        }
    };

    let original_hash = hash_typed_data(&typed_data);
    let envelope = replay_safe_typed_data(original_hash, chain_id, account.address)?;
    debug!(
        %original_hash,
        replay_safe_hash = %envelope.signing_hash(),
        network = %chains::display_name(chain_id),
        signer = %signer_address,
        "built replay-safe envelope"
    );

    let response = oracle
        .sign_typed_data(SignTypedDataRequest {
            signer_address,
            typed_data: envelope,
            idempotency_key,
        })
        .await
        .map_err(SmartAccountError::Oracle)?;

    let raw = parse_oracle_signature(&response.signature)?;
    let signature = wrap_raw_signature(&raw, owner_index);

    debug!("wrapped owner signature");
    Ok(SignTypedDataResult { signature })
}

fn parse_oracle_signature(signature: &str) -> Result<RawSignature, SmartAccountError> {
    RawSignature::from_hex(signature).map_err(|e| match e {
        EvmError::EncodingError(msg) => {
            SmartAccountError::InvalidSignature(format!("oracle returned {msg}"))
        }
        other => other.into(),
    })
}
