//! Contract of the remote signing service.
//!
//! The service holds the owner keys. It receives a signer address and an
//! EIP-712 envelope and answers with a 65-byte `r || s || v` signature as
//! hex. Transport, authentication, retries and timeouts all belong to the
//! implementation; failures are returned as an opaque [`OracleError`] and
//! propagated to the caller unchanged.

use alloy_primitives::Address;
use async_trait::async_trait;
use chain_evm::eip712::TypedData;
use serde::{Deserialize, Serialize};

/// Any failure reported by a signing oracle.
pub type OracleError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Request body sent to the signing oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTypedDataRequest {
    pub signer_address: Address,
    pub typed_data: TypedData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

/// Response body from the signing oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignTypedDataResponse {
    /// Hex-encoded `r || s || v` signature.
    pub signature: String,
}

/// A service that signs EIP-712 typed data on behalf of an owner key.
#[async_trait]
pub trait SigningOracle: Send + Sync {
    async fn sign_typed_data(
        &self,
        request: SignTypedDataRequest,
    ) -> Result<SignTypedDataResponse, OracleError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_typed_data() -> TypedData {
        TypedData::try_from(json!({
            "types": { "Ping": [{"name": "id", "type": "uint256"}] },
            "primaryType": "Ping",
            "domain": { "name": "Test", "chainId": 1 },
            "message": { "id": "7" }
        }))
        .unwrap()
    }

    #[test]
    fn request_uses_camel_case_wire_names() {
        let request = SignTypedDataRequest {
            signer_address: Address::repeat_byte(0x11),
            typed_data: sample_typed_data(),
            idempotency_key: Some("key-1".into()),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("signerAddress").is_some());
        assert_eq!(json["typedData"]["primaryType"], "Ping");
        assert_eq!(json["typedData"]["message"]["id"], "7");
        assert_eq!(json["idempotencyKey"], "key-1");
    }

    #[test]
    fn request_omits_missing_idempotency_key() {
        let request = SignTypedDataRequest {
            signer_address: Address::ZERO,
            typed_data: sample_typed_data(),
            idempotency_key: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("idempotencyKey").is_none());
    }

    #[test]
    fn response_parses() {
        let response: SignTypedDataResponse =
            serde_json::from_str(r#"{"signature":"0xabcd"}"#).unwrap();
        assert_eq!(response.signature, "0xabcd");
    }
}
