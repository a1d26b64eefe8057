// Contract call transactions in the MultiversX wire shape

use crate::codec::{encode_base64, encode_call_data};
use crate::error::CoreError;
use crate::settings::NetworkConfig;
use serde::{Deserialize, Serialize};

pub const TRANSACTION_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub nonce: u64,
    pub value: String,
    pub receiver: String,
    pub sender: String,
    pub gas_price: u64,
    pub gas_limit: u64,
    /// Base64 of the call data string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(rename = "chainID")]
    pub chain_id: String,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Transaction {
    /// Bytes the wallet signs: the canonical JSON without the signature.
    pub fn signing_payload(&self) -> Result<Vec<u8>, CoreError> {
        let unsigned = Transaction {
            signature: None,
            ..self.clone()
        };
        Ok(serde_json::to_vec(&unsigned)?)
    }

    /// Decoded call data string, if any.
    pub fn call_data(&self) -> Result<Option<String>, CoreError> {
        match &self.data {
            None => Ok(None),
            Some(b64) => {
                let bytes = crate::codec::decode_base64(b64)?;
                String::from_utf8(bytes)
                    .map(Some)
                    .map_err(|e| CoreError::ParseError(format!("Call data is not UTF-8: {}", e)))
            }
        }
    }

    pub fn with_signature(mut self, signature_hex: String) -> Self {
        self.signature = Some(signature_hex);
        self
    }
}

/// A contract endpoint invocation before sender and nonce are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub function: String,
    pub args: Vec<Vec<u8>>,
    pub gas_limit: u64,
}

impl ContractCall {
    pub fn new(function: &str, args: Vec<Vec<u8>>, gas_limit: u64) -> Self {
        Self {
            function: function.to_string(),
            args,
            gas_limit,
        }
    }

    pub fn data(&self) -> String {
        encode_call_data(&self.function, &self.args)
    }

    pub fn into_transaction(self, config: &NetworkConfig, sender: &str, nonce: u64) -> Transaction {
        Transaction {
            nonce,
            value: "0".to_string(),
            receiver: config.contract_address.clone(),
            sender: sender.to_string(),
            gas_price: config.gas_price,
            gas_limit: self.gas_limit,
            data: Some(encode_base64(self.data().as_bytes())),
            chain_id: config.chain_id.clone(),
            version: TRANSACTION_VERSION,
            signature: None,
        }
    }
}
