// Bech32 address handling for MultiversX accounts (`erd1...`)

use crate::error::CoreError;
use bech32::{Bech32, Hrp};

pub const ADDRESS_HRP: &str = "erd";
pub const PUBKEY_LEN: usize = 32;

/// Decode an `erd1...` address into its 32-byte public key.
pub fn decode_bech32(address: &str) -> Result<[u8; PUBKEY_LEN], CoreError> {
    let (hrp, data) = bech32::decode(address.trim())
        .map_err(|e| CoreError::InvalidInput(format!("Invalid bech32 address {}: {}", address, e)))?;
    if hrp.as_str() != ADDRESS_HRP {
        return Err(CoreError::InvalidInput(format!(
            "Unexpected address prefix {} (expected {})",
            hrp, ADDRESS_HRP
        )));
    }
    data.as_slice().try_into().map_err(|_| {
        CoreError::InvalidInput(format!(
            "Address payload must be {} bytes, got {}",
            PUBKEY_LEN,
            data.len()
        ))
    })
}

/// Encode a 32-byte public key as an `erd1...` address.
pub fn encode_bech32(pubkey: &[u8]) -> Result<String, CoreError> {
    if pubkey.len() != PUBKEY_LEN {
        return Err(CoreError::InvalidInput(format!(
            "Public key must be {} bytes, got {}",
            PUBKEY_LEN,
            pubkey.len()
        )));
    }
    let hrp = Hrp::parse(ADDRESS_HRP).map_err(|e| CoreError::Init(e.to_string()))?;
    bech32::encode::<Bech32>(hrp, pubkey)
        .map_err(|e| CoreError::InvalidInput(format!("Failed to encode address: {}", e)))
}

/// Hex form of the public key behind an address, as used in contract arguments.
pub fn address_to_hex(address: &str) -> Result<String, CoreError> {
    Ok(hex::encode(decode_bech32(address)?))
}
