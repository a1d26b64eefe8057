use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// Process-wide network configuration. Built once at startup and treated as
/// read-only afterwards.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NetworkConfig {
    /// "D" for devnet, "T" for testnet, "1" for mainnet.
    pub chain_id: String,
    #[serde(default = "default_gas_price")]
    pub gas_price: u64,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    pub contract_address: String,
    pub explorer_url: String,
    pub api_url: String,
    #[serde(default)]
    pub wallets: WalletSettings,
}

/// Settings consumed by the wallet provider adapters.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WalletSettings {
    #[serde(default = "default_web_wallet_url")]
    pub web_wallet_url: String,
    #[serde(default)]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub remote_pair_project_id: String,
    #[serde(default = "default_relay_url")]
    pub remote_pair_relay_url: String,
    #[serde(default)]
    pub hardware_account_index: u32,
    #[serde(default)]
    pub hardware_address_index: u32,
    #[serde(default)]
    pub dapp: DappMetadata,
}

/// Metadata shown by remote wallets during pairing.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DappMetadata {
    pub name: String,
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub icons: Vec<String>,
}

impl Default for WalletSettings {
    fn default() -> Self {
        Self {
            web_wallet_url: default_web_wallet_url(),
            callback_url: None,
            remote_pair_project_id: String::new(),
            remote_pair_relay_url: default_relay_url(),
            hardware_account_index: 0,
            hardware_address_index: 0,
            dapp: DappMetadata::default(),
        }
    }
}

impl Default for DappMetadata {
    fn default() -> Self {
        Self {
            name: "MVX-ProofMind".to_string(),
            description: "AI-powered blockchain certification system".to_string(),
            url: "https://mvx-proofmind.vercel.app".to_string(),
            icons: vec!["https://mvx-proofmind.vercel.app/icon.png".to_string()],
        }
    }
}

impl NetworkConfig {
    pub fn devnet(contract_address: &str) -> Self {
        Self {
            chain_id: "D".to_string(),
            gas_price: default_gas_price(),
            gas_limit: default_gas_limit(),
            contract_address: contract_address.to_string(),
            explorer_url: "https://devnet-explorer.multiversx.com".to_string(),
            api_url: "https://devnet-gateway.multiversx.com".to_string(),
            wallets: WalletSettings::default(),
        }
    }

    pub fn mainnet(contract_address: &str) -> Self {
        Self {
            chain_id: "1".to_string(),
            gas_price: default_gas_price(),
            gas_limit: default_gas_limit(),
            contract_address: contract_address.to_string(),
            explorer_url: "https://explorer.multiversx.com".to_string(),
            api_url: "https://gateway.multiversx.com".to_string(),
            wallets: WalletSettings {
                web_wallet_url: "https://wallet.multiversx.com".to_string(),
                ..WalletSettings::default()
            },
        }
    }

    #[cfg(feature = "native")]
    pub fn from_file(path: &str) -> Result<Self, CoreError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("PROOFMIND").separator("__"));
        let cfg = builder.build()?;
        Ok(cfg.try_deserialize()?)
    }

    #[cfg(feature = "native")]
    pub fn save_to_file(&self, path: &str) -> Result<(), CoreError> {
        let toml_string = toml::to_string(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate settings ranges and constraints
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.chain_id.trim().is_empty() {
            return Err(CoreError::Validation("chain_id must not be empty".to_string()));
        }
        if self.gas_price == 0 {
            return Err(CoreError::Validation("gas_price must be > 0".to_string()));
        }
        if self.gas_limit == 0 {
            return Err(CoreError::Validation("gas_limit must be > 0".to_string()));
        }
        if self.contract_address.trim().is_empty() {
            return Err(CoreError::Validation("contract_address must be set".to_string()));
        }
        crate::address::decode_bech32(&self.contract_address)
            .map_err(|e| CoreError::Validation(format!("contract_address: {}", e)))?;
        for (name, value) in [("api_url", &self.api_url), ("explorer_url", &self.explorer_url)] {
            url::Url::parse(value)
                .map_err(|e| CoreError::Validation(format!("{} is not a valid URL: {}", name, e)))?;
        }
        Ok(())
    }

    /// `{explorerUrl}/transactions/{txHash}`
    pub fn transaction_url(&self, tx_hash: &str) -> String {
        format!("{}/transactions/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }

    /// `{explorerUrl}/accounts/{address}`
    pub fn account_url(&self, address: &str) -> String {
        format!("{}/accounts/{}", self.explorer_url.trim_end_matches('/'), address)
    }
}

fn default_gas_price() -> u64 { 1_000_000_000 }
fn default_gas_limit() -> u64 { 10_000_000 }
fn default_web_wallet_url() -> String { "https://devnet-wallet.multiversx.com".to_string() }
fn default_relay_url() -> String { "wss://relay.walletconnect.com".to_string() }

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = "erd1qqqqqqqqqqqqqpgqp699jngundfqw07d8jzkepucvpzush6k3wvqyc44rx";

    #[test]
    fn test_explorer_links() {
        let cfg = NetworkConfig::devnet(CONTRACT);
        assert_eq!(
            cfg.transaction_url("abc123"),
            "https://devnet-explorer.multiversx.com/transactions/abc123"
        );
        assert_eq!(
            cfg.account_url("erd1xyz"),
            "https://devnet-explorer.multiversx.com/accounts/erd1xyz"
        );
    }

    #[test]
    fn test_validate_rejects_missing_contract() {
        let cfg = NetworkConfig::devnet("");
        assert!(matches!(cfg.validate(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "chain_id": "D",
            "contract_address": "erd1qqqqqqqqqqqqqpgqp699jngundfqw07d8jzkepucvpzush6k3wvqyc44rx",
            "explorer_url": "https://devnet-explorer.multiversx.com",
            "api_url": "https://devnet-gateway.multiversx.com"
        }"#;
        let cfg = NetworkConfig::from_json(json).unwrap();
        assert_eq!(cfg.gas_limit, 10_000_000);
        assert_eq!(cfg.gas_price, 1_000_000_000);
        assert_eq!(cfg.wallets.dapp.name, "MVX-ProofMind");
    }
}
