// ProofMind Core Library
// Platform-agnostic MultiversX access layer for the ProofMind certificate contract

pub mod address;
pub mod codec;
pub mod context;
pub mod error;
pub mod gateway;
pub mod models;
pub mod network_provider;
pub mod proof_decoder;
pub mod session;
pub mod settings;
pub mod storage_trait;
pub mod store;
pub mod transaction;
pub mod validation;
pub mod wallet;

#[cfg(feature = "native")]
pub mod native;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use context::ProofMindContext;
pub use error::{CoreError, CoreResult};
pub use gateway::ContractGateway;
pub use models::*;
pub use network_provider::*;
pub use session::WalletSessionManager;
pub use settings::NetworkConfig;
pub use storage_trait::*;
pub use store::CertificateStore;
pub use transaction::{ContractCall, Transaction};
pub use wallet::{LocalKeyBridge, WalletBridge, WalletProvider};

#[cfg(feature = "native")]
pub async fn sleep_ms(milliseconds: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(milliseconds)).await;
}

#[cfg(all(feature = "wasm", target_arch = "wasm32", not(feature = "native")))]
pub use wasm::utils::sleep_ms;
