// WASM-specific implementations
pub mod proxy;
pub mod storage_impl;
pub mod utils;
pub mod wallet_bridge;

// Re-exports
pub use proxy::WasmProxyProvider;
pub use storage_impl::LocalStorageBackend;
pub use utils::sleep_ms;
pub use wallet_bridge::JsWalletBridge;
