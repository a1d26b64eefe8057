// Native implementations

pub mod proxy_impl;
pub mod storage_impl;

pub use proxy_impl::NativeProxyProvider;
pub use storage_impl::FileStorage;
