// ProofMind WASM Bindings
// Browser entry point for wallet sessions and certificate management

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
mod convert;

#[cfg(target_arch = "wasm32")]
mod bindings;

#[cfg(target_arch = "wasm32")]
pub use bindings::ProofMind;

use wasm_bindgen::prelude::*;

// Initialize panic hook and logger for WASM
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Check a certificate request (JSON) without submitting it.
#[wasm_bindgen]
pub fn validate_certificate(request_json: &str) -> Result<(), JsValue> {
    let request = convert::parse_create_request(request_json).map_err(|e| JsValue::from_str(&e))?;
    proofmind_core::validation::validate_create(&request).map_err(convert::js_error)
}

/// Trim, de-duplicate and keep the order of a JSON array of tags.
#[wasm_bindgen]
pub fn normalize_tags(tags_json: &str) -> Result<String, JsValue> {
    let tags: Vec<String> = serde_json::from_str(tags_json)
        .map_err(|e| JsValue::from_str(&format!("Tags must be a JSON string array: {}", e)))?;
    convert::to_json(&proofmind_core::validation::normalize_tags(&tags))
}

/// Base-unit balance string rendered with four decimals.
#[wasm_bindgen]
pub fn format_balance(base_units: &str) -> Result<String, JsValue> {
    proofmind_core::codec::format_egld(base_units).map_err(convert::js_error)
}

/// Known certificate categories as a JSON array.
#[wasm_bindgen]
pub fn categories() -> Result<String, JsValue> {
    let names: Vec<String> = proofmind_core::CertificateCategory::ALL
        .iter()
        .map(|c| c.as_str().to_string())
        .collect();
    convert::to_json(&names)
}
