// JSON conversions between the JavaScript application and the core types

use proofmind_core::models::{
    CertificateCategory, CreateCertificateRequest, ProviderKind, UpdateCertificateRequest,
};
use proofmind_core::CoreError;
use serde::Serialize;
use wasm_bindgen::JsValue;

pub fn js_error(err: CoreError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize result: {}", e)))
}

pub fn parse_kind(kind: &str) -> Result<ProviderKind, String> {
    kind.parse::<ProviderKind>()
}

pub fn parse_category(category: &str) -> Result<CertificateCategory, String> {
    category.parse::<CertificateCategory>()
}

/// The web form sends camelCase keys; snake_case is accepted as well.
pub fn parse_create_request(json: &str) -> Result<CreateCertificateRequest, String> {
    let value = normalize_keys(json)?;
    serde_json::from_value(value).map_err(|e| format!("Invalid certificate request: {}", e))
}

pub fn parse_update_request(json: &str) -> Result<UpdateCertificateRequest, String> {
    let value = normalize_keys(json)?;
    serde_json::from_value(value).map_err(|e| format!("Invalid update request: {}", e))
}

fn normalize_keys(json: &str) -> Result<serde_json::Value, String> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| format!("Request is not valid JSON: {}", e))?;
    let serde_json::Value::Object(map) = value else {
        return Err("Request must be a JSON object".to_string());
    };
    Ok(serde_json::Value::Object(
        map.into_iter()
            .map(|(key, v)| (camel_to_snake(&key), v))
            .collect(),
    ))
}

fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
