// WASM wallet bridge - defers login and signing to a JavaScript handler
//
// The handler is a plain object supplied by the web application:
//   login(request)           -> Promise<{address, signature?} | string | null>
//                               (an extension login must return the hex
//                               signature of request.token)
//   resume(kind, address)    -> Promise<boolean>   (optional)
//   signTransaction(request) -> Promise<string>    (hex signature)
//   logout()                 -> Promise<void>      (optional)

use crate::error::{CoreError, CoreResult};
use crate::models::ProviderKind;
use crate::wallet::{LoginOutcome, LoginRequest, SignRequest, WalletBridge};
use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use log::debug;
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

pub struct JsWalletBridge {
    handler: JsValue,
}

impl JsWalletBridge {
    pub fn new(handler: JsValue) -> CoreResult<Self> {
        if !handler.is_object() {
            return Err(CoreError::InvalidInput(
                "Wallet handler must be an object".to_string(),
            ));
        }
        Ok(Self { handler })
    }

    fn method(&self, name: &str) -> Option<Function> {
        Reflect::get(&self.handler, &JsValue::from_str(name))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }

    /// Call `name` on the handler and await the result if it is a promise.
    async fn invoke(&self, function: &Function, args: &[JsValue]) -> Result<JsValue, String> {
        let result = match args {
            [] => function.call0(&self.handler),
            [a] => function.call1(&self.handler, a),
            [a, b, ..] => function.call2(&self.handler, a, b),
        }
        .map_err(|e| js_error_message(&e))?;
        if result.is_instance_of::<Promise>() {
            JsFuture::from(Promise::from(result))
                .await
                .map_err(|e| js_error_message(&e))
        } else {
            Ok(result)
        }
    }
}

fn to_js<T: Serialize>(value: &T) -> CoreResult<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| CoreError::InvalidInput(format!("Failed to convert request: {}", e)))
}

fn js_error_message(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            Reflect::get(err, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", err))
}

#[async_trait(?Send)]
impl WalletBridge for JsWalletBridge {
    async fn login(&self, request: &LoginRequest) -> CoreResult<Option<LoginOutcome>> {
        let login = self
            .method("login")
            .ok_or_else(|| CoreError::Connection("Wallet handler has no login()".to_string()))?;
        let result = self
            .invoke(&login, &[to_js(request)?])
            .await
            .map_err(CoreError::Connection)?;
        if result.is_null() || result.is_undefined() {
            return Ok(None);
        }
        if let Some(address) = result.as_string() {
            return Ok(Some(LoginOutcome {
                address,
                signature: None,
            }));
        }
        serde_wasm_bindgen::from_value(result)
            .map(Some)
            .map_err(|e| CoreError::Connection(format!("Unexpected login result: {}", e)))
    }

    async fn resume(&self, kind: ProviderKind, address: &str) -> CoreResult<bool> {
        let Some(resume) = self.method("resume") else {
            debug!("Wallet handler has no resume(); trusting stored session");
            return Ok(true);
        };
        let result = self
            .invoke(&resume, &[JsValue::from_str(kind.as_str()), JsValue::from_str(address)])
            .await
            .map_err(CoreError::Connection)?;
        Ok(result.is_truthy())
    }

    async fn sign_transaction(&self, request: &SignRequest) -> CoreResult<String> {
        let sign = self.method("signTransaction").ok_or_else(|| {
            CoreError::Transaction("Wallet handler has no signTransaction()".to_string())
        })?;
        let result = self
            .invoke(&sign, &[to_js(request)?])
            .await
            .map_err(CoreError::Transaction)?;
        result
            .as_string()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CoreError::Transaction("Wallet returned no signature".to_string()))
    }

    async fn logout(&self) -> CoreResult<()> {
        if let Some(logout) = self.method("logout") {
            self.invoke(&logout, &[])
                .await
                .map_err(CoreError::Connection)?;
        }
        Ok(())
    }
}
