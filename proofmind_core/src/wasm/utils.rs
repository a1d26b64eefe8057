// WASM utility functions

use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

/// Sleep using the browser's setTimeout. Resolves immediately when there is
/// no window to schedule on.
pub async fn sleep_ms(milliseconds: u64) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window().map(|window| {
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    &resolve,
                    milliseconds.min(i32::MAX as u64) as i32,
                )
                .is_ok()
        });
        if scheduled != Some(true) {
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    let _ = JsFuture::from(promise).await;
}
