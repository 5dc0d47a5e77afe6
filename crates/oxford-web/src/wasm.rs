#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the DesktopRunner.
//!
//! This module wraps [`super::runner_core::RunnerCore`] with JS-friendly types.
//! Only compiled on `wasm32` targets.

use js_sys::{Array, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::runner_core::RunnerCore;
use super::storage::{WebStorage, WebStore};

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!("panic at {}:{}:{}: {info}", loc.file(), loc.line(), loc.column())
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn json_or_error(result: Result<String, serde_json::Error>) -> Result<String, JsValue> {
    result.map_err(|err| JsValue::from_str(&err.to_string()))
}

#[wasm_bindgen]
pub struct DesktopRunner {
    inner: RunnerCore,
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

#[wasm_bindgen]
impl DesktopRunner {
    /// `seed` drives every scripted random choice; `epoch_ms` and
    /// `offset_minutes` anchor the wall clock (`Date.now()` and
    /// `-getTimezoneOffset()`).
    #[wasm_bindgen(constructor)]
    pub fn new(width: i32, height: i32, seed: f64, epoch_ms: f64, offset_minutes: i32, config_json: &str) -> Self {
        install_panic_hook();
        let seed = if seed.is_finite() && seed >= 0.0 { seed as u64 } else { 0 };
        let epoch_ms = if epoch_ms.is_finite() { epoch_ms as i64 } else { 0 };
        let mut inner = RunnerCore::new(width, height, seed, epoch_ms, offset_minutes, config_json);
        inner.set_storage(
            Box::new(WebStorage::new(WebStore::Session)),
            Box::new(WebStorage::new(WebStore::Local)),
        );
        Self { inner }
    }

    /// Show the sign-in screen, or the desktop on later loads this session.
    pub fn boot(&mut self) -> bool {
        self.inner.boot()
    }

    /// Advance the host clock by `dt_ms` milliseconds.
    #[wasm_bindgen(js_name = advanceTime)]
    pub fn advance_time(&mut self, dt_ms: f64) {
        self.inner.advance_time_ms(dt_ms);
    }

    /// Advance by the real time since the previous call (animation frame
    /// driven hosts).
    #[wasm_bindgen(js_name = tickNow)]
    pub fn tick_now(&mut self) {
        self.inner.advance_real_time();
    }

    /// Parse a JSON-encoded host command and apply it.
    /// Returns `true` if applied, `false` if malformed or rejected.
    #[wasm_bindgen(js_name = pushEncodedCommand)]
    pub fn push_encoded_command(&mut self, json: &str) -> bool {
        self.inner.push_encoded_command(json)
    }

    /// Full view model as a JSON string.
    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        json_or_error(self.inner.snapshot_json())
    }

    /// Drain queued effects as a JSON array string.
    #[wasm_bindgen(js_name = takeEffectsJson)]
    pub fn take_effects_json(&mut self) -> Result<String, JsValue> {
        json_or_error(self.inner.take_effects_json())
    }

    /// Drain pointer capture results as a JSON array string.
    #[wasm_bindgen(js_name = takePointerResultsJson)]
    pub fn take_pointer_results_json(&mut self) -> Result<String, JsValue> {
        json_or_error(self.inner.take_pointer_results_json())
    }

    /// Drain captured log lines.
    #[wasm_bindgen(js_name = takeLogs)]
    pub fn take_logs(&mut self) -> Array {
        let arr = Array::new();
        for line in self.inner.take_logs() {
            arr.push(&JsValue::from_str(&line));
        }
        arr
    }
}
