#![forbid(unsafe_code)]

//! WASM host runner for the Oxford Online desktop.
//!
//! This crate provides [`DesktopRunner`], a `wasm-bindgen`-exported struct
//! that wraps `oxford_apps::Desktop` and exposes it to JavaScript for
//! host-driven execution. The host feeds JSON commands and clock ticks,
//! renders from the JSON snapshot and performs the drained effects.

#[cfg(target_arch = "wasm32")]
mod storage;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::DesktopRunner;

// Runner core is used by the wasm module and by native tests.
#[cfg(any(target_arch = "wasm32", test))]
mod runner_core;
