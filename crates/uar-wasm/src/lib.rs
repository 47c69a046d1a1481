//! wasm-bindgen bindings for [`uar_core::Engine`].
//!
//! One instance per worker, per spec.md §5: `WasmEngine::new` allocates
//! a fresh engine, and every operation funnels through `uar-core`'s JSON
//! envelope layer so the host never needs generated glue for Rust enums.

use wasm_bindgen::prelude::*;

use uar_core::{ffi, Engine};

#[wasm_bindgen]
pub struct WasmEngine {
    inner: Engine,
}

#[wasm_bindgen]
impl WasmEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(processing_time_millis: f64) -> WasmEngine {
        WasmEngine {
            inner: Engine::new(processing_time_millis as i64),
        }
    }

    /// `args_json`: `{"csv": "...", "column_map": "..."}`. Returns a
    /// `{ok, schema_version, data, error}` envelope as a JSON string.
    #[wasm_bindgen(js_name = parseSot)]
    pub fn parse_sot(&mut self, args_json: &str) -> String {
        ffi::parse_sot_json(&mut self.inner, args_json)
    }

    /// `args_json`: `{"serialized": "..."}`.
    #[wasm_bindgen(js_name = loadSotIndex)]
    pub fn load_sot_index(&mut self, args_json: &str) -> String {
        ffi::load_sot_index_json(&mut self.inner, args_json)
    }

    /// `args_json`: `{"csv": "...", "system_name": "...", "column_map": "..."}`.
    #[wasm_bindgen(js_name = parseSatellite)]
    pub fn parse_satellite(&self, args_json: &str) -> String {
        ffi::parse_satellite_json(&self.inner, args_json)
    }
}

/// Schema version stamped into every envelope, exposed so a host can
/// check compatibility before sending a `serialized_index` across
/// instances.
#[wasm_bindgen(js_name = schemaVersion)]
pub fn schema_version() -> u32 {
    uar_types::SCHEMA_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_version_matches_uar_types() {
        assert_eq!(schema_version(), uar_types::SCHEMA_VERSION);
    }
}
