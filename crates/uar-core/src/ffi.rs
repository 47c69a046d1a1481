//! JSON entry point for language bindings.
//!
//! Mirrors the `{ok, data, error}` envelope convention (spec.md §6):
//! every operation returns a JSON string rather than a typed value, so a
//! host (wasm, FFI, subprocess) never needs to marshal Rust enums.

use serde::Serialize;
use serde_json::Value;

use uar_types::{EngineError, ResultEnvelope};

use crate::Engine;

fn envelope_json<T: Serialize>(result: Result<T, EngineError>) -> String {
    let envelope = ResultEnvelope::from_result(result);
    serde_json::to_string(&envelope).unwrap_or_else(|_| {
        r#"{"ok":false,"schema_version":1,"error":"EnvelopeSerialize"}"#.to_string()
    })
}

/// `parse_sot` over the JSON boundary. `args_json` is
/// `{"csv": "<utf8 text or already-decoded bytes as text>", "column_map": "<ColumnMap JSON or empty>"}`.
pub fn parse_sot_json(engine: &mut Engine, args_json: &str) -> String {
    let args: Value = match serde_json::from_str(args_json) {
        Ok(v) => v,
        Err(_) => return envelope_json::<()>(Err(EngineError::ArgumentCount)),
    };
    let Some(csv) = args.get("csv").and_then(|v| v.as_str()) else {
        return envelope_json::<()>(Err(EngineError::ArgumentCount));
    };
    let column_map = args.get("column_map").and_then(|v| v.as_str()).unwrap_or("");

    let result = engine.parse_sot(csv.as_bytes(), column_map).map(|outcome| {
        serde_json::json!({
            "stats": outcome.stats,
            "serialized_index": outcome.serialized_index,
        })
    });
    envelope_json(result)
}

/// `load_sot_index` over the JSON boundary. `args_json` is
/// `{"serialized": "<previously produced serialized_index>"}`.
pub fn load_sot_index_json(engine: &mut Engine, args_json: &str) -> String {
    let args: Value = match serde_json::from_str(args_json) {
        Ok(v) => v,
        Err(_) => return envelope_json::<()>(Err(EngineError::ArgumentCount)),
    };
    let Some(serialized) = args.get("serialized").and_then(|v| v.as_str()) else {
        return envelope_json::<()>(Err(EngineError::ArgumentCount));
    };

    envelope_json(engine.load_sot_index(serialized).map(|_| serde_json::json!({})))
}

/// `parse_satellite` over the JSON boundary. `args_json` is
/// `{"csv": "...", "system_name": "...", "column_map": "..."}`.
pub fn parse_satellite_json(engine: &Engine, args_json: &str) -> String {
    let args: Value = match serde_json::from_str(args_json) {
        Ok(v) => v,
        Err(_) => return envelope_json::<()>(Err(EngineError::ArgumentCount)),
    };
    let (Some(csv), Some(system_name)) = (
        args.get("csv").and_then(|v| v.as_str()),
        args.get("system_name").and_then(|v| v.as_str()),
    ) else {
        return envelope_json::<()>(Err(EngineError::ArgumentCount));
    };
    let column_map = args.get("column_map").and_then(|v| v.as_str()).unwrap_or("");

    envelope_json(engine.parse_satellite(csv.as_bytes(), system_name, column_map))
}

/// Single dispatch point keyed by operation name, for hosts that prefer
/// a uniform call shape over three distinct functions.
pub fn dispatch(engine: &mut Engine, op: &str, args_json: &str) -> String {
    match op {
        "parse_sot" => parse_sot_json(engine, args_json),
        "load_sot_index" => load_sot_index_json(engine, args_json),
        "parse_satellite" => parse_satellite_json(engine, args_json),
        _ => envelope_json::<()>(Err(EngineError::ArgumentCount)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOT_CSV: &str = "email,employeeId,displayName,employmentStatus\nalice@acme.com,E1,Alice Smith,active\n";

    #[test]
    fn parse_sot_json_round_trip() {
        let mut engine = Engine::new(1_700_000_000_000);
        let args = serde_json::json!({"csv": SOT_CSV}).to_string();
        let response = parse_sot_json(&mut engine, &args);
        let parsed: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(parsed["ok"], true);
        assert!(parsed["data"]["serialized_index"].is_string());
    }

    #[test]
    fn missing_csv_field_is_argument_count_error() {
        let mut engine = Engine::new(1_700_000_000_000);
        let response = parse_sot_json(&mut engine, "{}");
        let parsed: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(parsed["ok"], false);
        assert_eq!(parsed["error"], "ArgumentCount");
    }

    #[test]
    fn parse_satellite_before_index_load_is_precondition_error() {
        let engine = Engine::new(1_700_000_000_000);
        let args = serde_json::json!({"csv": "email\na@x.com\n", "system_name": "okta"}).to_string();
        let response = parse_satellite_json(&engine, &args);
        let parsed: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(parsed["ok"], false);
        assert_eq!(parsed["error"], "PreconditionIndex");
    }

    #[test]
    fn dispatch_routes_to_the_named_operation() {
        let mut engine = Engine::new(1_700_000_000_000);
        let args = serde_json::json!({"csv": SOT_CSV}).to_string();
        let response = dispatch(&mut engine, "parse_sot", &args);
        let parsed: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(parsed["ok"], true);
    }

    #[test]
    fn dispatch_with_unknown_op_is_argument_count_error() {
        let mut engine = Engine::new(1_700_000_000_000);
        let response = dispatch(&mut engine, "frobnicate", "{}");
        let parsed: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(parsed["ok"], false);
        assert_eq!(parsed["error"], "ArgumentCount");
    }
}
