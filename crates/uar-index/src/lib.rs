//! # uar-index
//!
//! **Tier 3 (SoT Index)**
//!
//! Builds the three-way in-memory lookup over the SoT roster plus
//! its aggregate statistics, and defines the serialization contract
//! that lets a built index be shipped to an isolated worker instance
//! (spec.md §4.5).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use uar_types::{EngineError, IndexStats, SoTIndex, SoTRecord, SCHEMA_VERSION};

/// Builds a [`SoTIndex`] from an ordered sequence of [`SoTRecord`]s
/// (spec.md §4.5). First occurrence wins for `by_email` and
/// `by_employee_id`; `by_name` preserves insertion order and allows
/// duplicates.
pub fn build_index(records: Vec<SoTRecord>) -> SoTIndex {
    let mut index = SoTIndex::default();

    for record in records {
        let record = Arc::new(record);

        if !record.email.is_empty() {
            index
                .by_email
                .entry(record.email.clone())
                .or_insert_with(|| record.clone());
        }
        if !record.employee_id.is_empty() {
            index
                .by_employee_id
                .entry(record.employee_id.clone())
                .or_insert_with(|| record.clone());
        }
        if !record.normalized_name.is_empty() {
            index
                .by_name
                .entry(record.normalized_name.clone())
                .or_default()
                .push(record.clone());
        }

        index.stats.total_records += 1;
        if record.employment_status == "terminated" {
            index.stats.terminated += 1;
        } else {
            index.stats.active += 1;
        }

        index.records.push(record);
    }

    index.stats.unique_emails = index.by_email.len();
    index
}

/// Wire format for [`SoTIndex`] (spec.md §4.5's serialization
/// contract): the insertion-order record list plus the stats computed
/// at build time. Rehydration rebuilds the three lookup maps so that
/// lookup behavior and order match the original exactly (I1).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SerializedIndex {
    schema_version: u32,
    records: Vec<SoTRecord>,
    stats: IndexStats,
}

/// Serializes an index to the canonical JSON wire format.
pub fn serialize_index(index: &SoTIndex) -> String {
    let payload = SerializedIndex {
        schema_version: SCHEMA_VERSION,
        records: index.records.iter().map(|r| (**r).clone()).collect(),
        stats: index.stats.clone(),
    };
    serde_json::to_string(&payload).expect("SoTIndex serialization is infallible")
}

/// Deserializes an index previously produced by [`serialize_index`].
/// Rebuilds the maps from the record list rather than trusting the
/// embedded stats for anything but a post-hoc equality check, so a
/// tampered-with-but-structurally-valid payload still yields a
/// consistent index.
pub fn deserialize_index(payload: &str) -> Result<SoTIndex, EngineError> {
    let parsed: SerializedIndex =
        serde_json::from_str(payload).map_err(|_| EngineError::DeserializeIndex)?;
    Ok(build_index(parsed.records))
}
