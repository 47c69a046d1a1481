//! # uar-core
//!
//! **Tier 5 (Entry-Point Façade)**
//!
//! Wires every lower-tier crate into the three operations a caller sees
//! (spec.md §4.9, §6): `parse_sot`, `load_sot_index`, `parse_satellite`.
//! [`Engine`] is a plain value — one instance per worker, per the
//! concurrency model in spec.md §5 — rather than a mutable global slot.

pub mod ffi;

use uar_columnmap::apply_column_map;
use uar_conflict::detect_conflicts;
use uar_index::{build_index, deserialize_index, serialize_index};
use uar_match::{classify, CascadeOutcome};
use uar_normalize::{build_satellite_record, build_sot_record};
use uar_risk::{score_matched, score_orphan, RiskConfig};
use uar_types::{
    ColumnMap, EngineError, IndexStats, JoinResult, JoinStats, MatchType, MatchedRecord,
    OrphanRecord, SoTIndex, SoTRecord,
};

/// The result of a successful `parse_sot` call (spec.md §6): aggregate
/// statistics plus the wire payload for `load_sot_index` on another
/// instance.
#[derive(Debug, Clone)]
pub struct SotLoadOutcome {
    pub stats: IndexStats,
    pub serialized_index: String,
}

/// One engine instance. Owns at most one SoT index at a time; a second
/// `parse_sot`/`load_sot_index` call replaces it outright (spec.md §5).
pub struct Engine {
    index: Option<SoTIndex>,
    risk_config: RiskConfig,
}

impl Engine {
    /// `processing_time_millis` anchors dormancy scoring for every
    /// `parse_satellite` call this instance makes; the façade in spec.md
    /// §6 omits it as an explicit call argument, so it is fixed once at
    /// construction (see DESIGN.md for this Open Question's resolution).
    pub fn new(processing_time_millis: i64) -> Self {
        Self {
            index: None,
            risk_config: RiskConfig::new(processing_time_millis),
        }
    }

    /// Overrides the default dormancy threshold / privileged-keyword set.
    pub fn with_risk_config(mut self, risk_config: RiskConfig) -> Self {
        self.risk_config = risk_config;
        self
    }

    fn build_sot_records(csv_bytes: &[u8], column_map_spec: &str) -> Result<Vec<SoTRecord>, EngineError> {
        let (text, _encoding) = uar_encoding::decode_to_utf8(csv_bytes);
        let parsed = uar_csv::parse_csv(&text)?;
        let column_map = ColumnMap::from_json(column_map_spec);

        Ok(parsed
            .rows
            .iter()
            .map(|row| {
                let values = apply_column_map(row, &parsed.headers, &column_map);
                build_sot_record(row, &values)
            })
            .collect())
    }

    /// `parse_sot(csv_bytes, column_map_spec) → { stats, serialized_index }`
    /// (spec.md §4.9, §6). Replaces any previously loaded index.
    pub fn parse_sot(&mut self, csv_bytes: &[u8], column_map_spec: &str) -> Result<SotLoadOutcome, EngineError> {
        let records = Self::build_sot_records(csv_bytes, column_map_spec)?;
        let index = build_index(records);
        let stats = index.stats.clone();
        let serialized_index = serialize_index(&index);
        self.index = Some(index);
        Ok(SotLoadOutcome { stats, serialized_index })
    }

    /// `load_sot_index(serialized) → Ok | Error` (spec.md §4.9, §6).
    /// Replaces any previously loaded index.
    pub fn load_sot_index(&mut self, serialized: &str) -> Result<(), EngineError> {
        self.index = Some(deserialize_index(serialized)?);
        Ok(())
    }

    /// `parse_satellite(csv_bytes, system_name, column_map_spec) → JoinResult | Error`
    /// (spec.md §4.9, §6). Fails with [`EngineError::PreconditionIndex`]
    /// unless `parse_sot`/`load_sot_index` already succeeded on this
    /// instance.
    pub fn parse_satellite(
        &self,
        csv_bytes: &[u8],
        system_name: &str,
        column_map_spec: &str,
    ) -> Result<JoinResult, EngineError> {
        let index = self.index.as_ref().ok_or(EngineError::PreconditionIndex)?;

        let (text, _encoding) = uar_encoding::decode_to_utf8(csv_bytes);
        let parsed = uar_csv::parse_csv(&text)?;
        let column_map = ColumnMap::from_json(column_map_spec);

        let mut matched = Vec::new();
        let mut orphans = Vec::new();
        let mut stats = JoinStats::default();

        for (i, row) in parsed.rows.iter().enumerate() {
            let source_row = (i + 1) as u64;
            let values = apply_column_map(row, &parsed.headers, &column_map);
            let satellite = build_satellite_record(row, &values, system_name, source_row);
            stats.total_processed += 1;

            match classify(index, &satellite) {
                CascadeOutcome::Matched { sot, match_type } => {
                    match match_type {
                        MatchType::ExactEmail => stats.exact_email += 1,
                        MatchType::ExactId => stats.exact_id += 1,
                        MatchType::FuzzyName => stats.fuzzy_name += 1,
                        MatchType::FuzzyAmbiguous => stats.fuzzy_ambiguous += 1,
                        MatchType::Orphan | MatchType::NoAccess => {}
                    }
                    let conflicts = detect_conflicts(&sot, &satellite);
                    let risk = score_matched(&sot, &satellite, match_type, &self.risk_config);
                    matched.push(MatchedRecord {
                        sot,
                        satellite,
                        match_type,
                        conflicts,
                        risk,
                    });
                }
                CascadeOutcome::Orphan { attempted_keys } => {
                    stats.orphans += 1;
                    orphans.push(OrphanRecord {
                        satellite,
                        attempted_keys,
                        risk: score_orphan(),
                    });
                }
            }
        }

        Ok(JoinResult {
            matched,
            orphans,
            stats,
            warnings: parsed.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOT_CSV: &str = "email,employeeId,displayName,employmentStatus\nalice@acme.com,E1,Alice Smith,active\nbob@acme.com,E2,Bob Jones,terminated\n";

    #[test]
    fn scenario_a_exact_email_clean_match() {
        let mut engine = Engine::new(1_700_000_000_000);
        engine.parse_sot(SOT_CSV.as_bytes(), "").unwrap();

        let satellite_csv = "email,role,accountStatus,lastLogin\nAlice@acme.com,Engineer,active,2025-01-01\n";
        let result = engine.parse_satellite(satellite_csv.as_bytes(), "okta", "").unwrap();

        assert_eq!(result.matched.len(), 1);
        assert!(result.orphans.is_empty());
        assert_eq!(result.matched[0].match_type, MatchType::ExactEmail);
        assert_eq!(result.matched[0].risk.score, 0);
        assert!(result.matched[0].conflicts.is_empty());
    }

    #[test]
    fn scenario_b_terminated_with_active_access_is_critical() {
        let mut engine = Engine::new(1_700_000_000_000);
        engine.parse_sot(SOT_CSV.as_bytes(), "").unwrap();

        let satellite_csv = "email,accountStatus\nbob@acme.com,active\n";
        let result = engine.parse_satellite(satellite_csv.as_bytes(), "okta", "").unwrap();

        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.matched[0].match_type, MatchType::ExactEmail);
        assert_eq!(result.matched[0].risk.score, 100);
    }

    #[test]
    fn parse_satellite_without_loaded_index_fails_precondition() {
        let engine = Engine::new(1_700_000_000_000);
        let err = engine.parse_satellite(b"email\na@x.com\n", "okta", "").unwrap_err();
        assert_eq!(err, EngineError::PreconditionIndex);
    }

    #[test]
    fn load_sot_index_round_trips_from_parse_sot_output() {
        let mut producer = Engine::new(1_700_000_000_000);
        let outcome = producer.parse_sot(SOT_CSV.as_bytes(), "").unwrap();

        let mut consumer = Engine::new(1_700_000_000_000);
        consumer.load_sot_index(&outcome.serialized_index).unwrap();

        let satellite_csv = "email,accountStatus\nalice@acme.com,active\n";
        let result = consumer.parse_satellite(satellite_csv.as_bytes(), "okta", "").unwrap();
        assert_eq!(result.matched.len(), 1);
    }

    #[test]
    fn second_parse_sot_call_replaces_the_index() {
        let mut engine = Engine::new(1_700_000_000_000);
        engine.parse_sot(SOT_CSV.as_bytes(), "").unwrap();
        engine
            .parse_sot(b"email,employeeId,displayName\ncarol@acme.com,E9,Carol Day\n", "")
            .unwrap();

        let satellite_csv = "email,accountStatus\nalice@acme.com,active\n";
        let result = engine.parse_satellite(satellite_csv.as_bytes(), "okta", "").unwrap();
        assert_eq!(result.orphans.len(), 1);
    }
}
