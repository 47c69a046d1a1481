//! # uar-types
//!
//! **Tier 0 (Core Types)**
//!
//! Data structures and wire contracts shared by every crate in the
//! identity resolution / risk-scoring engine. Contains no parsing, no
//! matching logic, and no I/O.
//!
//! ## What belongs here
//! * Pure data structs (records, index, join results)
//! * Serialization contracts (`serde`)
//! * The engine-wide error taxonomy
//!
//! ## What does NOT belong here
//! * CSV/encoding parsing
//! * Matching or scoring algorithms
//! * Anything that touches bytes off the wire

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Schema version stamped into a serialized [`SoTIndex`] and into every
/// [`ResultEnvelope`]. Bump when a wire-breaking change is made to any
/// type in this crate.
pub const SCHEMA_VERSION: u32 = 1;

/// The fixed resolution string used by the conflict detector (§4.7):
/// the authoritative (SoT) side always wins.
pub const RESOLUTION_SOT_WINS: &str = "sot_wins";

/// An ordered sequence of `(header, value)` pairs produced by the CSV
/// parser for a single data row. Header order is significant for
/// admin-field collection; value order is not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Returns the value for the first occurrence of `header` (case-sensitive,
    /// already-trimmed headers are expected).
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }
}

/// A single `{ source_headers, separator, target_field }` concatenation
/// rule (§3, `ColumnMap`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcatRule {
    pub source_headers: Vec<String>,
    pub separator: String,
    pub target_field: String,
}

/// User-supplied or auto-inferred column mapping configuration (§3, §4.3).
///
/// `direct` maps a source CSV header to a canonical field name.
/// `concat` entries synthesize a canonical field from several source
/// headers joined by `separator`, skipping empty sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub direct: Vec<(String, String)>,
    pub concat: Vec<ConcatRule>,
}

impl ColumnMap {
    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.concat.is_empty()
    }

    /// Parses a `column_map_spec` boundary string (§6). An empty string
    /// or unparseable JSON is accepted and treated as "use inference".
    pub fn from_json(spec: &str) -> ColumnMap {
        if spec.trim().is_empty() {
            return ColumnMap::default();
        }
        serde_json::from_str(spec).unwrap_or_default()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Canonical identity record sourced from the authoritative roster (§3).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoTRecord {
    pub canonical_id: String,
    pub employee_id: String,
    pub display_name: String,
    pub email: String,
    pub department: String,
    pub manager: String,
    pub employment_status: String,
    pub normalized_name: String,
    pub admin_info: String,
}

/// Observed access record sourced from a downstream (satellite) system (§3).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatelliteRecord {
    pub email: String,
    pub user_id: String,
    pub display_name: String,
    pub role: String,
    pub entitlement: String,
    pub last_login: String,
    pub account_status: String,
    /// Supplemental field (SPEC_FULL §4.7): wired into the conflict
    /// detector symmetrically with `SoTRecord::department` once both
    /// sides carry a value.
    pub department: String,
    pub manager: String,
    pub source_file: String,
    pub source_row: u64,
}

/// Aggregate statistics computed while building a [`SoTIndex`] (§4.5).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_records: usize,
    pub active: usize,
    pub terminated: usize,
    pub unique_emails: usize,
}

/// Three-way lookup over the SoT roster plus the statistics computed
/// while it was built (§3, §4.5).
///
/// Construction is append-only and the index is immutable afterwards;
/// matched results hold `Arc<SoTRecord>` so they can outlive a single
/// borrow of the index and cross an FFI/wasm boundary as owned data.
#[derive(Debug, Clone, Default)]
pub struct SoTIndex {
    pub by_email: std::collections::HashMap<String, Arc<SoTRecord>>,
    pub by_employee_id: std::collections::HashMap<String, Arc<SoTRecord>>,
    pub by_name: std::collections::HashMap<String, Vec<Arc<SoTRecord>>>,
    pub stats: IndexStats,
    /// Insertion-order record list; the canonical serialization payload.
    pub records: Vec<Arc<SoTRecord>>,
}

/// Classification of how (or whether) a satellite row was tied to a SoT
/// row (§3, §4.6, §6). Serializes verbatim to the strings mandated by
/// the bit-exact compatibility note in spec.md §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    ExactEmail,
    ExactId,
    FuzzyName,
    FuzzyAmbiguous,
    Orphan,
    /// Emitted only by the external report-merge collaborator, never by
    /// this engine (spec.md §6); kept here so the full stable string
    /// set lives in one place.
    NoAccess,
}

impl MatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::ExactEmail => "exact_email",
            MatchType::ExactId => "exact_id",
            MatchType::FuzzyName => "fuzzy_name",
            MatchType::FuzzyAmbiguous => "fuzzy_ambiguous",
            MatchType::Orphan => "orphan",
            MatchType::NoAccess => "no_access",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level divergence between SoT and satellite (§4.7).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub field: String,
    pub sot_value: String,
    pub satellite_value: String,
    pub resolution: String,
}

impl Conflict {
    pub fn sot_wins(field: impl Into<String>, sot_value: impl Into<String>, satellite_value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            sot_value: sot_value.into(),
            satellite_value: satellite_value.into(),
            resolution: RESOLUTION_SOT_WINS.to_string(),
        }
    }
}

/// Risk level assigned by the scorer (§4.8). Serializes as the
/// uppercase names mandated by §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Info => "INFO",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-scored outcome for one matched satellite row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub score: u32,
}

/// A satellite row successfully tied to a SoT record (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedRecord {
    pub sot: Arc<SoTRecord>,
    pub satellite: SatelliteRecord,
    pub match_type: MatchType,
    pub conflicts: Vec<Conflict>,
    pub risk: RiskAssessment,
}

/// A satellite row with no SoT match on any cascade level (§3, §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrphanRecord {
    pub satellite: SatelliteRecord,
    pub attempted_keys: Vec<String>,
    pub risk: RiskAssessment,
}

/// Per-satellite-file join counters (§3, §4.6).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinStats {
    pub total_processed: usize,
    pub exact_email: usize,
    pub exact_id: usize,
    pub fuzzy_name: usize,
    pub fuzzy_ambiguous: usize,
    pub orphans: usize,
}

/// Per-satellite-file output of the join cascade (§3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinResult {
    pub matched: Vec<MatchedRecord>,
    pub orphans: Vec<OrphanRecord>,
    pub stats: JoinStats,
    pub warnings: Vec<ParseWarning>,
}

/// A non-fatal parser warning (§4.2, §7): mismatched column counts or a
/// skipped unreadable row. Never raised as an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    pub row: u64,
    pub message: String,
}

impl ParseWarning {
    pub fn new(row: u64, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }
}

/// The engine-wide error taxonomy (§7). `Display` strings are the
/// stable identifiers a caller surfaces verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum EngineError {
    #[error("EmptyFile")]
    EmptyFile,
    #[error("NoDataRows")]
    NoDataRows,
    #[error("HeaderRead")]
    HeaderRead,
    #[error("EncodingDecode")]
    EncodingDecode,
    #[error("DeserializeIndex")]
    DeserializeIndex,
    #[error("PreconditionIndex")]
    PreconditionIndex,
    #[error("ArgumentCount")]
    ArgumentCount,
}

/// Success/failure envelope for an entry-point operation (§6):
/// `{ ok, data, error }`. Grounded on the teacher's
/// `tokmd-ffi-envelope` response-envelope convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEnvelope<T> {
    pub ok: bool,
    pub schema_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ResultEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            schema_version: SCHEMA_VERSION,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(err: impl std::fmt::Display) -> Self {
        Self {
            ok: false,
            schema_version: SCHEMA_VERSION,
            data: None,
            error: Some(err.to_string()),
        }
    }

    pub fn from_result(result: Result<T, EngineError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(err),
        }
    }
}
