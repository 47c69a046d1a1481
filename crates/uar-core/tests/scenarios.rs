//! End-to-end scenarios run through a single `Engine` instance, covering
//! the full parse_sot -> parse_satellite pipeline.

use uar_core::Engine;
use uar_types::{MatchType, RiskLevel};

const PROCESSING_TIME_MILLIS: i64 = 1_738_368_000_000; // 2025-02-01T00:00:00Z

fn engine_with_sot(sot_csv: &str) -> Engine {
    let mut engine = Engine::new(PROCESSING_TIME_MILLIS);
    engine.parse_sot(sot_csv.as_bytes(), "").unwrap();
    engine
}

/// Scenario A — exact email match, clean.
#[test]
fn scenario_a_exact_email_match_clean() {
    let engine = engine_with_sot(
        "email,employeeId,displayName,employmentStatus\nalice@acme.com,E1,Alice Smith,active\n",
    );
    let satellite =
        "email,role,accountStatus,lastLogin\nAlice@acme.com,Engineer,active,2025-01-01\n";
    let result = engine.parse_satellite(satellite.as_bytes(), "okta", "").unwrap();

    assert_eq!(result.matched.len(), 1);
    assert!(result.orphans.is_empty());
    let m = &result.matched[0];
    assert_eq!(m.match_type, MatchType::ExactEmail);
    assert_eq!(m.risk.level, RiskLevel::Info);
    assert_eq!(m.risk.score, 0);
    assert!(m.conflicts.is_empty());
}

/// Scenario B — terminated with active access.
#[test]
fn scenario_b_terminated_with_active_access() {
    let engine = engine_with_sot("email,employmentStatus\nbob@acme.com,terminated\n");
    let satellite = "email,accountStatus\nbob@acme.com,active\n";
    let result = engine.parse_satellite(satellite.as_bytes(), "okta", "").unwrap();

    assert_eq!(result.matched.len(), 1);
    let m = &result.matched[0];
    assert_eq!(m.match_type, MatchType::ExactEmail);
    assert_eq!(m.risk.level, RiskLevel::Critical);
    assert_eq!(m.risk.score, 100);
}

/// Scenario C — fuzzy name, clear winner, diacritic stripped.
#[test]
fn scenario_c_fuzzy_name_clear_winner() {
    let engine = engine_with_sot(
        "employeeId,displayName\nE1,Thomas Muller\nE2,Lena Muller\n",
    );
    let satellite = "displayName\nThomas M\u{00fc}ller\n";
    let result = engine.parse_satellite(satellite.as_bytes(), "okta", "").unwrap();

    assert_eq!(result.matched.len(), 1);
    let m = &result.matched[0];
    assert_eq!(m.match_type, MatchType::FuzzyName);
    assert_eq!(m.sot.employee_id, "E1");
}

/// Scenario D — fuzzy ambiguous, tied scores.
#[test]
fn scenario_d_fuzzy_ambiguous() {
    let engine = engine_with_sot("employeeId,displayName\nE1,Chris Lee\nE2,Chris Lee\n");
    let satellite = "displayName\nChris Lee\n";
    let result = engine.parse_satellite(satellite.as_bytes(), "okta", "").unwrap();

    assert_eq!(result.matched.len(), 1);
    let m = &result.matched[0];
    assert_eq!(m.match_type, MatchType::FuzzyAmbiguous);
    assert_eq!(m.sot.employee_id, "E1");
    assert_eq!(m.risk.level, RiskLevel::Low);
    assert_eq!(m.risk.score, 20);
}

/// Scenario E — orphan, no match on any cascade level.
#[test]
fn scenario_e_orphan() {
    let engine = engine_with_sot("email,employeeId,displayName\nsomeone@acme.com,E1,Someone Real\n");
    let satellite = "email,userId,displayName\nghost@ext.com,GHOST,Nobody Known\n";
    let result = engine.parse_satellite(satellite.as_bytes(), "okta", "").unwrap();

    assert!(result.matched.is_empty());
    assert_eq!(result.orphans.len(), 1);
    let o = &result.orphans[0];
    assert_eq!(
        o.attempted_keys,
        vec![
            "email:ghost@ext.com".to_string(),
            "employeeId:GHOST".to_string(),
            "name:nobody known".to_string(),
        ]
    );
    assert_eq!(o.risk.level, RiskLevel::High);
    assert_eq!(o.risk.score, 80);
}

/// Scenario F — UTF-16-LE BOM + CR/LF + quoted comma.
#[test]
fn scenario_f_utf16_le_bom_with_quoted_comma() {
    let payload = "email,displayName\r\n\"smith, john\"@acme.com,\"Smith, John\"\r\n";
    let mut bytes: Vec<u8> = vec![0xFF, 0xFE];
    for unit in payload.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }

    let mut engine = Engine::new(PROCESSING_TIME_MILLIS);
    let outcome = engine.parse_sot(&bytes, "").unwrap();
    assert_eq!(outcome.stats.total_records, 1);

    let satellite = "email,displayName\n\"smith, john@acme.com\",Smith John\n";
    let result = engine.parse_satellite(satellite.as_bytes(), "okta", "").unwrap();
    assert_eq!(result.matched.len(), 1);
    assert_eq!(result.matched[0].match_type, MatchType::ExactEmail);
    assert_eq!(result.matched[0].sot.display_name, "Smith, John");
    assert_eq!(result.matched[0].sot.normalized_name, "john smith");
}

/// I6 — short-circuiting: an exact-email hit never touches the
/// fuzzy-name branch, verifiable by stats.
#[test]
fn i6_exact_email_short_circuits_stats() {
    let engine = engine_with_sot(
        "email,employeeId,displayName\nalice@acme.com,E1,Zzz Nomatch\n",
    );
    let satellite = "email,displayName\nalice@acme.com,Completely Different\n";
    let result = engine.parse_satellite(satellite.as_bytes(), "okta", "").unwrap();

    assert_eq!(result.stats.exact_email, 1);
    assert_eq!(result.stats.fuzzy_name, 0);
    assert_eq!(result.stats.fuzzy_ambiguous, 0);
}

/// I9 — an orphan never also appears in `matched`.
#[test]
fn i9_orphan_never_in_matched() {
    let engine = engine_with_sot("email,employeeId,displayName\nalice@acme.com,E1,Alice Smith\n");
    let satellite = "email,displayName\nnobody@elsewhere.com,Totally Unrelated\n";
    let result = engine.parse_satellite(satellite.as_bytes(), "okta", "").unwrap();

    assert!(result.matched.is_empty());
    assert_eq!(result.orphans.len(), 1);
}
