//! # uar-risk
//!
//! **Tier 4 (Risk Scorer)**
//!
//! Assigns a [`RiskAssessment`] to a matched pair or an orphan, following
//! the rule table in spec.md §4.8. Every applicable rule is evaluated and
//! the highest-scoring one wins, except the two named short-circuits
//! (orphan, terminated-with-active-access).

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use uar_types::{MatchType, RiskAssessment, RiskLevel, SatelliteRecord, SoTRecord};

/// Default dormancy threshold in days (spec.md §4.8).
pub const DEFAULT_DORMANCY_THRESHOLD_DAYS: i64 = 90;

/// Default privileged-keyword set (spec.md §4.8).
pub const DEFAULT_PRIVILEGED_KEYWORDS: &[&str] = &[
    "admin",
    "root",
    "superuser",
    "owner",
    "global_admin",
    "domain_admin",
    "system",
    "privileged",
];

const ACTIVE_ACCOUNT_STATUSES: &[&str] = &["active", "enabled", ""];

/// Fixed ordered list of accepted `last_login` formats (spec.md §4.8).
/// Tried in order; the first successful parse wins.
fn parse_last_login(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive_formats = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
    ];
    for fmt in naive_formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Utc.from_local_datetime(&naive).single();
        }
    }

    let date_formats = ["%Y-%m-%d", "%m/%d/%Y", "%d %b %Y", "%b %d, %Y", "%b %d %Y"];
    for fmt in date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Utc.from_local_datetime(&naive).single();
        }
    }

    None
}

fn is_dormant(last_login: &str, processing_time_millis: i64, threshold_days: i64) -> bool {
    let Some(parsed) = parse_last_login(last_login) else {
        return false;
    };
    let threshold_millis = threshold_days * 24 * 60 * 60 * 1000;
    parsed.timestamp_millis() < processing_time_millis - threshold_millis
}

fn is_privileged(role: &str, entitlement: &str, keywords: &[&str]) -> bool {
    let role = role.to_lowercase();
    let entitlement = entitlement.to_lowercase();
    keywords
        .iter()
        .any(|kw| role.contains(&kw.to_lowercase()) || entitlement.contains(&kw.to_lowercase()))
}

/// Configuration for [`score`], defaulted to spec.md §4.8's values.
#[derive(Debug, Clone)]
pub struct RiskConfig {
    pub processing_time_millis: i64,
    pub dormancy_threshold_days: i64,
    pub privileged_keywords: Vec<String>,
}

impl RiskConfig {
    pub fn new(processing_time_millis: i64) -> Self {
        Self {
            processing_time_millis,
            dormancy_threshold_days: DEFAULT_DORMANCY_THRESHOLD_DAYS,
            privileged_keywords: DEFAULT_PRIVILEGED_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Scores an orphan record (no SoT match).
pub fn score_orphan() -> RiskAssessment {
    RiskAssessment {
        level: RiskLevel::High,
        score: 80,
    }
}

/// Scores a matched SoT/satellite pair (spec.md §4.8).
pub fn score_matched(
    sot: &SoTRecord,
    satellite: &SatelliteRecord,
    match_type: MatchType,
    config: &RiskConfig,
) -> RiskAssessment {
    if match_type == MatchType::Orphan {
        return score_orphan();
    }

    let terminated = sot.employment_status == "terminated";
    let active_access = ACTIVE_ACCOUNT_STATUSES.contains(&satellite.account_status.as_str());
    if terminated && active_access {
        return RiskAssessment {
            level: RiskLevel::Critical,
            score: 100,
        };
    }

    let keywords: Vec<&str> = config.privileged_keywords.iter().map(|s| s.as_str()).collect();
    let privileged = is_privileged(&satellite.role, &satellite.entitlement, &keywords);
    let dormant = is_dormant(
        &satellite.last_login,
        config.processing_time_millis,
        config.dormancy_threshold_days,
    );
    let contractor = sot.employment_status == "contractor";

    let mut candidates: Vec<(RiskLevel, u32)> = vec![(RiskLevel::Info, 0)];
    if privileged && dormant {
        candidates.push((RiskLevel::High, 80));
    }
    if dormant {
        candidates.push((RiskLevel::Medium, 50));
    }
    if privileged {
        candidates.push((RiskLevel::Medium, 50));
    }
    if contractor && privileged {
        candidates.push((RiskLevel::Medium, 50));
    }
    if match_type == MatchType::FuzzyAmbiguous {
        candidates.push((RiskLevel::Low, 20));
    }

    let (level, score) = candidates
        .into_iter()
        .max_by_key(|(_, score)| *score)
        .expect("candidates always contains the default entry");

    RiskAssessment { level, score }
}
