//! # uar-match
//!
//! **Tier 4 (Join Cascade)**
//!
//! Classifies a satellite record against a built [`SoTIndex`] using the
//! exact-email → exact-id → fuzzy-name cascade (spec.md §4.6), short
//! -circuiting at the first success.

use std::sync::Arc;

use uar_normalize::normalize_name;
use uar_types::{MatchType, SatelliteRecord, SoTIndex, SoTRecord};

/// Fuzzy match threshold `T`.
pub const MATCH_THRESHOLD: f64 = 0.85;
/// Ambiguity gap `G` required between the best and second-best score.
pub const AMBIGUITY_GAP: f64 = 0.10;
/// Unscored-cap `M`: an exact normalized-name bucket larger than this
/// short-circuits straight to an unscored ambiguous match.
pub const UNSCORED_CAP: usize = 10;

/// Outcome of running the cascade for a single satellite record.
pub enum CascadeOutcome {
    Matched {
        sot: Arc<SoTRecord>,
        match_type: MatchType,
    },
    Orphan {
        attempted_keys: Vec<String>,
    },
}

/// Similarity score in `[0, 1]`: `1 - levenshtein(a, b) / max(|a|, |b|)`
/// over code points (spec.md §4.6). Equal strings (including both
/// empty) score `1.0`.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let max_len = len_a.max(len_b);
    if max_len == 0 {
        return 1.0;
    }
    let distance = strsim::levenshtein(a, b) as f64;
    1.0 - distance / max_len as f64
}

fn resolve_ranked(mut scored: Vec<(f64, Arc<SoTRecord>)>) -> Option<(Arc<SoTRecord>, MatchType)> {
    // Stable descending sort: ties keep the candidates' original
    // (insertion or sorted-traversal) relative order, per the
    // determinism rule in spec.md §4.6.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let top = scored[0].0;
    if top < MATCH_THRESHOLD {
        return None;
    }
    if scored.len() == 1 {
        return Some((scored[0].1.clone(), MatchType::FuzzyName));
    }
    let second = scored[1].0;
    if top - second >= AMBIGUITY_GAP {
        Some((scored[0].1.clone(), MatchType::FuzzyName))
    } else {
        Some((scored[0].1.clone(), MatchType::FuzzyAmbiguous))
    }
}

fn resolve_exact_key_hit(bucket: &[Arc<SoTRecord>], norm: &str) -> Option<(Arc<SoTRecord>, MatchType)> {
    if bucket.len() > UNSCORED_CAP {
        return Some((bucket[0].clone(), MatchType::FuzzyAmbiguous));
    }
    if bucket.len() == 1 {
        let score = similarity(norm, &bucket[0].normalized_name);
        if score >= MATCH_THRESHOLD {
            return Some((bucket[0].clone(), MatchType::FuzzyName));
        }
        return None;
    }
    let scored = bucket
        .iter()
        .map(|r| (similarity(norm, &r.normalized_name), r.clone()))
        .collect();
    resolve_ranked(scored)
}

fn resolve_broad_search(index: &SoTIndex, norm: &str) -> Option<(Arc<SoTRecord>, MatchType)> {
    let mut keys: Vec<&String> = index.by_name.keys().collect();
    keys.sort();

    let mut scored: Vec<(f64, Arc<SoTRecord>)> = Vec::new();
    for key in keys {
        let score = similarity(norm, key);
        if score >= MATCH_THRESHOLD {
            for record in &index.by_name[key] {
                scored.push((score, record.clone()));
            }
        }
    }
    if scored.is_empty() {
        return None;
    }
    resolve_ranked(scored)
}

fn fuzzy_match(index: &SoTIndex, norm: &str) -> Option<(Arc<SoTRecord>, MatchType)> {
    if let Some(bucket) = index.by_name.get(norm) {
        return resolve_exact_key_hit(bucket, norm);
    }
    resolve_broad_search(index, norm)
}

/// Runs the full cascade for one satellite record (spec.md §4.6).
pub fn classify(index: &SoTIndex, sat: &SatelliteRecord) -> CascadeOutcome {
    if !sat.email.is_empty() {
        if let Some(rec) = index.by_email.get(&sat.email) {
            return CascadeOutcome::Matched {
                sot: rec.clone(),
                match_type: MatchType::ExactEmail,
            };
        }
    }

    if !sat.user_id.is_empty() {
        if let Some(rec) = index.by_employee_id.get(&sat.user_id) {
            return CascadeOutcome::Matched {
                sot: rec.clone(),
                match_type: MatchType::ExactId,
            };
        }
    }

    let normalized_display_name = if sat.display_name.is_empty() {
        String::new()
    } else {
        normalize_name(&sat.display_name)
    };

    if !sat.display_name.is_empty() {
        if let Some((rec, match_type)) = fuzzy_match(index, &normalized_display_name) {
            return CascadeOutcome::Matched { sot: rec, match_type };
        }
    }

    let mut attempted_keys = Vec::new();
    if !sat.email.is_empty() {
        attempted_keys.push(format!("email:{}", sat.email));
    }
    if !sat.user_id.is_empty() {
        attempted_keys.push(format!("employeeId:{}", sat.user_id));
    }
    if !sat.display_name.is_empty() {
        attempted_keys.push(format!("name:{normalized_display_name}"));
    }

    CascadeOutcome::Orphan { attempted_keys }
}
