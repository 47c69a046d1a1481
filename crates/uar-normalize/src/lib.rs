//! # uar-normalize
//!
//! **Tier 2 (Normalizer)**
//!
//! Builds canonical [`SoTRecord`]/[`SatelliteRecord`] values from a
//! [`RawRow`] plus the field map produced by `uar-columnmap`, and
//! implements the unicode-aware name-normalization key used by the
//! fuzzy join cascade (spec.md §4.4).

use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

use uar_columnmap::fields;
use uar_types::{RawRow, SatelliteRecord, SoTRecord};

const NAME_SUFFIXES: &[&str] = &[
    "jr", "sr", "ii", "iii", "iv", "v", "phd", "md", "dds", "esq", "cpa",
];

fn strip_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !unicode_normalization::char::is_combining_mark(*c)).collect()
}

fn strip_suffixes(s: &str) -> String {
    let mut current = s.to_string();
    loop {
        let mut stripped = None;
        for suffix in NAME_SUFFIXES {
            for sep in [" ", ", ", ","] {
                let pattern = format!("{sep}{suffix}");
                if current.ends_with(&pattern) {
                    stripped = Some(current[..current.len() - pattern.len()].to_string());
                    break;
                }
            }
            if stripped.is_some() {
                break;
            }
        }
        match stripped {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

fn is_initial_token(token: &str) -> bool {
    let stripped = token.strip_suffix('.').unwrap_or(token);
    stripped.chars().count() == 1
        && stripped
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic())
            .unwrap_or(false)
}

/// Removes only interior initials — a single letter followed by
/// whitespace (spec.md §4.4.1 step 4). A trailing/standalone initial
/// has no following whitespace and is kept.
fn strip_middle_initials(s: &str) -> String {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    let last = tokens.len().saturating_sub(1);
    tokens
        .iter()
        .enumerate()
        .filter(|(i, t)| *i == last || !is_initial_token(t))
        .map(|(_, t)| *t)
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn swap_comma(s: &str) -> String {
    if s.matches(',').count() != 1 {
        return s.to_string();
    }
    let mut parts = s.splitn(2, ',');
    let last = parts.next().unwrap_or("").trim();
    let first = parts.next().unwrap_or("").trim();
    format!("{first} {last}").trim().to_string()
}

/// Computes the comparison key used by the join cascade's fuzzy-name
/// step (spec.md §4.4.1). Deterministic, and idempotent on its own
/// output (I2).
pub fn normalize_name(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let mut s = input.trim().to_lowercase();
    s = strip_diacritics(&s);
    s = strip_suffixes(&s);
    s = strip_middle_initials(&s);
    s = collapse_whitespace(&s);
    s = swap_comma(&s);
    s.trim().to_string()
}

/// Collects admin-column values for a row: headers matching
/// case-insensitive `/admin/`, nonempty values only, sorted by header
/// name, joined with `"; "` (spec.md §4.4.2).
pub fn collect_admin_info(row: &RawRow) -> String {
    let mut pairs: Vec<(&str, &str)> = row
        .fields
        .iter()
        .filter(|(h, _)| h.to_lowercase().contains("admin"))
        .map(|(h, v)| (h.as_str(), v.as_str()))
        .filter(|(_, v)| !v.is_empty())
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs
        .into_iter()
        .map(|(_, v)| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn field(values: &HashMap<String, String>, key: &str) -> String {
    values.get(key).map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Builds a canonical [`SoTRecord`] from a mapped-field row
/// (spec.md §4.4.2). A record with an empty `canonical_id` is still
/// produced; it is simply unreachable via email/id index lookups.
pub fn build_sot_record(row: &RawRow, values: &HashMap<String, String>) -> SoTRecord {
    let email = field(values, fields::EMAIL).to_lowercase();
    let employee_id = field(values, fields::EMPLOYEE_ID);
    let display_name = field(values, fields::DISPLAY_NAME);
    let department = field(values, fields::DEPARTMENT);
    let manager = field(values, fields::MANAGER);
    let employment_status = field(values, fields::EMPLOYMENT_STATUS).to_lowercase();
    let canonical_id = if !email.is_empty() { email.clone() } else { employee_id.clone() };
    let normalized_name = normalize_name(&display_name);
    let admin_info = collect_admin_info(row);

    SoTRecord {
        canonical_id,
        employee_id,
        display_name,
        email,
        department,
        manager,
        employment_status,
        normalized_name,
        admin_info,
    }
}

/// Builds a canonical [`SatelliteRecord`] from a mapped-field row
/// (spec.md §4.4.3). `role` absorbs admin-column values the same way
/// `SoTRecord::admin_info` does, joined with the mapped role when both
/// are present.
pub fn build_satellite_record(
    row: &RawRow,
    values: &HashMap<String, String>,
    source_file: &str,
    source_row: u64,
) -> SatelliteRecord {
    let email = field(values, fields::EMAIL).to_lowercase();
    let user_id = field(values, fields::USER_ID);
    let display_name = field(values, fields::DISPLAY_NAME);
    let mapped_role = field(values, fields::ROLE);
    let entitlement = field(values, fields::ENTITLEMENT);
    let last_login = field(values, fields::LAST_LOGIN);
    let account_status = field(values, fields::ACCOUNT_STATUS).to_lowercase();
    let department = field(values, fields::DEPARTMENT);
    let manager = field(values, fields::MANAGER);

    let admin_info = collect_admin_info(row);
    let role = match (mapped_role.is_empty(), admin_info.is_empty()) {
        (true, true) => String::new(),
        (true, false) => admin_info,
        (false, true) => mapped_role,
        (false, false) => format!("{mapped_role}; {admin_info}"),
    };

    SatelliteRecord {
        email,
        user_id,
        display_name,
        role,
        entitlement,
        last_login,
        account_status,
        department,
        manager,
        source_file: source_file.to_string(),
        source_row,
    }
}
