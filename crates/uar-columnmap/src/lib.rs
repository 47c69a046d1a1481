//! # uar-columnmap
//!
//! **Tier 2 (Schema)**
//!
//! Transforms a [`RawRow`] into a mapping from canonical field names to
//! string values (spec.md §4.3): built-in header-table inference when
//! no user map is supplied, or the user's [`ColumnMap`] overrides
//! otherwise.

use std::collections::{HashMap, HashSet};

use uar_types::{ColumnMap, RawRow};

/// Canonical field name constants, used both as map values and as the
/// keys a normalizer looks up afterwards.
pub mod fields {
    pub const EMAIL: &str = "email";
    pub const USER_ID: &str = "userId";
    pub const EMPLOYEE_ID: &str = "employeeId";
    pub const DISPLAY_NAME: &str = "displayName";
    pub const DEPARTMENT: &str = "department";
    pub const MANAGER: &str = "manager";
    pub const EMPLOYMENT_STATUS: &str = "employmentStatus";
    pub const ACCOUNT_STATUS: &str = "accountStatus";
    pub const ROLE: &str = "role";
    pub const ENTITLEMENT: &str = "entitlement";
    pub const LAST_LOGIN: &str = "lastLogin";
}

/// `(normalized_alias, canonical_target)` exact-match table (§4.3.2).
const EXACT_TABLE: &[(&str, &str)] = &[
    ("email", fields::EMAIL),
    ("mail", fields::EMAIL),
    ("userprincipalname", fields::EMAIL),
    ("upn", fields::EMAIL),
    ("userid", fields::USER_ID),
    ("samaccountname", fields::USER_ID),
    ("login", fields::USER_ID),
    ("uid", fields::USER_ID),
    ("employeeid", fields::EMPLOYEE_ID),
    ("empid", fields::EMPLOYEE_ID),
    ("employeenumber", fields::EMPLOYEE_ID),
    ("staffid", fields::EMPLOYEE_ID),
    ("displayname", fields::DISPLAY_NAME),
    ("fullname", fields::DISPLAY_NAME),
    ("name", fields::DISPLAY_NAME),
    ("department", fields::DEPARTMENT),
    ("dept", fields::DEPARTMENT),
    ("manager", fields::MANAGER),
    ("reportsto", fields::MANAGER),
    ("employmentstatus", fields::EMPLOYMENT_STATUS),
    ("accountstatus", fields::ACCOUNT_STATUS),
    ("status", fields::ACCOUNT_STATUS),
    ("role", fields::ROLE),
    ("jobtitle", fields::ROLE),
    ("title", fields::ROLE),
    ("entitlement", fields::ENTITLEMENT),
    ("accesslevel", fields::ENTITLEMENT),
    ("memberof", fields::ENTITLEMENT),
    ("lastlogin", fields::LAST_LOGIN),
    ("lastsignin", fields::LAST_LOGIN),
    ("lastactive", fields::LAST_LOGIN),
];

/// `(substring, canonical_target)` ordered substring-match table, most
/// specific first (§4.3.3).
const SUBSTRING_TABLE: &[(&str, &str)] = &[
    ("email", fields::EMAIL),
    ("mail", fields::EMAIL),
    ("upn", fields::EMAIL),
    ("employeeid", fields::EMPLOYEE_ID),
    ("userid", fields::USER_ID),
    ("displayname", fields::DISPLAY_NAME),
    ("fullname", fields::DISPLAY_NAME),
    ("name", fields::DISPLAY_NAME),
    ("department", fields::DEPARTMENT),
    ("manager", fields::MANAGER),
    ("reportsto", fields::MANAGER),
    ("employmentstatus", fields::EMPLOYMENT_STATUS),
    ("accountstatus", fields::ACCOUNT_STATUS),
    ("status", fields::ACCOUNT_STATUS),
    ("entitlement", fields::ENTITLEMENT),
    ("accesslevel", fields::ENTITLEMENT),
    ("role", fields::ROLE),
    ("memberof", fields::ENTITLEMENT),
    ("lastlogin", fields::LAST_LOGIN),
];

/// Normalizes a header for table lookups: lowercase, strip whitespace,
/// underscores, and hyphens (§4.3.1).
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

fn exact_match(normalized: &str) -> Option<&'static str> {
    EXACT_TABLE
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, target)| *target)
}

fn substring_match(normalized: &str) -> Option<&'static str> {
    SUBSTRING_TABLE
        .iter()
        .find(|(needle, _)| normalized.contains(needle))
        .map(|(_, target)| *target)
}

/// Infers a `header -> canonical_field` mapping using the built-in
/// table. Each canonical target is claimed by at most one header: the
/// first header (in input order) whose exact or substring match lands
/// on a still-unclaimed target wins (§4.3).
pub fn infer_column_map(headers: &[String]) -> HashMap<String, String> {
    let mut assigned = HashMap::new();
    let mut used: HashSet<&'static str> = HashSet::new();

    for header in headers {
        let normalized = normalize_header(header);

        if let Some(target) = exact_match(&normalized) {
            if !used.contains(target) {
                used.insert(target);
                assigned.insert(header.clone(), target.to_string());
                continue;
            }
        }

        if let Some(target) = substring_match(&normalized) {
            if !used.contains(target) {
                used.insert(target);
                assigned.insert(header.clone(), target.to_string());
            }
        }
    }

    assigned
}

/// Applies a [`ColumnMap`] to a [`RawRow`], returning
/// `canonical_field -> value`. Inference always runs as the baseline;
/// `direct` entries override it for their named source headers only
/// (spec.md §4.3: "Direct entries override inference for named
/// sources"), so a caller fixing one column does not lose mapping for
/// the rest.
///
/// When a user map assigns two source headers to the same canonical
/// field, the CSV's own column order decides the winner: later columns
/// overwrite earlier ones (spec.md §9 Open Questions — reproduced as-is).
pub fn apply_column_map(row: &RawRow, headers: &[String], map: &ColumnMap) -> HashMap<String, String> {
    let mut result = HashMap::new();

    let inferred = infer_column_map(headers);
    let direct: HashMap<&str, &str> = map
        .direct
        .iter()
        .map(|(src, target)| (src.as_str(), target.as_str()))
        .collect();

    for (header, value) in &row.fields {
        let target = direct
            .get(header.as_str())
            .copied()
            .or_else(|| inferred.get(header).map(|s| s.as_str()));
        if let Some(target) = target {
            result.insert(target.to_string(), value.clone());
        }
    }

    for rule in &map.concat {
        let joined = rule
            .source_headers
            .iter()
            .filter_map(|src| row.get(src))
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(&rule.separator);
        if !joined.is_empty() {
            result.insert(rule.target_field.clone(), joined);
        }
    }

    result
}
