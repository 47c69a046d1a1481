//! # uar-conflict
//!
//! **Tier 4 (Conflict Detector)**
//!
//! Compares a matched SoT/satellite pair field by field and emits
//! [`Conflict`] entries for divergences. The authoritative (SoT) side
//! is never overwritten (spec.md §4.7).

use uar_types::{Conflict, SatelliteRecord, SoTRecord};

fn trimmed_ci_eq(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Compares a matched pair and returns the conflicts found. `display_name`
/// is compared when both sides are nonempty; `department` is compared the
/// same way as a supplemental symmetric field, skipped entirely if the
/// satellite does not carry it.
pub fn detect_conflicts(sot: &SoTRecord, satellite: &SatelliteRecord) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    if !sot.display_name.is_empty()
        && !satellite.display_name.is_empty()
        && !trimmed_ci_eq(&sot.display_name, &satellite.display_name)
    {
        conflicts.push(Conflict::sot_wins(
            "display_name",
            sot.display_name.clone(),
            satellite.display_name.clone(),
        ));
    }

    if !sot.department.is_empty()
        && !satellite.department.is_empty()
        && !trimmed_ci_eq(&sot.department, &satellite.department)
    {
        conflicts.push(Conflict::sot_wins(
            "department",
            sot.department.clone(),
            satellite.department.clone(),
        ));
    }

    conflicts
}
