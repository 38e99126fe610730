//! Derived percentages and status tones shown next to list entries.
//!
//! Nothing here is stored; values are recomputed from the current records.

use serde::Serialize;

use crate::types::Record;

/// `round(matched / required * 100)`, or 0 when nothing is required.
///
/// The result is clamped to 100 in case upstream data reports more matches
/// than requirements.
pub fn match_percentage(matched: u64, required: u64) -> u8 {
    if required == 0 {
        return 0;
    }
    let percent = (100.0 * matched as f64 / required as f64).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Completed steps as a percentage of the total. Same rules as [`match_percentage`].
#[inline]
pub fn progress_percentage(completed: u64, total: u64) -> u8 {
    match_percentage(completed, total)
}

/// Result of comparing a record's required skills with a volunteer's skills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillMatch {
    pub matched: u64,
    pub required: u64,
    pub percentage: u8,
    /// Required skills the volunteer lacks, in requirement order.
    pub missing: Vec<String>,
}

/// Compare required skills against offered skills, ignoring case and
/// duplicate requirements.
pub fn skill_match<R, O>(required: &[R], offered: &[O]) -> SkillMatch
where
    R: AsRef<str>,
    O: AsRef<str>,
{
    let offered: Vec<String> = offered.iter().map(|s| s.as_ref().trim().to_lowercase()).collect();

    let mut seen: Vec<String> = Vec::with_capacity(required.len());
    let mut matched = 0u64;
    let mut missing = Vec::new();
    for skill in required {
        let name = skill.as_ref().trim();
        let key = name.to_lowercase();
        if key.is_empty() || seen.contains(&key) {
            continue;
        }
        if offered.contains(&key) {
            matched += 1;
        } else {
            missing.push(name.to_string());
        }
        seen.push(key);
    }

    let required = seen.len() as u64;
    SkillMatch {
        matched,
        required,
        percentage: match_percentage(matched, required),
        missing,
    }
}

/// Skill match between a record's requirements and a volunteer profile.
pub fn record_match<O: AsRef<str>>(record: &Record, volunteer_skills: &[O]) -> SkillMatch {
    skill_match(record.skills.as_slice(), volunteer_skills)
}

/// Display tone for a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTone {
    Success,
    Info,
    Warning,
    Danger,
    Neutral,
}

impl StatusTone {
    /// Map a status from any list endpoint onto a tone.
    ///
    /// Application and task lists use different vocabularies; both are
    /// recognised here without folding them into one status type. Unknown
    /// values are neutral.
    pub fn from_status(status: &str) -> Self {
        let normalized = status.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "completed" | "accepted" | "approved" | "active" => StatusTone::Success,
            "in_progress" | "open" => StatusTone::Info,
            "pending" | "paused" | "waitlisted" => StatusTone::Warning,
            "quit" | "cancelled" | "canceled" | "rejected" => StatusTone::Danger,
            _ => StatusTone::Neutral,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            StatusTone::Success => "success",
            StatusTone::Info => "info",
            StatusTone::Warning => "warning",
            StatusTone::Danger => "danger",
            StatusTone::Neutral => "neutral",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_required_is_zero_percent() {
        assert_eq!(match_percentage(0, 0), 0);
        assert_eq!(match_percentage(3, 0), 0);
    }

    #[test]
    fn rounds_to_nearest() {
        assert_eq!(match_percentage(1, 2), 50);
        assert_eq!(match_percentage(1, 3), 33);
        assert_eq!(match_percentage(2, 3), 67);
        assert_eq!(match_percentage(3, 3), 100);
        for n in 1..=20u64 {
            for k in 0..=n {
                let expected = (100.0 * k as f64 / n as f64).round() as u8;
                assert_eq!(match_percentage(k, n), expected);
            }
        }
    }

    #[test]
    fn clamps_inconsistent_counts() {
        assert_eq!(match_percentage(5, 2), 100);
        assert_eq!(progress_percentage(9, 4), 100);
    }

    #[test]
    fn skill_match_counts_case_insensitive_overlap() {
        let result = skill_match(&["First Aid", "Cooking"], &["first aid", "Leadership"]);
        assert_eq!(result.matched, 1);
        assert_eq!(result.required, 2);
        assert_eq!(result.percentage, 50);
        assert_eq!(result.missing, ["Cooking"]);
    }

    #[test]
    fn skill_match_ignores_duplicates_and_blanks() {
        let result = skill_match(&["Cooking", "cooking", " "], &["Cooking"]);
        assert_eq!(result.required, 1);
        assert_eq!(result.percentage, 100);
    }

    #[test]
    fn record_without_requirements_is_zero() {
        let record = Record::default();
        assert_eq!(record_match(&record, &["Anything"]).percentage, 0);
    }

    #[test]
    fn status_tones_cover_both_vocabularies() {
        assert_eq!(StatusTone::from_status("Completed"), StatusTone::Success);
        assert_eq!(StatusTone::from_status("in progress"), StatusTone::Info);
        assert_eq!(StatusTone::from_status("in-progress"), StatusTone::Info);
        assert_eq!(StatusTone::from_status("pending"), StatusTone::Warning);
        assert_eq!(StatusTone::from_status("paused"), StatusTone::Warning);
        assert_eq!(StatusTone::from_status("quit"), StatusTone::Danger);
        assert_eq!(StatusTone::from_status("cancelled"), StatusTone::Danger);
        assert_eq!(StatusTone::from_status("archived"), StatusTone::Neutral);
    }
}
