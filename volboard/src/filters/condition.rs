use chrono::NaiveDate;

use crate::types::Record;

/// A composable in-memory predicate over [`Record`]s.
///
/// Leaf conditions test a single aspect of a record, while `And` and `Or`
/// build boolean expressions. Text values are lowercased on construction so
/// that evaluation compares like with like.
///
/// # Examples
///
/// ```
/// use volboard::filters::FilterCondition;
///
/// // Simple equality
/// let category = FilterCondition::category_eq("Environmental");
///
/// // OR combination (either status vocabulary)
/// let open = FilterCondition::or([
///     FilterCondition::status_in(["pending", "in_progress"]),
///     FilterCondition::status_in(["active"]),
/// ]);
///
/// // Environmental work that is still open
/// let combined = FilterCondition::and([category, open]);
/// assert!(!combined.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    // Leaf conditions
    TextSearch {
        term: String,
    },
    CategoryEquals {
        category: String,
    },
    LocationContains {
        value: String,
    },
    StartDateRange {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    HasAllSkills {
        skills: Vec<String>,
    },
    StatusIn {
        statuses: Vec<String>,
    },
    // Composite conditions
    And(Vec<FilterCondition>),
    Or(Vec<FilterCondition>),
}

impl FilterCondition {
    // ========== Leaf Constructors ==========

    /// Case-insensitive substring search over title, organization, location and description.
    #[inline]
    pub fn text_search(term: impl AsRef<str>) -> Self {
        Self::TextSearch {
            term: term.as_ref().to_lowercase(),
        }
    }

    /// Exact (case-sensitive) category match.
    #[inline]
    pub fn category_eq(category: impl Into<String>) -> Self {
        Self::CategoryEquals {
            category: category.into(),
        }
    }

    #[inline]
    pub fn location_contains(value: impl AsRef<str>) -> Self {
        Self::LocationContains {
            value: value.as_ref().to_lowercase(),
        }
    }

    /// Start date within the inclusive range. An unset bound is not checked.
    #[inline]
    pub fn start_date_between(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self::StartDateRange { start, end }
    }

    /// Record must carry every listed skill (case-insensitive).
    #[inline]
    pub fn has_all_skills<S: AsRef<str>>(skills: impl IntoIterator<Item = S>) -> Self {
        Self::HasAllSkills {
            skills: skills.into_iter().map(|s| s.as_ref().trim().to_lowercase()).collect(),
        }
    }

    /// Record status must equal one of the given values (case-insensitive).
    #[inline]
    pub fn status_in<S: AsRef<str>>(statuses: impl IntoIterator<Item = S>) -> Self {
        Self::StatusIn {
            statuses: statuses.into_iter().map(|s| s.as_ref().trim().to_lowercase()).collect(),
        }
    }

    // ========== Composite Constructors ==========

    /// Combine conditions with AND logic.
    #[inline]
    pub fn and(conditions: impl IntoIterator<Item = FilterCondition>) -> Self {
        Self::And(conditions.into_iter().collect())
    }

    /// Combine conditions with OR logic.
    #[inline]
    pub fn or(conditions: impl IntoIterator<Item = FilterCondition>) -> Self {
        Self::Or(conditions.into_iter().collect())
    }

    /// True when the condition imposes no constraint.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::And(conditions) | Self::Or(conditions) => conditions.iter().all(FilterCondition::is_empty),
            _ => false,
        }
    }

    // ========== Evaluation ==========

    /// Evaluate this condition against a record.
    ///
    /// Composite conditions with no non-empty children impose no constraint,
    /// so an empty `Or` matches everything rather than nothing.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::TextSearch { term } => record.search_haystack().contains(term.as_str()),
            Self::CategoryEquals { category } => record.category == *category,
            Self::LocationContains { value } => record.location.to_lowercase().contains(value.as_str()),
            Self::StartDateRange { start, end } => {
                if start.is_none() && end.is_none() {
                    return true;
                }
                let Some(date) = record.start_date else {
                    return false;
                };
                start.is_none_or(|lower| date >= lower) && end.is_none_or(|upper| date <= upper)
            }
            Self::HasAllSkills { skills } => skills.iter().all(|skill| record.has_skill(skill)),
            Self::StatusIn { statuses } => match record.status.as_deref() {
                Some(status) => {
                    let status = status.to_lowercase();
                    statuses.iter().any(|s| *s == status)
                }
                None => false,
            },
            Self::And(conditions) => conditions.iter().all(|c| c.matches(record)),
            Self::Or(conditions) => {
                let mut active = conditions.iter().filter(|c| !c.is_empty()).peekable();
                if active.peek().is_none() {
                    return true;
                }
                active.any(|c| c.matches(record))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record {
            id: "1".to_string(),
            title: "Tree Planting".to_string(),
            organization: "Green Future".to_string(),
            description: "Plant native oaks".to_string(),
            location: "Portland, OR".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 6, 15),
            end_date: None,
            category: "Environmental".to_string(),
            skills: vec!["Gardening".to_string(), "Lifting".to_string()],
            status: Some("Active".to_string()),
        }
    }

    #[test]
    fn text_search_spans_all_text_fields() {
        let r = record();
        assert!(FilterCondition::text_search("green fut").matches(&r));
        assert!(FilterCondition::text_search("PORTLAND").matches(&r));
        assert!(FilterCondition::text_search("oaks").matches(&r));
        assert!(!FilterCondition::text_search("hospital").matches(&r));
    }

    #[test]
    fn category_is_exact() {
        let r = record();
        assert!(FilterCondition::category_eq("Environmental").matches(&r));
        assert!(!FilterCondition::category_eq("environmental").matches(&r));
    }

    #[test]
    fn date_range_bounds_are_inclusive_and_independent() {
        let r = record();
        let day = |d| NaiveDate::from_ymd_opt(2024, 6, d);
        assert!(FilterCondition::start_date_between(day(15), day(15)).matches(&r));
        assert!(FilterCondition::start_date_between(day(1), None).matches(&r));
        assert!(!FilterCondition::start_date_between(None, day(14)).matches(&r));
        assert!(!FilterCondition::start_date_between(day(16), day(30)).matches(&r));

        let undated = Record {
            start_date: None,
            ..record()
        };
        assert!(FilterCondition::start_date_between(None, None).matches(&undated));
        assert!(!FilterCondition::start_date_between(day(1), None).matches(&undated));
    }

    #[test]
    fn skills_require_superset() {
        let r = record();
        assert!(FilterCondition::has_all_skills(["gardening"]).matches(&r));
        assert!(FilterCondition::has_all_skills(["Lifting", "GARDENING"]).matches(&r));
        assert!(!FilterCondition::has_all_skills(["Gardening", "Cooking"]).matches(&r));
        assert!(FilterCondition::has_all_skills(Vec::<String>::new()).matches(&r));
    }

    #[test]
    fn status_matching_ignores_case_and_requires_a_status() {
        let r = record();
        assert!(FilterCondition::status_in(["active", "paused"]).matches(&r));
        assert!(!FilterCondition::status_in(["completed"]).matches(&r));
        let no_status = Record { status: None, ..record() };
        assert!(!FilterCondition::status_in(["active"]).matches(&no_status));
    }

    #[test]
    fn composites_follow_boolean_logic() {
        let r = record();
        let yes = FilterCondition::category_eq("Environmental");
        let no = FilterCondition::category_eq("Education");

        assert!(FilterCondition::and([yes.clone(), yes.clone()]).matches(&r));
        assert!(!FilterCondition::and([yes.clone(), no.clone()]).matches(&r));
        assert!(FilterCondition::or([no.clone(), yes.clone()]).matches(&r));
        assert!(!FilterCondition::or([no.clone(), no]).matches(&r));
    }

    #[test]
    fn empty_composites_impose_no_constraint() {
        let r = record();
        assert!(FilterCondition::and([]).is_empty());
        assert!(FilterCondition::or([FilterCondition::and([])]).is_empty());
        assert!(FilterCondition::and([]).matches(&r));
        assert!(FilterCondition::or([]).matches(&r));
    }
}
