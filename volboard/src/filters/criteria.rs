use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

use super::condition::FilterCondition;
use crate::normalize::parse_date;
use crate::types::Record;

/// Category value that disables the category filter.
pub const ALL_CATEGORIES: &str = "all";

/// Inclusive start-date window. Either bound may be left open.
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    #[serde(deserialize_with = "deserialize_loose_date")]
    pub start: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_loose_date")]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Form inputs leave unset dates as `""`; treat those (and anything
/// unparseable) as an open bound.
fn deserialize_loose_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}

/// User-controlled constraints for one list view.
///
/// The default value matches every record.
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub search_term: String,
    pub category: String,
    pub location: String,
    pub date_range: DateRange,
    pub skills: Vec<String>,
    /// Accepted status values; empty accepts any status, including none.
    pub statuses: Vec<String>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            category: ALL_CATEGORIES.to_string(),
            location: String::new(),
            date_range: DateRange::default(),
            skills: Vec::new(),
            statuses: Vec::new(),
        }
    }
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    #[inline]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[inline]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    #[inline]
    pub fn with_date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.date_range = DateRange::new(start, end);
        self
    }

    #[inline]
    pub fn with_skills<S: Into<String>>(mut self, skills: impl IntoIterator<Item = S>) -> Self {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    pub fn with_statuses<S: Into<String>>(mut self, statuses: impl IntoIterator<Item = S>) -> Self {
        self.statuses = statuses.into_iter().map(Into::into).collect();
        self
    }

    fn category_filter(&self) -> Option<&str> {
        let category = self.category.trim();
        if category.is_empty() || category.eq_ignore_ascii_case(ALL_CATEGORIES) {
            None
        } else {
            Some(category)
        }
    }

    fn selected<'a>(values: &'a [String]) -> impl Iterator<Item = &'a str> {
        values.iter().map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// Compile the active criteria into a single AND condition.
    ///
    /// Inactive criteria contribute no leaf, so the identity filter compiles
    /// to an empty `And`.
    pub fn to_condition(&self) -> FilterCondition {
        let mut leaves = Vec::with_capacity(6);

        let term = self.search_term.trim();
        if !term.is_empty() {
            leaves.push(FilterCondition::text_search(term));
        }
        if let Some(category) = self.category_filter() {
            leaves.push(FilterCondition::category_eq(category));
        }
        let location = self.location.trim();
        if !location.is_empty() {
            leaves.push(FilterCondition::location_contains(location));
        }
        if !self.date_range.is_open() {
            leaves.push(FilterCondition::start_date_between(self.date_range.start, self.date_range.end));
        }
        let skills: Vec<&str> = Self::selected(&self.skills).collect();
        if !skills.is_empty() {
            leaves.push(FilterCondition::has_all_skills(skills));
        }
        let statuses: Vec<&str> = Self::selected(&self.statuses).collect();
        if !statuses.is_empty() {
            leaves.push(FilterCondition::status_in(statuses));
        }

        FilterCondition::And(leaves)
    }

    /// True when no criterion narrows the list.
    pub fn is_identity(&self) -> bool {
        self.to_condition().is_empty()
    }
}

/// Test one record against the criteria.
pub fn evaluate(record: &Record, criteria: &FilterCriteria) -> bool {
    criteria.to_condition().matches(record)
}

/// Filter a collection, preserving order. A missing collection (failed
/// upstream fetch) filters to nothing.
pub fn filter_records<'a>(records: Option<&'a [Record]>, criteria: &FilterCriteria) -> Vec<&'a Record> {
    filter_with(records, &criteria.to_condition())
}

/// Filter a collection with an arbitrary condition, preserving order.
pub fn filter_with<'a>(records: Option<&'a [Record]>, condition: &FilterCondition) -> Vec<&'a Record> {
    let Some(records) = records else {
        return Vec::new();
    };
    let matched: Vec<&Record> = records.iter().filter(|r| condition.matches(r)).collect();
    debug!("filter kept {} of {} records", matched.len(), records.len());
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, category: &str, skills: &[&str]) -> Record {
        Record {
            id: id.to_string(),
            title: format!("Opportunity {id}"),
            category: category.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 10),
            ..Default::default()
        }
    }

    #[test]
    fn default_criteria_is_identity() {
        let criteria = FilterCriteria::default();
        assert!(criteria.is_identity());
        let records = [record("1", "Environmental", &[]), Record::default()];
        for r in &records {
            assert!(evaluate(r, &criteria));
        }
    }

    #[test]
    fn blank_and_sentinel_values_are_inactive() {
        let criteria = FilterCriteria::new()
            .with_search("   ")
            .with_category("ALL")
            .with_location("")
            .with_skills(["", " "]);
        assert!(criteria.is_identity());
    }

    #[test]
    fn category_filter_preserves_order() {
        let records = vec![
            record("a", "Environmental", &[]),
            record("b", "Education", &[]),
            record("c", "Environmental", &[]),
        ];
        let criteria = FilterCriteria::new().with_category("Environmental");
        let ids: Vec<&str> = filter_records(Some(records.as_slice()), &criteria)
            .into_iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn skill_filter_is_subset_test() {
        let r = record("1", "Social", &["First Aid", "Leadership"]);
        let subset = FilterCriteria::new().with_skills(["first aid"]);
        let full = FilterCriteria::new().with_skills(["Leadership", "First Aid"]);
        let missing = FilterCriteria::new().with_skills(["First Aid", "Cooking"]);
        assert!(evaluate(&r, &subset));
        assert!(evaluate(&r, &full));
        assert!(!evaluate(&r, &missing));
    }

    #[test]
    fn criteria_combine_with_and() {
        let r = Record {
            location: "Austin, TX".to_string(),
            ..record("1", "Education", &["Tutoring"])
        };
        let both = FilterCriteria::new().with_category("Education").with_location("austin");
        let one_off = FilterCriteria::new().with_category("Education").with_location("dallas");
        assert!(evaluate(&r, &both));
        assert!(!evaluate(&r, &one_off));
    }

    #[test]
    fn missing_collection_filters_to_nothing() {
        assert!(filter_records(None, &FilterCriteria::default()).is_empty());
    }

    #[test]
    fn deserializes_camel_case_with_blank_dates() {
        let criteria: FilterCriteria = serde_json::from_value(serde_json::json!({
            "searchTerm": "park",
            "category": "all",
            "location": "",
            "dateRange": { "start": "2024-01-01", "end": "" },
            "skills": ["Gardening"]
        }))
        .unwrap();
        assert_eq!(criteria.search_term, "park");
        assert_eq!(criteria.date_range.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(criteria.date_range.end, None);
        assert!(criteria.statuses.is_empty());
    }
}
