//! Normalizer functions that turn parsed filter descriptors into criteria
//!
//! Each function validates the operator/value combination for one criteria
//! field and writes the normalized value into [`FilterCriteria`].

use chrono::NaiveDate;

use super::criteria::FilterCriteria;
use crate::errors::{ListError, ListResult};
use crate::normalize::parse_date;
use crate::query::{FilterDescriptor, FilterOperator};

/// Parses a date bound, handling `*` and the empty string as unbounded.
///
/// Unlike payload dates, a malformed bound in a query is an error: it came
/// from the user and silently dropping it would widen the result set.
pub fn parse_date_bound(value: Option<&String>) -> ListResult<Option<NaiveDate>> {
    match value {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed == "*" {
                Ok(None)
            } else {
                parse_date(trimmed)
                    .map(Some)
                    .ok_or_else(|| ListError::invalid(format!("Invalid date bound: {trimmed}")))
            }
        }
        None => Ok(None),
    }
}

fn first_value(descriptor: FilterDescriptor, target_field: &str) -> ListResult<String> {
    descriptor
        .values
        .into_iter()
        .next()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ListError::invalid(format!("Filter on {target_field} requires a value")))
}

/// Exact category match (`category:eq:<name>`).
pub fn apply_category_filter(descriptor: FilterDescriptor, criteria: &mut FilterCriteria) -> ListResult<()> {
    if descriptor.operator != FilterOperator::Eq {
        return Err(ListError::invalid("Expected eq operator for category"));
    }
    if descriptor.values.len() > 1 {
        return Err(ListError::invalid("Category filter takes a single value"));
    }
    criteria.category = first_value(descriptor, "category")?;
    Ok(())
}

/// Location substring match (`location:contains:<text>`).
pub fn apply_location_filter(descriptor: FilterDescriptor, criteria: &mut FilterCriteria) -> ListResult<()> {
    match descriptor.operator {
        // Eq on location behaves like contains, matching what the location box does.
        FilterOperator::Contains | FilterOperator::Eq => {
            if descriptor.values.len() > 1 {
                return Err(ListError::invalid("Location filter takes a single value"));
            }
            criteria.location = first_value(descriptor, "location")?;
            Ok(())
        }
        other => Err(ListError::invalid(format!(
            "Operator {other:?} is not supported for location"
        ))),
    }
}

/// Start date window (`start_date:range:<from>,<to>` or `start_date:eq:<day>`).
pub fn apply_date_range_filter(descriptor: FilterDescriptor, criteria: &mut FilterCriteria) -> ListResult<()> {
    let (start, end) = match descriptor.operator {
        FilterOperator::Range => {
            if descriptor.values.len() > 2 {
                return Err(ListError::invalid("Date range takes at most two bounds"));
            }
            (
                parse_date_bound(descriptor.values.first())?,
                parse_date_bound(descriptor.values.get(1))?,
            )
        }
        FilterOperator::Eq => {
            let day = parse_date_bound(descriptor.values.first())?
                .ok_or_else(|| ListError::invalid("Date filter on start_date requires a value"))?;
            (Some(day), Some(day))
        }
        other => {
            return Err(ListError::invalid(format!(
                "Operator {other:?} is not supported for start_date"
            )));
        }
    };
    criteria.date_range.start = start;
    criteria.date_range.end = end;
    Ok(())
}

/// Required skills (`skills:all:<a>|<b>`).
pub fn apply_skills_filter(descriptor: FilterDescriptor, criteria: &mut FilterCriteria) -> ListResult<()> {
    match descriptor.operator {
        FilterOperator::All | FilterOperator::Eq => {
            if descriptor.values.is_empty() {
                return Err(ListError::invalid("Skills filter requires at least one skill"));
            }
            criteria.skills.extend(descriptor.values);
            Ok(())
        }
        other => Err(ListError::invalid(format!("Operator {other:?} is not supported for skills"))),
    }
}

/// Accepted statuses (`status:eq:<a>|<b>`).
pub fn apply_status_filter(descriptor: FilterDescriptor, criteria: &mut FilterCriteria) -> ListResult<()> {
    if descriptor.operator != FilterOperator::Eq {
        return Err(ListError::invalid("Expected eq operator for status"));
    }
    if descriptor.values.is_empty() {
        return Err(ListError::invalid("Status filter requires a value"));
    }
    criteria.statuses.extend(descriptor.values);
    Ok(())
}

/// Route a descriptor to the normalizer for its field.
pub fn apply_descriptor(criteria: &mut FilterCriteria, descriptor: FilterDescriptor) -> ListResult<()> {
    match descriptor.field.as_str() {
        "category" => apply_category_filter(descriptor, criteria),
        "location" => apply_location_filter(descriptor, criteria),
        "start_date" | "date" => apply_date_range_filter(descriptor, criteria),
        "skills" | "skill" => apply_skills_filter(descriptor, criteria),
        "status" => apply_status_filter(descriptor, criteria),
        other => Err(ListError::invalid(format!("Unknown filter field: {other}"))),
    }
}
