use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

/// A list entry (opportunity, application or volunteer) in the shape every
/// consumer of the pipeline relies on.
///
/// Produced by [`crate::normalize::normalize_record`]; every field is populated,
/// with empty strings and lists standing in for absent payload data.
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Record {
    pub id: String,
    pub title: String,
    pub organization: String,
    pub description: String,
    pub location: String,
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub category: String,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Free-text status as the backend reports it. Vocabularies differ between
    /// list endpoints, so this is never coerced into an enum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Record {
    /// Case-insensitive membership test against the record's skill list.
    pub fn has_skill(&self, skill: &str) -> bool {
        let wanted = skill.trim().to_lowercase();
        self.skills.iter().any(|s| s.trim().to_lowercase() == wanted)
    }

    /// Text the free-text search runs against.
    pub fn search_haystack(&self) -> String {
        let mut haystack = String::with_capacity(
            self.title.len() + self.organization.len() + self.location.len() + self.description.len() + 3,
        );
        for part in [&self.title, &self.organization, &self.location, &self.description] {
            if !haystack.is_empty() {
                haystack.push(' ');
            }
            haystack.push_str(part);
        }
        haystack.to_lowercase()
    }
}

/// Payload shape as the list endpoints return it. Every field is optional and
/// several endpoints name the same field differently.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    #[serde(deserialize_with = "deserialize_opaque_id")]
    pub id: Option<String>,
    #[serde(alias = "name")]
    pub title: Option<String>,
    #[serde(alias = "organization_name", alias = "org_name")]
    pub organization: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(
        alias = "skills_required",
        alias = "required_skills",
        deserialize_with = "deserialize_skill_list"
    )]
    pub skills: Option<Vec<String>>,
    pub category: Option<String>,
    pub status: Option<String>,
}

/// Ids arrive as strings from some endpoints and as integers from others.
fn deserialize_opaque_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Accepts either a JSON array (non-string entries dropped) or a single
/// comma-separated string.
fn deserialize_skill_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        Value::String(joined) => Some(
            joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_record_accepts_aliases_and_numeric_ids() {
        let raw: RawRecord = serde_json::from_value(serde_json::json!({
            "id": 42,
            "name": "Beach cleanup",
            "organization_name": "Coast Guardians",
            "skills_required": ["Lifting", 3, "First Aid"],
        }))
        .unwrap();

        assert_eq!(raw.id.as_deref(), Some("42"));
        assert_eq!(raw.title.as_deref(), Some("Beach cleanup"));
        assert_eq!(raw.organization.as_deref(), Some("Coast Guardians"));
        assert_eq!(raw.skills, Some(vec!["Lifting".to_string(), "First Aid".to_string()]));
        assert!(raw.location.is_none());
    }

    #[test]
    fn raw_record_splits_comma_separated_skills() {
        let raw: RawRecord = serde_json::from_value(serde_json::json!({
            "skills": "Cooking, Driving,,",
        }))
        .unwrap();
        assert_eq!(raw.skills, Some(vec!["Cooking".to_string(), "Driving".to_string()]));
    }

    #[test]
    fn null_id_is_absent() {
        let raw: RawRecord = serde_json::from_value(serde_json::json!({ "id": null })).unwrap();
        assert!(raw.id.is_none());
    }

    #[test]
    fn has_skill_ignores_case_and_padding() {
        let record = Record {
            skills: vec!["First Aid".to_string()],
            ..Default::default()
        };
        assert!(record.has_skill("first aid "));
        assert!(!record.has_skill("Cooking"));
    }
}
