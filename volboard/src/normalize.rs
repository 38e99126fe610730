//! Payload normalization.
//!
//! List endpoints disagree on field names, id types and which fields they
//! send at all. Everything is mapped onto [`Record`] here so that filtering
//! and rendering never deal with missing data.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::errors::{ListError, ListResult};
use crate::types::{Record, RawRecord};

/// Category assigned when no keyword rule matches.
pub const DEFAULT_CATEGORY: &str = "social";

/// Built-in keyword table, in priority order. The first matching category wins.
const BUILTIN_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "environment",
        &[
            "environment", "tree", "park", "beach", "garden", "recycl", "climate", "conservation", "wildlife",
            "cleanup",
        ],
    ),
    (
        "education",
        &["educat", "tutor", "teach", "school", "literacy", "mentor", "reading"],
    ),
    (
        "healthcare",
        &["health", "hospital", "medical", "clinic", "nurs", "blood drive"],
    ),
    (
        "technology",
        &["tech", "computer", "coding", "software", "digital", "website"],
    ),
];

/// Payload keys that wrap the record array in object-shaped responses.
const ENVELOPE_KEYS: &[&str] = &["data", "results", "items", "opportunities", "applications", "volunteers"];

static BUILTIN_RULES: Lazy<CategoryRules> =
    Lazy::new(|| CategoryRules::builtin().expect("built-in category keywords compile"));

/// A single category inference rule.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub category: String,
    pattern: Regex,
}

impl CategoryRule {
    pub fn new<S: AsRef<str>>(category: impl Into<String>, keywords: &[S]) -> ListResult<Self> {
        let category = category.into();
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Err(ListError::Config {
                message: format!("category '{category}' has no keywords").into(),
            });
        }
        // Keywords are word-start stems: "recycl" matches "recycling".
        let pattern = Regex::new(&format!(r"(?i)\b(?:{})", alternatives.join("|"))).map_err(|err| {
            ListError::Config {
                message: format!("invalid keywords for category '{category}': {err}").into(),
            }
        })?;
        Ok(Self { category, pattern })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Ordered keyword rules used to infer a category from free text.
#[derive(Debug, Clone)]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
    fallback: String,
}

impl Default for CategoryRules {
    fn default() -> Self {
        BUILTIN_RULES.clone()
    }
}

impl CategoryRules {
    fn builtin() -> ListResult<Self> {
        let rules = BUILTIN_KEYWORDS
            .iter()
            .map(|(category, keywords)| CategoryRule::new(*category, *keywords))
            .collect::<ListResult<Vec<_>>>()?;
        Ok(Self {
            rules,
            fallback: DEFAULT_CATEGORY.to_string(),
        })
    }

    /// Build rules from configured keyword overrides.
    ///
    /// Built-in categories keep their priority order and have their keyword
    /// list replaced when overridden. Additional categories are checked after
    /// the built-ins, in name order.
    pub fn with_overrides(overrides: &BTreeMap<String, Vec<String>>, fallback: Option<&str>) -> ListResult<Self> {
        let mut rules = Vec::with_capacity(BUILTIN_KEYWORDS.len() + overrides.len());
        for (category, keywords) in BUILTIN_KEYWORDS {
            let rule = match overrides.get(*category) {
                Some(custom) => CategoryRule::new(*category, custom.as_slice())?,
                None => CategoryRule::new(*category, *keywords)?,
            };
            rules.push(rule);
        }
        for (category, keywords) in overrides {
            if BUILTIN_KEYWORDS.iter().any(|(name, _)| *name == category.as_str()) {
                continue;
            }
            rules.push(CategoryRule::new(category.clone(), keywords.as_slice())?);
        }

        let fallback = fallback
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string();

        Ok(Self { rules, fallback })
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.category.as_str())
    }

    /// Infer a category from a title and description.
    pub fn infer(&self, title: &str, description: &str) -> &str {
        let text = format!("{title} {description}");
        self.rules
            .iter()
            .find(|rule| rule.matches(&text))
            .map(|rule| rule.category.as_str())
            .unwrap_or(&self.fallback)
    }
}

/// Parse a payload date. Accepts `YYYY-MM-DD`, RFC 3339 and naive
/// `YYYY-MM-DDTHH:MM:SS` timestamps; anything else is treated as absent.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(trimmed).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn clean(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Map one raw payload record onto a fully populated [`Record`].
pub fn normalize_record(raw: RawRecord, rules: &CategoryRules) -> Record {
    let title = clean(raw.title);
    let description = clean(raw.description);

    let category = match raw.category.as_deref().map(str::trim) {
        Some(explicit) if !explicit.is_empty() => explicit.to_string(),
        _ => rules.infer(&title, &description).to_string(),
    };

    let skills = raw
        .skills
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Record {
        id: clean(raw.id),
        organization: clean(raw.organization),
        location: clean(raw.location),
        start_date: raw.start_date.as_deref().and_then(parse_date),
        end_date: raw.end_date.as_deref().and_then(parse_date),
        status: raw.status.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        title,
        description,
        category,
        skills,
    }
}

/// Normalize a whole list response.
///
/// Accepts a bare array or an object wrapping the array under one of the
/// common envelope keys. `null` and every other shape yield no records.
/// Entries that are not objects, or that fail to decode, are skipped.
pub fn normalize_payload(payload: Value, rules: &CategoryRules) -> Vec<Record> {
    let entries = match payload {
        Value::Array(entries) => entries,
        Value::Object(mut map) => {
            let wrapped = ENVELOPE_KEYS
                .iter()
                .find_map(|key| match map.remove(*key) {
                    Some(Value::Array(entries)) => Some(entries),
                    _ => None,
                });
            match wrapped {
                Some(entries) => entries,
                None => {
                    debug!("payload object has no record array; treating as empty");
                    return Vec::new();
                }
            }
        }
        other => {
            debug!("payload is not a collection ({}); treating as empty", json_kind(&other));
            return Vec::new();
        }
    };

    let total = entries.len();
    let records: Vec<Record> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            if !entry.is_object() {
                warn!("skipping payload entry {index}: expected object, found {}", json_kind(&entry));
                return None;
            }
            match serde_json::from_value::<RawRecord>(entry) {
                Ok(raw) => Some(normalize_record(raw, rules)),
                Err(err) => {
                    warn!("skipping payload entry {index}: {err}");
                    None
                }
            }
        })
        .collect();

    debug!("normalized {} of {} payload entries", records.len(), total);
    records
}

/// Parse and normalize a JSON document. Only unparseable text is an error.
pub fn normalize_json(text: &str, rules: &CategoryRules) -> ListResult<Vec<Record>> {
    let payload: Value = serde_json::from_str(text)?;
    Ok(normalize_payload(payload, rules))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
