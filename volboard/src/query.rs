//! # List query parsing
//!
//! List pages keep their state in the query string. This module turns those
//! parameters into [`FilterCriteria`], a sort and a page request.
//!
//! ## Filter syntax
//!
//! Repeated `filter` parameters use `field:op:value`:
//!
//! | Filter                               | Effect                                   |
//! |--------------------------------------|------------------------------------------|
//! | `category:eq:Environmental`          | exact category                           |
//! | `location:contains:portland`         | case-insensitive location substring      |
//! | `start_date:range:2024-01-01,*`      | start date on or after Jan 1st           |
//! | `skills:all:First Aid\|Cooking`      | record has every listed skill            |
//! | `status:eq:pending\|active`          | status is one of the listed values       |
//!
//! `q` carries the free-text search term. `sort_by` accepts a field name,
//! optionally prefixed with `-` for descending order.

use std::borrow::Borrow;
use std::cmp::Ordering;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

use crate::errors::{ListError, ListResult};
use crate::filters::{FilterCriteria, apply_descriptor, filter_records};
use crate::pagination::{Page, paginate};
use crate::types::Record;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    #[inline]
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Record fields a list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    StartDate,
    Location,
    Category,
}

#[derive(Debug, Clone, Copy)]
pub struct SortField {
    pub name: &'static str,
    pub key: SortKey,
    pub default_order: SortOrder,
}

pub const DEFAULT_SORT: SortField = SortField {
    name: "start_date",
    key: SortKey::StartDate,
    default_order: SortOrder::Asc,
};

pub const ALLOWED_SORTS: &[SortField] = &[
    DEFAULT_SORT,
    SortField {
        name: "title",
        key: SortKey::Title,
        default_order: SortOrder::Asc,
    },
    SortField {
        name: "location",
        key: SortKey::Location,
        default_order: SortOrder::Asc,
    },
    SortField {
        name: "category",
        key: SortKey::Category,
        default_order: SortOrder::Asc,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Default for ListSort {
    fn default() -> Self {
        Self {
            key: DEFAULT_SORT.key,
            order: DEFAULT_SORT.default_order,
        }
    }
}

impl ListSort {
    /// Resolve a sort name (optionally `-` prefixed) and an explicit order.
    /// An explicit order overrides the prefix.
    pub fn resolve(sort_by: Option<&str>, order: Option<SortOrder>) -> ListResult<Self> {
        let (field, prefixed) = match sort_by.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => {
                let (name, descending) = match raw.strip_prefix('-') {
                    Some(name) => (name, true),
                    None => (raw, false),
                };
                let field = ALLOWED_SORTS
                    .iter()
                    .find(|field| field.name.eq_ignore_ascii_case(name))
                    .ok_or_else(|| ListError::invalid(format!("Unsupported sort field: {name}")))?;
                (field, descending.then_some(SortOrder::Desc))
            }
            None => (&DEFAULT_SORT, None),
        };

        Ok(Self {
            key: field.key,
            order: order.or(prefixed).unwrap_or(field.default_order),
        })
    }

    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self.key {
            SortKey::Title => self.order.apply(compare_text(&a.title, &b.title)),
            SortKey::Location => self.order.apply(compare_text(&a.location, &b.location)),
            SortKey::Category => self.order.apply(compare_text(&a.category, &b.category)),
            // Undated records trail in either direction.
            SortKey::StartDate => match (a.start_date, b.start_date) {
                (Some(x), Some(y)) => self.order.apply(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Stable in-place sort; records with equal keys keep their relative order.
pub fn sort_records<R: Borrow<Record>>(records: &mut [R], sort: &ListSort) {
    records.sort_by(|a, b| sort.compare(<R as Borrow<Record>>::borrow(a), <R as Borrow<Record>>::borrow(b)));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Contains,
    Range,
    All,
}

#[derive(Debug, Clone)]
pub struct FilterDescriptor {
    pub field: String,
    pub operator: FilterOperator,
    pub values: Vec<String>,
}

impl FilterDescriptor {
    /// Parse one `field:op:value` expression.
    pub fn parse(raw: &str) -> ListResult<Self> {
        let parts: Vec<&str> = raw.splitn(3, ':').collect();
        if parts.len() != 3 || parts[0].trim().is_empty() {
            return Err(ListError::invalid(format!("Invalid filter syntax: {raw}")));
        }

        let operator = match parts[1].trim().to_ascii_lowercase().as_str() {
            "eq" => FilterOperator::Eq,
            "contains" => FilterOperator::Contains,
            "range" => FilterOperator::Range,
            "all" => FilterOperator::All,
            other => return Err(ListError::invalid(format!("Unsupported filter operator: {other}"))),
        };

        let field = parts[0].trim().to_ascii_lowercase();
        let values = match operator {
            FilterOperator::Eq | FilterOperator::All => {
                // Commas separate values only for list fields; category and
                // location names may contain them.
                let separators: &[char] = if is_list_field(&field) { &['|', ','] } else { &['|'] };
                parts[2]
                    .split(separators)
                    .map(str::trim)
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            FilterOperator::Range => parts[2].split(',').map(|segment| segment.trim().to_string()).collect(),
            // Substring filters take the value verbatim.
            FilterOperator::Contains => vec![parts[2].to_string()],
        };

        Ok(Self {
            field,
            operator,
            values,
        })
    }
}

fn is_list_field(field: &str) -> bool {
    matches!(field, "skills" | "skill" | "status")
}

/// Page size bounds applied when parsing a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Raw list query parameters as they appear in a page URL.
///
/// Query strings carry every value as text, so numbers may arrive as strings
/// and a single `filter` may arrive without the surrounding list.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ListQuery {
    #[serde(deserialize_with = "deserialize_loose_u64")]
    pub page: Option<u64>,
    #[serde(deserialize_with = "deserialize_loose_u64")]
    pub page_size: Option<u64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub q: Option<String>,
    #[serde(deserialize_with = "deserialize_filter_list")]
    pub filter: Vec<String>,
}

/// Accepts a number or a numeric string; empty strings and `null` are absent.
fn deserialize_loose_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a non-negative integer, found {n}"))),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected a non-negative integer, found \"{trimmed}\"")))
        }
        other => Err(D::Error::custom(format!("expected a number, found {other}"))),
    }
}

/// Accepts a single filter string or a list of them.
fn deserialize_filter_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(D::Error::custom(format!("expected a filter string, found {other}"))),
            })
            .collect(),
        other => Err(D::Error::custom(format!("expected a filter string or list, found {other}"))),
    }
}

/// A fully resolved list request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    pub criteria: FilterCriteria,
    pub sort: ListSort,
    pub page: u64,
    pub page_size: u64,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            criteria: FilterCriteria::default(),
            sort: ListSort::default(),
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListRequest {
    #[inline]
    pub fn with_page(mut self, page: u64, page_size: u64) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    #[inline]
    pub fn with_criteria(mut self, criteria: FilterCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    #[inline]
    pub fn with_sort(mut self, sort: ListSort) -> Self {
        self.sort = sort;
        self
    }

    /// Filter, sort and paginate a collection.
    pub fn run<'a>(&self, records: Option<&'a [Record]>) -> Page<&'a Record> {
        let mut matched = filter_records(records, &self.criteria);
        sort_records(&mut matched, &self.sort);
        paginate(Some(matched.as_slice()), self.page, self.page_size)
    }
}

impl ListQuery {
    /// Resolve query parameters into a [`ListRequest`].
    ///
    /// `page` is raised to at least 1 and `page_size` is clamped into
    /// `[1, max_page_size]`. Unknown sort fields and malformed filters are
    /// rejected.
    pub fn into_request(self, limits: &PageLimits) -> ListResult<ListRequest> {
        let max_page_size = limits.max_page_size.max(1);
        let page_size = self
            .page_size
            .unwrap_or(limits.default_page_size)
            .clamp(1, max_page_size);
        let page = self.page.unwrap_or(DEFAULT_PAGE).max(1);

        let sort = ListSort::resolve(self.sort_by.as_deref(), self.sort_order)?;

        let mut criteria = FilterCriteria::default();
        if let Some(q) = self.q {
            criteria.search_term = q;
        }
        for raw in &self.filter {
            let descriptor = FilterDescriptor::parse(raw)?;
            apply_descriptor(&mut criteria, descriptor)?;
        }

        Ok(ListRequest {
            criteria,
            sort,
            page,
            page_size,
        })
    }
}
