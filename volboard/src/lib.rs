//! volboard core library.
//!
//! The list pipeline behind the volunteer board's browse and dashboard pages:
//! payload normalization, filter predicates, derived percentages and
//! pagination, plus the list view state that drives them.
//!
//! ```
//! use volboard::{FilterCriteria, ListRequest, normalize_json, CategoryRules};
//!
//! let records = normalize_json(
//!     r#"[{"id": 1, "title": "Park cleanup"}, {"id": 2, "title": "Reading buddies"}]"#,
//!     &CategoryRules::default(),
//! )
//! .unwrap();
//!
//! let request = ListRequest::default().with_criteria(FilterCriteria::new().with_category("environment"));
//! let page = request.run(Some(records.as_slice()));
//! assert_eq!(page.total_count, 1);
//! assert_eq!(page.items[0].id, "1");
//! ```

pub mod errors;
pub mod filters;
pub mod metrics;
pub mod normalize;
pub mod pagination;
pub mod query;
pub mod settings;
pub mod types;
pub mod view;

pub use errors::*;
pub use filters::{DateRange, FilterCondition, FilterCriteria, evaluate, filter_records};
pub use metrics::{SkillMatch, StatusTone, match_percentage, progress_percentage, record_match, skill_match};
pub use normalize::{CategoryRules, normalize_json, normalize_payload, normalize_record};
pub use pagination::{Page, paginate};
pub use query::{ListQuery, ListRequest, ListSort, PageLimits, SortOrder, sort_records};
pub use settings::Settings;
pub use types::{RawRecord, Record};
pub use view::{Debounced, FetchOutcome, ListView, RequestTracker, Ticket};
