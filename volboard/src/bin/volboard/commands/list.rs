use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use comfy_table::{Cell, Table};
use serde::Serialize;

use volboard::filters::parse_date_bound;
use volboard::{ListQuery, ListRequest, Page, Record, SortOrder, StatusTone};

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};
use crate::theme::tone_color;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Browse",
        commands: &[
            "volboard list opportunities.json                      # First page, soonest first",
            "volboard list opportunities.json --page 2 --page-size 20",
            "volboard list opportunities.json --sort-by=-title     # Title, descending",
        ],
    },
    ExampleGroup {
        title: "Filter",
        commands: &[
            "volboard list opportunities.json --search park --category environment",
            "volboard list opportunities.json --from 2024-06-01 --to 2024-06-30",
            "volboard list opportunities.json --skill driving --skill spanish",
            "volboard list applications.json --filter status:eq:pending,accepted",
        ],
    },
];

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SortOrderArg {
    Asc,
    Desc,
}

impl From<SortOrderArg> for SortOrder {
    fn from(value: SortOrderArg) -> Self {
        match value {
            SortOrderArg::Asc => SortOrder::Asc,
            SortOrderArg::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// JSON payload (array or {"data": [...]} envelope)
    pub file: PathBuf,

    /// Free-text search over title, organization, location and description
    #[arg(short, long)]
    pub search: Option<String>,

    /// Exact category, or "all"
    #[arg(short, long)]
    pub category: Option<String>,

    /// Location substring
    #[arg(short, long)]
    pub location: Option<String>,

    /// Earliest start date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// Latest start date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,

    /// Required skill; repeat to require several
    #[arg(long = "skill", value_name = "SKILL")]
    pub skills: Vec<String>,

    /// Accepted status; repeat to accept several
    #[arg(long = "status", value_name = "STATUS")]
    pub statuses: Vec<String>,

    /// Extra filter in field:op:value form
    #[arg(short = 'f', long = "filter", value_name = "FIELD:OP:VALUE")]
    pub filters: Vec<String>,

    /// Sort field; prefix with '-' for descending
    #[arg(long)]
    pub sort_by: Option<String>,

    #[arg(long, value_enum)]
    pub sort_order: Option<SortOrderArg>,

    /// 1-indexed page number
    #[arg(short, long)]
    pub page: Option<u64>,

    #[arg(long)]
    pub page_size: Option<u64>,
}

impl ListArgs {
    /// Resolve the arguments into a request. Dedicated flags override the
    /// matching `--filter` entries.
    pub fn to_request(&self, context: &AppContext) -> Result<ListRequest> {
        let query = ListQuery {
            page: self.page,
            page_size: self.page_size,
            sort_by: self.sort_by.clone(),
            sort_order: self.sort_order.map(Into::into),
            q: self.search.clone(),
            filter: self.filters.clone(),
        };
        let mut request = query
            .into_request(&context.settings.page_limits())
            .context("Invalid list query")?;

        let criteria = &mut request.criteria;
        if let Some(category) = &self.category {
            criteria.category = category.clone();
        }
        if let Some(location) = &self.location {
            criteria.location = location.clone();
        }
        if self.from.is_some() {
            criteria.date_range.start = parse_date_bound(self.from.as_ref()).context("Invalid --from")?;
        }
        if self.to.is_some() {
            criteria.date_range.end = parse_date_bound(self.to.as_ref()).context("Invalid --to")?;
        }
        criteria.skills.extend(self.skills.iter().cloned());
        criteria.statuses.extend(self.statuses.iter().cloned());

        Ok(request)
    }
}

/// A rendered page of records.
#[derive(Serialize)]
#[serde(transparent)]
pub struct RecordPage(pub Page<Record>);

impl TableDisplay for RecordPage {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(
            &mut table,
            &["ID", "Title", "Organization", "Category", "Location", "Start", "Skills", "Status"],
        );

        for record in &self.0.items {
            let start = record
                .start_date
                .map(|date| date.to_string())
                .unwrap_or_else(|| "-".to_string());
            let status = match &record.status {
                Some(status) => output.colored_cell(status, tone_color(StatusTone::from_status(status))),
                None => Cell::new("-"),
            };
            table.add_row(vec![
                Cell::new(&record.id),
                Cell::new(&record.title),
                Cell::new(&record.organization),
                Cell::new(&record.category),
                Cell::new(&record.location),
                Cell::new(start),
                Cell::new(record.skills.join(", ")),
                status,
            ]);
        }

        table
    }

    fn to_compact(&self) -> String {
        self.0
            .items
            .iter()
            .map(|record| format!("{}\t{}\t[{}]", record.id, record.title, record.category))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn footer(&self) -> Option<String> {
        let page = &self.0;
        Some(format!(
            "Page {} of {} ({} matching records)",
            page.page,
            page.total_pages.max(1),
            page.total_count
        ))
    }
}

pub async fn handle_list(args: ListArgs, context: &AppContext, output: &OutputManager) -> Result<()> {
    let request = args.to_request(context)?;
    let records = context.read_records(&args.file).await?;
    output.verbose(&format!("Loaded {} records from {}", records.len(), args.file.display()));

    let page = request.run(Some(records.as_slice())).map(Record::clone);

    if page.total_count == 0 {
        output.info("No records match the current filters");
        return Ok(());
    }
    if page.is_out_of_range() {
        output.warning(&format!(
            "Page {} is past the last page ({})",
            page.page, page.total_pages
        ));
    }

    output.display(&RecordPage(page))
}
