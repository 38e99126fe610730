use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;

use volboard::{Record, SkillMatch, record_match};

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};
use crate::theme::percentage_color;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Skill Match",
    commands: &[
        "volboard match opportunities.json --skill first-aid --skill driving",
        "volboard match opportunities.json --skill spanish --min 50 --limit 5",
        "volboard --output json match opportunities.json --skill tutoring",
    ],
}];

#[derive(Args, Debug)]
pub struct MatchArgs {
    /// JSON payload of opportunities
    pub file: PathBuf,

    /// Volunteer skill; repeat for several
    #[arg(long = "skill", value_name = "SKILL", required = true)]
    pub skills: Vec<String>,

    /// Hide records below this match percentage
    #[arg(long, value_name = "PCT", default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub min: u8,

    /// Show at most this many records
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRow {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub skill_match: SkillMatch,
}

#[derive(Serialize)]
#[serde(transparent)]
pub struct MatchReport(pub Vec<MatchRow>);

/// Score every record and keep those at or above `min`, best first. Ties keep
/// payload order.
pub fn rank_matches(records: &[Record], skills: &[String], min: u8, limit: Option<usize>) -> Vec<MatchRow> {
    let mut rows: Vec<MatchRow> = records
        .iter()
        .map(|record| MatchRow {
            id: record.id.clone(),
            title: record.title.clone(),
            skill_match: record_match(record, skills),
        })
        .filter(|row| row.skill_match.percentage >= min)
        .collect();
    rows.sort_by(|a, b| b.skill_match.percentage.cmp(&a.skill_match.percentage));
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}

impl TableDisplay for MatchReport {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["ID", "Title", "Match", "Skills", "Missing"]);

        for row in &self.0 {
            let result = &row.skill_match;
            let skills = if result.required == 0 {
                "none required".to_string()
            } else {
                format!("{}/{}", result.matched, result.required)
            };
            table.add_row(vec![
                Cell::new(&row.id),
                Cell::new(&row.title),
                output.colored_cell(format!("{}%", result.percentage), percentage_color(result.percentage)),
                Cell::new(skills),
                Cell::new(result.missing.join(", ")),
            ]);
        }

        table
    }

    fn to_compact(&self) -> String {
        self.0
            .iter()
            .map(|row| format!("{}\t{}%\t{}", row.id, row.skill_match.percentage, row.title))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub async fn handle_match(args: MatchArgs, context: &AppContext, output: &OutputManager) -> Result<()> {
    if args.skills.iter().all(|skill| skill.trim().is_empty()) {
        bail!("At least one non-empty --skill is required");
    }

    let records = context.read_records(&args.file).await?;
    let rows = rank_matches(&records, &args.skills, args.min, args.limit);
    output.verbose(&format!("{} of {} records at or above {}%", rows.len(), records.len(), args.min));

    if rows.is_empty() {
        output.info("No records meet the minimum match");
        return Ok(());
    }

    output.display(&MatchReport(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, skills: &[&str]) -> Record {
        Record {
            id: id.to_string(),
            title: format!("Opportunity {id}"),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rank_matches_orders_by_percentage() {
        let records = vec![
            record("a", &["Driving", "Spanish", "Cooking"]),
            record("b", &["driving"]),
            record("c", &["Carpentry"]),
            record("d", &["Spanish", "Driving"]),
        ];
        let skills = vec!["driving".to_string(), "spanish".to_string()];

        let rows = rank_matches(&records, &skills, 0, None);
        let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
        assert_eq!(rows[2].skill_match.percentage, 67);
        assert_eq!(rows[2].skill_match.missing, vec!["Cooking".to_string()]);
    }

    #[test]
    fn test_rank_matches_min_and_limit() {
        let records = vec![record("a", &["x", "y"]), record("b", &["x"]), record("c", &["z"])];
        let skills = vec!["x".to_string()];

        let rows = rank_matches(&records, &skills, 50, None);
        assert_eq!(rows.len(), 2);

        let rows = rank_matches(&records, &skills, 0, Some(1));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "b");
    }

    #[test]
    fn test_match_row_serializes_flat() {
        let rows = rank_matches(&[record("a", &["x"])], &["x".to_string()], 0, None);
        let json = serde_json::to_value(MatchReport(rows)).unwrap();
        assert_eq!(json[0]["id"], "a");
        assert_eq!(json[0]["percentage"], 100);
        assert_eq!(json[0]["required"], 1);
    }
}
