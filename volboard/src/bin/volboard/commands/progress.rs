use anyhow::{Result, bail};
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;

use volboard::progress_percentage;

use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};
use crate::theme::percentage_color;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Progress",
    commands: &[
        "volboard progress --completed 3 --total 4        # 75%",
        "volboard --output compact progress --completed 1 --total 3",
    ],
}];

#[derive(Args, Debug)]
pub struct ProgressArgs {
    /// Completed steps
    #[arg(long)]
    pub completed: u64,

    /// Total steps
    #[arg(long)]
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct ProgressReport {
    pub completed: u64,
    pub total: u64,
    pub percentage: u8,
}

impl ProgressReport {
    pub fn new(completed: u64, total: u64) -> Self {
        Self {
            completed,
            total,
            percentage: progress_percentage(completed, total),
        }
    }
}

impl TableDisplay for ProgressReport {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Completed", "Total", "Progress"]);
        table.add_row(vec![
            Cell::new(self.completed),
            Cell::new(self.total),
            output.colored_cell(format!("{}%", self.percentage), percentage_color(self.percentage)),
        ]);
        table
    }

    fn to_compact(&self) -> String {
        format!("{}/{} {}%", self.completed, self.total, self.percentage)
    }
}

pub fn handle_progress(args: ProgressArgs, output: &OutputManager) -> Result<()> {
    if args.completed > args.total {
        bail!("--completed ({}) exceeds --total ({})", args.completed, args.total);
    }
    let report = ProgressReport::new(args.completed, args.total);
    output.display(&report)?;
    if report.total > 0 && report.completed == report.total {
        output.success("All steps complete");
    }
    Ok(())
}
