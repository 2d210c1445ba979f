//! Operator-facing rendering of results and reports.

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use drift_core::{Classification, ReconciliationResult};
use drift_reconcile::Report;

pub const ALL_MERGED: &str = "[All files have merged]";

/// The plain line for one result, or `None` for identical paths.
pub fn result_line(result: &ReconciliationResult) -> Option<String> {
    let class = result.classification();
    let tag = class.tag()?;
    Some(match &class {
        Classification::Failed(reason) => format!("{tag} {}: {reason}", result.path),
        _ => format!("{tag} {}", result.path),
    })
}

/// Print one result as it arrives. Failures go to stderr.
pub fn print_result(result: &ReconciliationResult) {
    let Some(line) = result_line(result) else {
        return;
    };
    match result.classification() {
        Classification::Different => println!("{}", line.yellow()),
        Classification::NewOnLocalOnly => println!("{}", line.cyan()),
        Classification::MissingLocally => println!("{}", line.bright_black()),
        Classification::Failed(_) => eprintln!("{}", line.red()),
        Classification::Identical => {}
    }
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "result")]
    label: &'static str,
    #[tabled(rename = "paths")]
    count: usize,
}

pub fn print_report(report: &Report) {
    if let Some(path) = &report.output {
        println!(
            "Wrote {} path(s) needing attention to {}",
            report.attention.len(),
            path.display()
        );
    }
    if report.all_merged {
        println!("{}", ALL_MERGED.green().bold());
    }

    let s = &report.summary;
    let rows = vec![
        SummaryRow { label: "identical", count: s.identical },
        SummaryRow { label: "different", count: s.different },
        SummaryRow { label: "new on local", count: s.new_on_local_only },
        SummaryRow { label: "missing locally", count: s.missing_locally },
        SummaryRow { label: "failed", count: s.failed },
        SummaryRow { label: "total", count: s.total },
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("Finished in {:.2}s", report.elapsed_secs());
}
