//! Console reporting for finished runs

use crate::engine::{RunOutcome, RunReport};

/// Prints a run report to stdout
pub fn print_report(report: &RunReport) {
    let heading = match report.outcome {
        RunOutcome::Completed => "finished",
        RunOutcome::Stuck => "stuck, please check fetch_err or parse_err",
    };

    let duration = report
        .finished_at
        .signed_duration_since(report.started_at);

    println!("{heading}");
    println!("saved result for job '{}':", report.name);
    println!("  data records:  {}", report.data);
    println!("  fetch errors:  {}", report.fetch_errors);
    println!("  parse errors:  {}", report.parse_errors);
    println!("  rounds:        {}", report.rounds);
    println!(
        "  duration:      {}.{:03}s",
        duration.num_seconds(),
        duration.num_milliseconds().rem_euclid(1000)
    );
}
