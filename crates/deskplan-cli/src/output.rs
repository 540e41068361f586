//! Human-readable and JSON rendering of results.

use deskplan::{BatchReport, ScheduleReport};
use owo_colors::OwoColorize;
use serde_json::json;

pub fn batch_json(report: &BatchReport) -> serde_json::Result<String> {
    let results: Vec<_> = report
        .results
        .iter()
        .map(|result| match result {
            Ok(outcome) => json!({ "ok": outcome }),
            Err(failure) => json!({
                "failed": {
                    "instance_id": failure.instance_id,
                    "stage": failure.stage,
                    "error": failure.error.to_string(),
                }
            }),
        })
        .collect();
    serde_json::to_string_pretty(&results)
}

pub fn print_batch(report: &BatchReport) {
    for result in &report.results {
        match result {
            Ok(outcome) => {
                println!();
                println!("{}", format!("== {} ==", outcome.instance_id).bright_cyan().bold());
                println!("{}", outcome.summary);
                println!(
                    "preference: {} │ epsilon {} │ cohesion: {}",
                    outcome.preference.report.status,
                    outcome.epsilon,
                    outcome.cohesion.report.status
                );
                print_report(&outcome.cohesion.report);
            }
            Err(failure) => {
                println!();
                println!("{} {}", "✗".bright_red().bold(), failure);
            }
        }
    }
    let failed = report.failed().count();
    println!();
    println!(
        "{} succeeded, {} failed",
        report.succeeded().count().bright_green(),
        if failed > 0 {
            failed.bright_red().to_string()
        } else {
            failed.to_string()
        }
    );
}

pub fn print_report(report: &ScheduleReport) {
    let d = &report.diagnostics;
    println!(
        "{} {} ({})",
        report.instance_id.white().bold(),
        report.phase,
        report.status
    );
    println!(
        "  preferences: {} of {} presences ({:.2}%)",
        d.metrics.satisfied_preferences, d.metrics.total_presence, d.metrics.satisfaction_percentage
    );
    if d.penalized {
        println!(
            "  cohesion: spread {} + solo {} + isolation {} = {}",
            d.cohesion.zone_spread, d.cohesion.solo, d.cohesion.isolation, d.cohesion.total
        );
        if !d.isolation_consistent() {
            println!(
                "  {} isolation penalties differ from the recomputed triples",
                "⚠".yellow().bold()
            );
        }
    }

    println!("  {}", "employees".bold());
    for employee in &report.employees {
        println!("    {}", employee);
    }
    println!("  {}", "meetings".bold());
    for meeting in &report.meetings {
        println!(
            "    {} meets {}: zones [{}], members [{}]",
            meeting.group,
            meeting.day,
            meeting.zones.join(", "),
            meeting.members.join(", ")
        );
    }
    if !d.solo_penalties.is_empty() {
        println!("  {}", "below attendance floor".bold());
        for row in &d.solo_penalties {
            println!("    {} ({})", row.employee, row.group);
        }
    }
    if !d.isolation_penalties.is_empty() {
        println!("  {}", "isolated members".bold());
        for cell in &d.isolation_penalties {
            println!("    {} in {} on {}", cell.group, cell.zone, cell.day);
        }
    }
}
