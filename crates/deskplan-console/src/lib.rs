//! Colorful console output for pipeline events.
//!
//! Provides a custom `tracing` layer that formats deskplan events with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (instance/phase start and end, epsilon, batch)
//! - **WARN**: Accepted incumbents, unusable desks, isolation mismatches
//! - **ERROR**: Aborted instances
//! - **DEBUG**: Model sizes per constraint family (not rendered, use a fmt layer)

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};


static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();

const DEFAULT_FILTER: &str = "deskplan_solver=info,deskplan_cli=info";

/// Package version for banner display.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initializes the console output.
///
/// Safe to call multiple times; only the first call has effect.
/// Prints the banner and installs the layer behind `RUST_LOG`, falling back
/// to `info` for the pipeline crates.
pub fn init() {
    INIT.get_or_init(|| {
        EPOCH.get_or_init(Instant::now);
        print_banner();

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(DeskplanConsoleLayer)
            .try_init();
    });
}

fn elapsed_secs() -> f64 {
    EPOCH
        .get()
        .map(|epoch| epoch.elapsed().as_secs_f64())
        .unwrap_or(0.0)
}

fn print_banner() {
    let banner = r#"
     _           _          _
  __| | ___  ___| | ___ __ | | __ _ _ __
 / _` |/ _ \/ __| |/ / '_ \| |/ _` | '_ \
| (_| |  __/\__ \   <| |_) | | (_| | | | |
 \__,_|\___||___/_|\_\ .__/|_|\__,_|_| |_|
                     |_|
"#;

    let version_line = format!("        v{} - Two-Phase Desk Scheduler\n", VERSION);

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats deskplan events with colors.
pub struct DeskplanConsoleLayer;

impl<S: Subscriber> Layer<S> for DeskplanConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("deskplan") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    message: Option<String>,
    instance: Option<String>,
    phase: Option<String>,
    stage: Option<String>,
    status: Option<String>,
    error: Option<String>,
    solver: Option<String>,
    path: Option<String>,
    desk: Option<String>,
    employee: Option<String>,
    employees: Option<u64>,
    desks: Option<u64>,
    days: Option<u64>,
    groups: Option<u64>,
    zones: Option<u64>,
    variables: Option<u64>,
    constraints: Option<u64>,
    time_limit_s: Option<u64>,
    duration_ms: Option<u64>,
    total_presence: Option<u64>,
    satisfied: Option<u64>,
    epsilon: Option<u64>,
    cohesion_total: Option<u64>,
    instances: Option<u64>,
    succeeded: Option<u64>,
    failed: Option<u64>,
    penalties: Option<u64>,
    recomputed: Option<u64>,
    objective: Option<f64>,
    percentage: Option<f64>,
    parallel: Option<bool>,
}

impl EventVisitor {
    fn set_str(&mut self, name: &str, value: String) {
        let slot = match name {
            "event" => &mut self.event,
            "message" => &mut self.message,
            "instance" => &mut self.instance,
            "phase" => &mut self.phase,
            "stage" => &mut self.stage,
            "status" => &mut self.status,
            "error" => &mut self.error,
            "solver" => &mut self.solver,
            "path" => &mut self.path,
            "desk" => &mut self.desk,
            "employee" => &mut self.employee,
            _ => return,
        };
        *slot = Some(value);
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.set_str(field.name(), s.trim_matches('"').to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.set_str(field.name(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        let slot = match field.name() {
            "employees" => &mut self.employees,
            "desks" => &mut self.desks,
            "days" => &mut self.days,
            "groups" => &mut self.groups,
            "zones" => &mut self.zones,
            "variables" => &mut self.variables,
            "constraints" => &mut self.constraints,
            "time_limit_s" => &mut self.time_limit_s,
            "duration_ms" => &mut self.duration_ms,
            "total_presence" => &mut self.total_presence,
            "satisfied" => &mut self.satisfied,
            "epsilon" => &mut self.epsilon,
            "cohesion_total" => &mut self.cohesion_total,
            "instances" => &mut self.instances,
            "succeeded" => &mut self.succeeded,
            "failed" => &mut self.failed,
            "penalties" => &mut self.penalties,
            "recomputed" => &mut self.recomputed,
            _ => return,
        };
        *slot = Some(value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match field.name() {
            "objective" => self.objective = Some(value),
            "percentage" => self.percentage = Some(value),
            _ => {}
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "parallel" {
            self.parallel = Some(value);
        }
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    let event = v.event.as_deref().unwrap_or("");

    match event {
        "batch_start" => format_batch_start(v),
        "batch_end" => format_batch_end(v),
        "dataset_loaded" => format_dataset_loaded(v),
        "instance_start" => format_instance_start(v),
        "instance_end" => format_instance_end(v),
        "instance_failed" => format_instance_failed(v),
        "phase_start" => format_phase_start(v),
        "phase_end" => format_phase_end(v),
        "epsilon" => format_epsilon(v),
        "artifact_saved" => format_artifact_saved(v),
        _ if level == Level::WARN => format_warning(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>8.3}s", elapsed_secs()).bright_black().to_string()
}

fn count(value: Option<u64>) -> String {
    value.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn instance(v: &EventVisitor) -> &str {
    v.instance.as_deref().unwrap_or("?")
}

fn format_batch_start(v: &EventVisitor) -> String {
    let mode = if v.parallel.unwrap_or(false) {
        "parallel"
    } else {
        "sequential"
    };
    format!(
        "{} {} Batch │ {} instances │ {}",
        format_elapsed(),
        "▶".bright_green().bold(),
        count(v.instances).bright_yellow(),
        mode.white()
    )
}

fn format_batch_end(v: &EventVisitor) -> String {
    let failed = v.failed.unwrap_or(0);
    let failed_text = format!("{} failed", count(v.failed));
    let failed_colored = if failed > 0 {
        failed_text.bright_red().bold().to_string()
    } else {
        failed_text.bright_black().to_string()
    };
    format!(
        "{} {} Batch complete │ {} │ {} succeeded │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
        count(v.succeeded).bright_green(),
        failed_colored
    )
}

fn format_dataset_loaded(v: &EventVisitor) -> String {
    format!(
        "{} {} {} │ {} employees │ {} desks │ {} days │ {} groups │ {} zones",
        format_elapsed(),
        "●".bright_blue(),
        instance(v).white().bold(),
        count(v.employees).bright_yellow(),
        count(v.desks).bright_yellow(),
        count(v.days).bright_yellow(),
        count(v.groups).bright_yellow(),
        count(v.zones).bright_yellow()
    )
}

fn format_instance_start(v: &EventVisitor) -> String {
    format!(
        "{} {} {} started",
        format_elapsed(),
        "▶".bright_green(),
        instance(v).white().bold()
    )
}

fn format_instance_end(v: &EventVisitor) -> String {
    format!(
        "{} {} {} done │ {} │ {} preferences met │ cohesion {}",
        format_elapsed(),
        "■".bright_cyan(),
        instance(v).white().bold(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
        count(v.satisfied).bright_green(),
        count(v.cohesion_total).bright_magenta().bold()
    )
}

fn format_instance_failed(v: &EventVisitor) -> String {
    format!(
        "{} {} {} failed during {}: {}",
        format_elapsed(),
        "✗".bright_red().bold(),
        instance(v).white().bold(),
        v.stage.as_deref().unwrap_or("?").bright_red(),
        v.error.as_deref().unwrap_or("")
    )
}

fn format_phase_start(v: &EventVisitor) -> String {
    let phase = v.phase.as_deref().unwrap_or("unknown");
    let mut output = format!(
        "{}   {} {} phase │ {} variables │ {} constraints",
        format_elapsed(),
        "▶".bright_blue(),
        phase.white().bold(),
        count(v.variables).bright_yellow(),
        count(v.constraints).bright_yellow()
    );
    if let Some(limit) = v.time_limit_s {
        output.push_str(&format!(
            " │ {}s limit",
            limit.to_formatted_string(&Locale::en).bright_yellow()
        ));
    }
    if let Some(solver) = &v.solver {
        output.push_str(&format!(" │ {}", solver.bright_black()));
    }
    output
}

fn format_phase_end(v: &EventVisitor) -> String {
    let phase = v.phase.as_deref().unwrap_or("unknown");
    let status = v.status.as_deref().unwrap_or("unknown");
    format!(
        "{}   {} {} phase ended │ {} │ objective {} │ {}",
        format_elapsed(),
        "◀".bright_blue(),
        phase.white().bold(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
        format_objective(v.objective.unwrap_or(0.0)).bright_magenta().bold(),
        format_status(status)
    )
}

fn format_epsilon(v: &EventVisitor) -> String {
    format!(
        "{}   {} epsilon {} │ {} of {} presences on preferred days ({})",
        format_elapsed(),
        "ε".bright_cyan(),
        count(v.epsilon).bright_magenta().bold(),
        count(v.satisfied).bright_green(),
        count(v.total_presence).white(),
        format!("{:.2}%", v.percentage.unwrap_or(0.0)).yellow()
    )
}

fn format_artifact_saved(v: &EventVisitor) -> String {
    format!(
        "{}   {} saved {}",
        format_elapsed(),
        "↓".bright_black(),
        v.path.as_deref().unwrap_or("").bright_black()
    )
}

fn format_warning(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} {}",
        format_elapsed(),
        "⚠".yellow().bold(),
        v.event.as_deref().unwrap_or("warning").yellow()
    );
    if let Some(instance) = &v.instance {
        output.push_str(&format!(" │ {}", instance.white().bold()));
    }
    if let Some(phase) = &v.phase {
        output.push_str(&format!(" │ {}", phase));
    }
    for subject in [&v.desk, &v.employee].into_iter().flatten() {
        output.push_str(&format!(" │ {}", subject));
    }
    if let (Some(penalties), Some(recomputed)) = (v.penalties, v.recomputed) {
        output.push_str(&format!(" │ {} reported vs {} recomputed", penalties, recomputed));
    }
    if let Some(message) = &v.message {
        output.push_str(&format!(" │ {}", message.bright_black()));
    }
    output
}

fn format_status(status: &str) -> String {
    match status {
        "optimal" => status.bright_green().bold().to_string(),
        s if s.starts_with("time limit") => status.yellow().bold().to_string(),
        _ => status.bright_red().bold().to_string(),
    }
}

fn format_objective(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        (value as i64).to_formatted_string(&Locale::en)
    } else {
        format!("{:.3}", value)
    }
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}
