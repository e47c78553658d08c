//! Colorful console output for planner events.
//!
//! Provides a custom `tracing` layer that formats engine events with colors.
//! Enable the `console` feature and call [`init`] once at startup.

use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();

const DEFAULT_DIRECTIVE: &str = "deltablue_core=info";

/// Initializes console output for the engine.
///
/// Safe to call multiple times - only the first call has effect.
/// `RUST_LOG` overrides the default `deltablue_core=info` filter, e.g.
/// `RUST_LOG=deltablue_core=debug` shows every constraint added or removed.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        // Another subscriber may already be installed by the host.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(PlannerConsoleLayer)
            .try_init();
    });
}

/// A tracing layer that formats planner events with colors.
pub struct PlannerConsoleLayer;

impl<S: Subscriber> Layer<S> for PlannerConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("deltablue") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(*metadata.level(), &visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Debug, Default)]
struct EventVisitor {
    event: Option<String>,
    message: Option<String>,
    constraint: Option<String>,
    strength: Option<String>,
    variable: Option<String>,
    satisfied: Option<bool>,
    evictions: Option<u64>,
    retried: Option<u64>,
    sources: Option<u64>,
    steps: Option<u64>,
    repeat: Option<u64>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        let s = s.trim_matches('"').to_string();
        match field.name() {
            "event" => self.event = Some(s),
            "message" => self.message = Some(s),
            "constraint" => self.constraint = Some(s),
            "strength" => self.strength = Some(s),
            "variable" => self.variable = Some(s),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "message" => self.message = Some(value.to_string()),
            _ => {}
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "satisfied" {
            self.satisfied = Some(value);
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "evictions" => self.evictions = Some(value),
            "retried" => self.retried = Some(value),
            "sources" => self.sources = Some(value),
            "steps" => self.steps = Some(value),
            "repeat" => self.repeat = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value as u64);
    }
}

fn format_event(level: Level, v: &EventVisitor) -> String {
    let body = match v.event.as_deref().unwrap_or("") {
        "constraint_added" => format_constraint_added(v),
        "constraint_removed" => format_constraint_removed(v),
        "plan_extracted" => format_plan_extracted(v),
        "change" => format_change(v),
        "unsatisfiable_required" | "propagation_cycle" => format_diagnostic(v),
        _ => return String::new(),
    };
    format!("{} {} {}", timestamp().bright_black(), level_tag(level), body)
}

fn level_tag(level: Level) -> String {
    match level {
        Level::ERROR => "ERROR".bright_red().to_string(),
        Level::WARN => " WARN".bright_yellow().to_string(),
        Level::INFO => " INFO".bright_green().to_string(),
        Level::DEBUG => "DEBUG".bright_blue().to_string(),
        _ => "TRACE".bright_black().to_string(),
    }
}

fn format_constraint_added(v: &EventVisitor) -> String {
    let constraint = v.constraint.as_deref().unwrap_or("?");
    let strength = v.strength.as_deref().unwrap_or("?");
    let state = if v.satisfied.unwrap_or(false) {
        "satisfied".bright_green().to_string()
    } else {
        "unsatisfied".yellow().to_string()
    };

    format!(
        "{} {} ({}) added: {}, evictions ({})",
        "[Planner]".bright_cyan(),
        constraint.white().bold(),
        strength.bright_magenta(),
        state,
        v.evictions.unwrap_or(0).to_string().yellow()
    )
}

fn format_constraint_removed(v: &EventVisitor) -> String {
    format!(
        "{} {} removed: retried ({})",
        "[Planner]".bright_cyan(),
        v.constraint.as_deref().unwrap_or("?").white().bold(),
        v.retried.unwrap_or(0).to_string().yellow()
    )
}

fn format_plan_extracted(v: &EventVisitor) -> String {
    format!(
        "{} plan extracted: sources ({}), steps ({})",
        "[Plan]".bright_cyan(),
        v.sources.unwrap_or(0).to_string().yellow(),
        v.steps.unwrap_or(0).to_string().bright_magenta().bold()
    )
}

fn format_change(v: &EventVisitor) -> String {
    format!(
        "{} {} changed: steps ({}), repeat ({})",
        "[Solver]".bright_cyan(),
        v.variable.as_deref().unwrap_or("?").white().bold(),
        v.steps.unwrap_or(0).to_string().yellow(),
        v.repeat.unwrap_or(1).to_string().yellow()
    )
}

fn format_diagnostic(v: &EventVisitor) -> String {
    format!(
        "{} {}",
        "[Planner]".bright_cyan(),
        v.message.as_deref().unwrap_or("").bright_red()
    )
}

fn timestamp() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs() % 100000;
            let millis = d.subsec_millis();
            format!("{:5}.{:03}", secs, millis)
        })
        .unwrap_or_else(|_| "    0.000".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visitor(event: &str) -> EventVisitor {
        EventVisitor {
            event: Some(event.to_string()),
            ..EventVisitor::default()
        }
    }

    #[test]
    fn test_unknown_events_are_skipped() {
        assert!(format_event(Level::INFO, &visitor("evicted")).is_empty());
        assert!(format_event(Level::INFO, &EventVisitor::default()).is_empty());
    }

    #[test]
    fn test_constraint_added_line() {
        let mut v = visitor("constraint_added");
        v.constraint = Some("c3".to_string());
        v.strength = Some("strong_default".to_string());
        v.satisfied = Some(true);
        v.evictions = Some(2);

        let line = format_event(Level::DEBUG, &v);
        assert!(line.contains("c3"));
        assert!(line.contains("strong_default"));
        assert!(line.contains("satisfied"));
    }

    #[test]
    fn test_diagnostic_line_carries_message() {
        let mut v = visitor("propagation_cycle");
        v.message = Some("Cycle encountered while propagating c1".to_string());
        assert!(format_event(Level::WARN, &v).contains("Cycle encountered"));
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }
}
