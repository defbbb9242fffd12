//! Text and JSON rendering for command results.
//!
//! Results go to stdout; warnings such as the degraded-mode banner go to
//! stderr so scripts can parse stdout alone.

use anyhow::Result;
use dyouth_auth::{AccessDecision, RouteClass, RouteTable, Verdict};
use dyouth_runtime::config::DyouthConfig;
use dyouth_runtime::{Banner, NavigationOutcome};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn routes(format: Format, table: &RouteTable) -> Result<()> {
    match format {
        Format::Json => print_json(&table.rules()),
        Format::Text => {
            for rule in table.rules() {
                println!("{:<24} {}", rule.pattern.to_string(), rule.class);
            }
            println!("{:<24} {}", "(unmatched)", RouteClass::AuthRequired);
            Ok(())
        }
    }
}

pub fn classify(format: Format, path: &str, class: RouteClass) -> Result<()> {
    match format {
        Format::Json => print_json(&json!({ "path": path, "class": class })),
        Format::Text => {
            println!("{class}");
            Ok(())
        }
    }
}

pub fn verdict(format: Format, path: &str, verdict: &Verdict) -> Result<()> {
    match format {
        Format::Json => print_json(&json!({ "path": path, "verdict": verdict })),
        Format::Text => {
            match verdict {
                Verdict::Decided(AccessDecision::Allow) => println!("allow"),
                Verdict::Decided(AccessDecision::RedirectTo(to)) => println!("redirect {to}"),
                Verdict::Indeterminate => println!("indeterminate"),
            }
            Ok(())
        }
    }
}

pub fn navigation(
    format: Format,
    outcome: &NavigationOutcome,
    banner: Option<&Banner>,
) -> Result<()> {
    if let Some(banner) = banner {
        eprintln!("warning: {} ({})", banner.message, banner.code);
    }

    match format {
        Format::Json => print_json(&json!({ "outcome": outcome, "banner": banner })),
        Format::Text => {
            match outcome {
                NavigationOutcome::Render { path } => println!("render {path}"),
                NavigationOutcome::Redirect { to, .. } => println!("redirect {to}"),
                NavigationOutcome::Stand { path, .. } => println!("stand {path}"),
                NavigationOutcome::Superseded => println!("superseded"),
            }
            Ok(())
        }
    }
}

pub fn line(format: Format, key: &str, value: &str) -> Result<()> {
    match format {
        Format::Json => print_json(&json!({ key: value })),
        Format::Text => {
            println!("{value}");
            Ok(())
        }
    }
}

/// Prints the configuration with the anon key redacted.
pub fn config(format: Format, config: &DyouthConfig) -> Result<()> {
    let mut shown = config.clone();
    if shown.backend.anon_key.is_some() {
        shown.backend.anon_key = Some("***".into());
    }

    match format {
        Format::Json => print_json(&shown),
        Format::Text => {
            print!("{}", toml::to_string_pretty(&shown)?);
            Ok(())
        }
    }
}
