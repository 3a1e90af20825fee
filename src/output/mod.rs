pub mod console;
pub mod json;

use serde::{Deserialize, Serialize};

use crate::artifact::history::RunRecord;
use crate::error::Result;
use crate::fix::FixOutcome;
use crate::inspect::RuleInspection;
use crate::pipeline::OrchestrationReport;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Some(Self::Console),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn render_scan(report: &OrchestrationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render_scan(report)),
        OutputFormat::Json => json::render(report),
    }
}

pub fn render_rule(inspection: &RuleInspection, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render_rule(inspection)),
        OutputFormat::Json => json::render(inspection),
    }
}

pub fn render_fix(outcome: &FixOutcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render_fix(outcome)),
        OutputFormat::Json => json::render(outcome),
    }
}

pub fn render_runs(runs: &[RunRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render_runs(runs)),
        OutputFormat::Json => json::render(&runs),
    }
}
