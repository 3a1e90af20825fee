//! Reading outcomes back out of a result document.

pub mod tally;
pub mod xccdf;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use tally::{RuleCounts, Tally};
pub use xccdf::XccdfTransform;

/// Lookups the tally printer and the rule inspector need from a result document.
pub trait ReportTransform {
    /// Pass/fail counts grouped by severity.
    fn tally(&self, results: &Path) -> Result<Tally>;

    /// Outcome of one rule, or `None` when no rule-result matches.
    fn rule_outcome(&self, results: &Path, rule_id: &str) -> Result<Option<RuleOutcome>>;

    /// Every rule identifier present in the document.
    fn rule_ids(&self, results: &Path) -> Result<Vec<String>>;

    /// Bare identifier of the diagnostic check behind a rule.
    ///
    /// Callers that already hold the [`RuleOutcome`] read `outcome.check`
    /// instead; the rule inspector does, since it also needs the href.
    fn check_id(&self, results: &Path, rule_id: &str) -> Result<Option<String>> {
        Ok(self
            .rule_outcome(results, rule_id)?
            .and_then(|o| o.check)
            .map(|c| c.name))
    }
}

/// XCCDF rule severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Unknown,
    Info,
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unknown" => Some(Self::Unknown),
            "info" | "informational" => Some(Self::Info),
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Info => write!(f, "info"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Result recorded for one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleResult {
    Pass,
    Fail,
    Error,
    Unknown,
    NotApplicable,
    NotChecked,
    NotSelected,
    Informational,
    Fixed,
}

impl RuleResult {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pass" => Some(Self::Pass),
            "fail" => Some(Self::Fail),
            "error" => Some(Self::Error),
            "unknown" => Some(Self::Unknown),
            "notapplicable" => Some(Self::NotApplicable),
            "notchecked" => Some(Self::NotChecked),
            "notselected" => Some(Self::NotSelected),
            "informational" => Some(Self::Informational),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }
}

impl std::fmt::Display for RuleResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
            Self::Error => write!(f, "error"),
            Self::Unknown => write!(f, "unknown"),
            Self::NotApplicable => write!(f, "notapplicable"),
            Self::NotChecked => write!(f, "notchecked"),
            Self::NotSelected => write!(f, "notselected"),
            Self::Informational => write!(f, "informational"),
            Self::Fixed => write!(f, "fixed"),
        }
    }
}

/// Reference from a rule to the diagnostic check that produced its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRef {
    /// Check identifier inside the definitions file.
    pub name: String,
    /// Definitions file, relative to the content directory.
    pub href: Option<String>,
}

impl CheckRef {
    pub fn definitions_path(&self, content_dir: &Path) -> Option<PathBuf> {
        self.href.as_ref().map(|h| content_dir.join(h))
    }
}

/// Outcome of one rule in the current result document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub rule_id: String,
    pub result: RuleResult,
    pub severity: Severity,
    pub check: Option<CheckRef>,
}

/// Full `idref` match, or the short name after `_rule_`.
pub fn rule_id_matches(idref: &str, wanted: &str) -> bool {
    if idref == wanted {
        return true;
    }
    idref
        .rsplit_once("_rule_")
        .is_some_and(|(_, short)| short == wanted)
}
