use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::{RuleOutcome, RuleResult, Severity};

/// Rule counts for one severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RuleCounts {
    pub passing: usize,
    pub failing: usize,
    /// `error` and `unknown` results.
    pub errored: usize,
    /// Not applicable, not checked, not selected, informational.
    pub skipped: usize,
}

impl RuleCounts {
    fn record(&mut self, result: RuleResult) {
        match result {
            RuleResult::Pass | RuleResult::Fixed => self.passing += 1,
            RuleResult::Fail => self.failing += 1,
            RuleResult::Error | RuleResult::Unknown => self.errored += 1,
            RuleResult::NotApplicable
            | RuleResult::NotChecked
            | RuleResult::NotSelected
            | RuleResult::Informational => self.skipped += 1,
        }
    }

    fn evaluated(&self) -> usize {
        self.passing + self.failing + self.errored
    }
}

/// Pass/fail summary of a result document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub by_severity: BTreeMap<Severity, RuleCounts>,
}

impl Tally {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a RuleOutcome>) -> Self {
        let mut by_severity: BTreeMap<Severity, RuleCounts> = BTreeMap::new();
        for outcome in outcomes {
            by_severity
                .entry(outcome.severity)
                .or_default()
                .record(outcome.result);
        }
        Self { by_severity }
    }

    pub fn counts(&self, severity: Severity) -> RuleCounts {
        self.by_severity.get(&severity).copied().unwrap_or_default()
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut any = false;
        for (severity, counts) in self.by_severity.iter().rev() {
            if counts.evaluated() == 0 {
                continue;
            }
            any = true;
            write!(
                f,
                "{} severity: {} passing and {} failing",
                severity, counts.passing, counts.failing
            )?;
            if counts.errored > 0 {
                write!(f, " ({} errored)", counts.errored)?;
            }
            writeln!(f)?;
        }
        if !any {
            writeln!(f, "no evaluated rules")?;
        }
        Ok(())
    }
}
