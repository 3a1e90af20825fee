//! scanward — compliance scan orchestrator for OpenSCAP.
//!
//! Runs a profile evaluation through `oscap`, keeps every run's result
//! document, report, fix script, and variables export under a timestamped
//! name, and points stable aliases at the newest ones. Individual rules can
//! be inspected and the latest fix re-applied from those aliases.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use scanward::config::Config;
//!
//! let config = Config::load(Path::new("scanward.toml")).unwrap();
//! let report = scanward::run_scan(None, &config).unwrap();
//! println!("failed steps: {}", report.failed_steps().len());
//! ```

pub mod artifact;
pub mod config;
pub mod engine;
pub mod error;
pub mod fix;
pub mod inspect;
pub mod output;
pub mod pipeline;
pub mod transform;

use config::Config;
use engine::OscapEngine;
use error::Result;
use fix::FixOutcome;
use inspect::{RuleInspection, RuleInspector};
use pipeline::{OrchestrationReport, Orchestrator, PipelineSettings};
use transform::XccdfTransform;

/// Run one scan of `profile` (or the configured default).
///
/// Fails only when the run cannot start; step failures are in the report.
pub fn run_scan(profile: Option<&str>, config: &Config) -> Result<OrchestrationReport> {
    let settings = PipelineSettings::resolve(config, profile)?;
    let orchestrator = Orchestrator::new(OscapEngine::new(config.oscap()), XccdfTransform);
    orchestrator.run(&settings)
}

/// Look up one rule in the current result document.
pub fn inspect_rule(rule_id: &str, config: &Config) -> Result<RuleInspection> {
    let scan_dir = config.scan_dir()?;
    let engine = OscapEngine::new(config.oscap());
    RuleInspector::new(&engine, &XccdfTransform, config.definitions_dir())
        .inspect(rule_id, &scan_dir)
}

/// Re-run the newest fix script.
pub fn apply_latest_fix(config: &Config) -> Result<FixOutcome> {
    let scan_dir = config.scan_dir()?;
    fix::apply_latest_fix(&scan_dir, config.fix_shell())
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::config::keys;
    use crate::error::ScanError;

    #[test]
    fn scan_without_config_fails_before_running_anything() {
        let err = run_scan(None, &Config::default()).unwrap_err();
        assert!(matches!(err, ScanError::ConfigMissing(_)));
    }

    #[test]
    fn fix_without_scan_dir_is_config_missing() {
        let err = apply_latest_fix(&Config::default()).unwrap_err();
        assert!(matches!(err, ScanError::ConfigMissing(key) if key == keys::SCAN_DIR));
    }

    #[test]
    fn rule_lookup_before_any_scan() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_pairs([(keys::SCAN_DIR, dir.path().to_string_lossy())]);
        let inspection = inspect_rule("accounts_tmout", &config).unwrap();
        assert!(matches!(inspection, RuleInspection::NoResults { .. }));
    }
}
