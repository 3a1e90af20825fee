//! External compliance-scanning engine.
//!
//! The orchestrator only talks to the `ScanEngine` trait; `OscapEngine`
//! drives the OpenSCAP command-line tool.

pub mod oscap;
pub mod process;

use std::path::Path;

use crate::error::Result;

pub use oscap::OscapEngine;
pub use process::{ToolCommand, ToolOutput};

/// Inputs for one profile evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EvaluateRequest<'a> {
    pub profile: &'a str,
    pub datastream: &'a Path,
    pub dictionary: &'a Path,
    pub results: &'a Path,
    pub report: &'a Path,
}

/// Operations the pipeline and the rule inspector need from a scan engine.
pub trait ScanEngine {
    /// Evaluate a profile, writing the result document and report.
    fn evaluate(&self, request: &EvaluateRequest<'_>) -> Result<()>;

    /// Generate a remediation script from a result document.
    fn generate_fix(&self, profile: &str, results: &Path, output: &Path) -> Result<()>;

    /// Export the variables resolved for a profile.
    ///
    /// The engine picks the output file name itself and writes it into
    /// `workdir`; callers collect it from there.
    fn export_variables(&self, profile: &str, datastream: &Path, workdir: &Path) -> Result<()>;

    /// Evaluate one diagnostic check, returning the engine's textual verdict.
    fn evaluate_check(
        &self,
        check_id: &str,
        definitions: &Path,
        variables: Option<&Path>,
    ) -> Result<String>;
}
