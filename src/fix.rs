use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::artifact::{alias, ArtifactKind};
use crate::engine::ToolCommand;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FixOutcome {
    /// The script ran; its exit code is passed through untouched.
    Applied {
        script: PathBuf,
        exit_code: Option<i32>,
    },
    /// No scan has produced a fix script yet.
    NoFixAvailable,
}

/// Re-run the newest fix script through `shell`.
///
/// The script is trusted local content produced by a previous scan.
pub fn apply_latest_fix(scan_dir: &Path, shell: &str) -> Result<FixOutcome> {
    let Some(script) = alias::resolve(scan_dir, &ArtifactKind::FixScript.global_alias()) else {
        tracing::debug!(scan_dir = %scan_dir.display(), "no fix alias");
        return Ok(FixOutcome::NoFixAvailable);
    };

    tracing::info!(script = %script.display(), "applying fix script");
    let exit_code = ToolCommand::new(shell).arg(&script).status()?;
    if exit_code != Some(0) {
        tracing::warn!(script = %script.display(), ?exit_code, "fix script exited non-zero");
    }

    Ok(FixOutcome::Applied { script, exit_code })
}
