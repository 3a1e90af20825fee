use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::artifact::{ArtifactKind, RunSuffix, ScanArtifactSet};
use crate::transform::Tally;

/// Pipeline steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Evaluate,
    Permissions,
    GenerateFix,
    ExportVariables,
    UpdateAliases,
    Tally,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Evaluate => write!(f, "evaluate"),
            Self::Permissions => write!(f, "permissions"),
            Self::GenerateFix => write!(f, "generate-fix"),
            Self::ExportVariables => write!(f, "export-variables"),
            Self::UpdateAliases => write!(f, "update-aliases"),
            Self::Tally => write!(f, "tally"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Ok,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: Step,
    #[serde(flatten)]
    pub status: StepStatus,
}

impl StepReport {
    pub fn is_ok(&self) -> bool {
        self.status == StepStatus::Ok
    }
}

/// Everything one orchestration run did, including the steps that failed.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationReport {
    pub profile: String,
    pub suffix: RunSuffix,
    pub artifacts: ScanArtifactSet,
    pub steps: Vec<StepReport>,
    /// Alias links repointed at this run's artifacts.
    pub aliases: Vec<PathBuf>,
    /// SHA-256 of each artifact present after the run.
    pub digests: BTreeMap<ArtifactKind, String>,
    pub tally: Option<Tally>,
}

impl OrchestrationReport {
    pub fn step(&self, step: Step) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.step == step)
    }

    pub fn failed_steps(&self) -> Vec<&StepReport> {
        self.steps.iter().filter(|s| !s.is_ok()).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.steps.iter().all(StepReport::is_ok)
    }
}
