//! Scan orchestration: one engine evaluation, its derived artifacts, and the
//! alias updates that publish them.
//!
//! Each step runs regardless of whether earlier steps failed. Failures are
//! logged and collected into the [`OrchestrationReport`]; only pre-flight
//! problems (missing configuration, unusable scan directory) abort a run.

pub mod report;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::artifact::{self, alias, ArtifactKind, RunSuffix, ScanArtifactSet};
use crate::config::{keys, Config};
use crate::engine::{EvaluateRequest, ScanEngine};
use crate::error::{Result, ScanError};
use crate::transform::{ReportTransform, Tally};

pub use report::{OrchestrationReport, Step, StepReport, StepStatus};

/// Prefix of the scratch directory the variables export runs in.
const SCRATCH_PREFIX: &str = ".scanward-vars-";

/// Values a run needs, resolved from config and the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub scan_dir: PathBuf,
    pub profile: String,
    pub datastream: PathBuf,
    pub dictionary: PathBuf,
}

impl PipelineSettings {
    /// An explicit profile overrides the configured default.
    pub fn resolve(config: &Config, profile: Option<&str>) -> Result<Self> {
        let profile = match profile {
            Some(p) if p.trim().is_empty() => return Err(ScanError::InvalidProfile(p.to_string())),
            Some(p) => p.trim().to_string(),
            None => config.get(keys::PROFILE)?.to_string(),
        };
        if profile.contains('/') {
            return Err(ScanError::InvalidProfile(profile));
        }

        Ok(Self {
            scan_dir: absolute(config.scan_dir()?)?,
            profile,
            datastream: absolute(PathBuf::from(config.get(keys::DATASTREAM)?))?,
            dictionary: absolute(PathBuf::from(config.get(keys::DICTIONARY)?))?,
        })
    }
}

/// Anchor a configured path at the working directory. The variables export
/// runs from a scratch directory, so relative inputs would not resolve there.
fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    Ok(std::env::current_dir()?.join(path))
}

/// Drives the engine and transform through one scan.
pub struct Orchestrator<E, T> {
    engine: E,
    transform: T,
}

impl<E: ScanEngine, T: ReportTransform> Orchestrator<E, T> {
    pub fn new(engine: E, transform: T) -> Self {
        Self { engine, transform }
    }

    pub fn run(&self, settings: &PipelineSettings) -> Result<OrchestrationReport> {
        self.run_with_suffix(settings, RunSuffix::now())
    }

    pub fn run_with_suffix(
        &self,
        settings: &PipelineSettings,
        suffix: RunSuffix,
    ) -> Result<OrchestrationReport> {
        std::fs::create_dir_all(&settings.scan_dir)?;

        let artifacts = ScanArtifactSet::new(&settings.scan_dir, &settings.profile, suffix.clone());
        tracing::info!(
            profile = %settings.profile,
            suffix = %suffix,
            scan_dir = %settings.scan_dir.display(),
            "starting scan"
        );

        let mut run = RunLog::default();
        let results = artifacts.path(ArtifactKind::ResultDocument);
        let report = artifacts.path(ArtifactKind::Report);

        let request = EvaluateRequest {
            profile: &settings.profile,
            datastream: &settings.datastream,
            dictionary: &settings.dictionary,
            results,
            report,
        };
        run.record(Step::Evaluate, self.engine.evaluate(&request));

        run.record(
            Step::Permissions,
            make_readable(results).and_then(|_| make_readable(report)),
        );

        run.record(
            Step::GenerateFix,
            self.engine.generate_fix(
                &settings.profile,
                results,
                artifacts.path(ArtifactKind::FixScript),
            ),
        );

        run.record(
            Step::ExportVariables,
            self.export_variables(settings, artifacts.path(ArtifactKind::Variables)),
        );

        let (aliases, alias_result) = update_aliases(&artifacts);
        run.record(Step::UpdateAliases, alias_result);

        let tally: Option<Tally> = run.record(Step::Tally, self.transform.tally(results));

        let digests: BTreeMap<ArtifactKind, String> = artifacts
            .present()
            .into_iter()
            .filter_map(|kind| artifact::digest(artifacts.path(kind)).ok().map(|d| (kind, d)))
            .collect();

        let report = OrchestrationReport {
            profile: settings.profile.clone(),
            suffix,
            artifacts,
            steps: run.steps,
            aliases,
            digests,
            tally,
        };

        tracing::info!(
            profile = %report.profile,
            failed_steps = report.failed_steps().len(),
            aliases = report.aliases.len(),
            "scan finished"
        );
        Ok(report)
    }

    /// The engine names the export itself, so it runs in a scratch directory
    /// inside the scan directory and the file is renamed into place.
    fn export_variables(&self, settings: &PipelineSettings, target: &Path) -> Result<()> {
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(&settings.scan_dir)?;

        self.engine
            .export_variables(&settings.profile, &settings.datastream, scratch.path())?;

        let produced = capture_variables(scratch.path())?;
        std::fs::rename(&produced, target)?;
        Ok(())
    }
}

#[derive(Default)]
struct RunLog {
    steps: Vec<StepReport>,
}

impl RunLog {
    fn record<T>(&mut self, step: Step, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                tracing::debug!(%step, "step finished");
                self.steps.push(StepReport {
                    step,
                    status: StepStatus::Ok,
                });
                Some(value)
            }
            Err(e) => {
                tracing::warn!(%step, error = %e, "step failed, continuing");
                self.steps.push(StepReport {
                    step,
                    status: StepStatus::Failed {
                        reason: e.to_string(),
                    },
                });
                None
            }
        }
    }
}

/// Add group and world read permission.
#[cfg(unix)]
fn make_readable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o044);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_readable(path: &Path) -> Result<()> {
    std::fs::metadata(path)?;
    Ok(())
}

/// Locate the variables file the engine left in `dir`.
fn capture_variables(dir: &Path) -> Result<PathBuf> {
    let pattern = format!(
        "{}/*variables*.xml",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let mut found: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?
        .flatten()
        .filter(|p| p.is_file())
        .collect();
    found.sort();

    if found.len() > 1 {
        tracing::warn!(
            count = found.len(),
            keeping = %found[0].display(),
            "engine exported several variables files"
        );
    }
    found
        .into_iter()
        .next()
        .ok_or_else(|| ScanError::ArtifactNotFound(dir.join("*variables*.xml")))
}

/// Repoint both aliases of every artifact that was produced. Kinds with no
/// file keep their previous aliases and fail the step; aliases already
/// repointed stay in place.
fn update_aliases(artifacts: &ScanArtifactSet) -> (Vec<PathBuf>, Result<()>) {
    let mut updated = Vec::new();
    let mut problems = Vec::new();

    for kind in ArtifactKind::ALL {
        if !artifacts.path(kind).is_file() {
            problems.push(format!("no {} produced", kind));
            continue;
        }
        match alias::update_kind(artifacts, kind) {
            Ok(links) => updated.extend(links),
            Err(e) => problems.push(format!("{}: {}", kind, e)),
        }
    }

    let result = if problems.is_empty() {
        Ok(())
    } else {
        Err(ScanError::Alias(format!(
            "{} of {} aliases updated; {}",
            updated.len(),
            ArtifactKind::ALL.len() * 2,
            problems.join("; ")
        )))
    };
    (updated, result)
}
