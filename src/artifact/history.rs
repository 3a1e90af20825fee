use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::Result;

use super::{alias, ArtifactKind, RunSuffix};

static VERSIONED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<profile>.+)-(?P<stem>results|fix|variables)-(?P<suffix>\d{4}-\d{6})\.(?P<ext>xml|html|sh)$")
        .unwrap()
});

/// One past orchestration run, reconstructed from the files it left behind.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub profile: String,
    pub suffix: RunSuffix,
    pub kinds: BTreeSet<ArtifactKind>,
    /// The global result-document alias points at this run.
    pub current: bool,
}

impl RunRecord {
    pub fn is_complete(&self) -> bool {
        self.kinds.len() == ArtifactKind::ALL.len()
    }
}

/// Split a versioned artifact file name into profile, kind, suffix.
pub fn parse_versioned_name(name: &str) -> Option<(String, ArtifactKind, RunSuffix)> {
    let caps = VERSIONED_NAME.captures(name)?;
    let kind = ArtifactKind::from_parts(&caps["stem"], &caps["ext"])?;
    let suffix = RunSuffix::parse(&caps["suffix"])?;
    Some((caps["profile"].to_string(), kind, suffix))
}

/// List runs found in the scan directory, newest suffix first.
pub fn list_runs(scan_dir: &Path) -> Result<Vec<RunRecord>> {
    if !scan_dir.is_dir() {
        return Ok(Vec::new());
    }

    let current = alias::target_name(scan_dir, &ArtifactKind::ResultDocument.global_alias());
    let mut runs: BTreeMap<(RunSuffix, String), RunRecord> = BTreeMap::new();

    for entry in walkdir::WalkDir::new(scan_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .flatten()
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        let Some((profile, kind, suffix)) = parse_versioned_name(&name) else {
            continue;
        };
        let is_current = kind == ArtifactKind::ResultDocument
            && current.as_deref() == Some(name.as_ref());

        let record = runs
            .entry((suffix.clone(), profile.clone()))
            .or_insert_with(|| RunRecord {
                profile,
                suffix,
                kinds: BTreeSet::new(),
                current: false,
            });
        record.kinds.insert(kind);
        record.current |= is_current;
    }

    Ok(runs.into_values().rev().collect())
}
