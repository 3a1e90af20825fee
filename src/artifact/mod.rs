//! Artifact naming, alias links, and run history for the scan directory.
//!
//! Every run writes `{profile}-{stem}-{suffix}.{ext}` files and then repoints
//! `{profile}-{stem}.{ext}` and `{stem}.{ext}` at them.

pub mod alias;
pub mod history;
pub mod suffix;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::Digest;

use crate::error::Result;

pub use suffix::RunSuffix;

/// The four files produced by one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    ResultDocument,
    Report,
    FixScript,
    Variables,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::ResultDocument,
        ArtifactKind::Report,
        ArtifactKind::FixScript,
        ArtifactKind::Variables,
    ];

    pub fn stem(self) -> &'static str {
        match self {
            Self::ResultDocument | Self::Report => "results",
            Self::FixScript => "fix",
            Self::Variables => "variables",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::ResultDocument | Self::Variables => "xml",
            Self::Report => "html",
            Self::FixScript => "sh",
        }
    }

    pub fn from_parts(stem: &str, extension: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.stem() == stem && k.extension() == extension)
    }

    pub fn versioned_name(self, profile: &str, suffix: &RunSuffix) -> String {
        format!("{}-{}-{}.{}", profile, self.stem(), suffix, self.extension())
    }

    pub fn profile_alias(self, profile: &str) -> String {
        format!("{}-{}.{}", profile, self.stem(), self.extension())
    }

    pub fn global_alias(self) -> String {
        format!("{}.{}", self.stem(), self.extension())
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResultDocument => write!(f, "result document"),
            Self::Report => write!(f, "report"),
            Self::FixScript => write!(f, "fix script"),
            Self::Variables => write!(f, "variables export"),
        }
    }
}

/// Paths of the artifacts belonging to one run of one profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanArtifactSet {
    pub profile: String,
    pub suffix: RunSuffix,
    pub dir: PathBuf,
    pub paths: BTreeMap<ArtifactKind, PathBuf>,
}

impl ScanArtifactSet {
    pub fn new(dir: &Path, profile: &str, suffix: RunSuffix) -> Self {
        let paths = ArtifactKind::ALL
            .into_iter()
            .map(|kind| (kind, dir.join(kind.versioned_name(profile, &suffix))))
            .collect();
        Self {
            profile: profile.to_string(),
            suffix,
            dir: dir.to_path_buf(),
            paths,
        }
    }

    pub fn path(&self, kind: ArtifactKind) -> &Path {
        // `new` fills every kind.
        &self.paths[&kind]
    }

    /// Kinds whose file is present on disk.
    pub fn present(&self) -> Vec<ArtifactKind> {
        ArtifactKind::ALL
            .into_iter()
            .filter(|&k| self.path(k).is_file())
            .collect()
    }
}

/// Hex SHA-256 of a file's content.
pub fn digest(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(hex::encode(sha2::Sha256::digest(&bytes)))
}
