//! Stable names pointing at the newest artifact of each kind.
//!
//! An alias is replaced by creating the new link under a temporary name and
//! renaming it over the old one, so a reader sees either the previous
//! artifact or the new one, never a missing alias.

use std::path::{Path, PathBuf};

use crate::error::{Result, ScanError};

use super::{ArtifactKind, ScanArtifactSet};

/// Point `dir/alias` at `target`, which must live in `dir`.
pub fn repoint(dir: &Path, alias: &str, target: &Path) -> Result<PathBuf> {
    let target_name = target
        .file_name()
        .ok_or_else(|| ScanError::ArtifactNotFound(target.to_path_buf()))?;
    if !target.is_file() {
        return Err(ScanError::ArtifactNotFound(target.to_path_buf()));
    }

    let link = dir.join(alias);
    let staging = dir.join(format!(".{}.{}.tmp", alias, std::process::id()));
    if staging.symlink_metadata().is_ok() {
        std::fs::remove_file(&staging)?;
    }

    stage(target, Path::new(target_name), &staging)?;
    std::fs::rename(&staging, &link)?;

    tracing::debug!(alias = %link.display(), target = %target.display(), "alias updated");
    Ok(link)
}

#[cfg(unix)]
fn stage(_target: &Path, target_name: &Path, staging: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target_name, staging)?;
    Ok(())
}

#[cfg(not(unix))]
fn stage(target: &Path, _target_name: &Path, staging: &Path) -> Result<()> {
    std::fs::copy(target, staging)?;
    Ok(())
}

/// Repoint the profile-scoped and global alias for one kind.
pub fn update_kind(set: &ScanArtifactSet, kind: ArtifactKind) -> Result<[PathBuf; 2]> {
    let target = set.path(kind);
    let scoped = repoint(&set.dir, &kind.profile_alias(&set.profile), target)?;
    let global = repoint(&set.dir, &kind.global_alias(), target)?;
    Ok([scoped, global])
}

/// Resolve an alias to its path if it currently leads to a file.
///
/// Dangling links resolve to `None`.
pub fn resolve(dir: &Path, alias: &str) -> Option<PathBuf> {
    let path = dir.join(alias);
    path.is_file().then_some(path)
}

/// File name the alias points at, if it is a link.
pub fn target_name(dir: &Path, alias: &str) -> Option<String> {
    std::fs::read_link(dir.join(alias))
        .ok()
        .and_then(|t| t.file_name().map(|n| n.to_string_lossy().into_owned()))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::artifact::RunSuffix;

    #[test]
    fn repoint_replaces_existing_alias() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("cis-fix-0101-000000.sh");
        let second = dir.path().join("cis-fix-0101-000001.sh");
        std::fs::write(&first, "echo one").unwrap();
        std::fs::write(&second, "echo two").unwrap();

        repoint(dir.path(), "fix.sh", &first).unwrap();
        assert_eq!(
            target_name(dir.path(), "fix.sh").as_deref(),
            Some("cis-fix-0101-000000.sh")
        );

        repoint(dir.path(), "fix.sh", &second).unwrap();
        assert_eq!(
            target_name(dir.path(), "fix.sh").as_deref(),
            Some("cis-fix-0101-000001.sh")
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("fix.sh")).unwrap(),
            "echo two"
        );
    }

    #[test]
    fn repoint_refuses_missing_target() {
        let dir = tempfile::tempdir().unwrap();
        let err = repoint(dir.path(), "fix.sh", &dir.path().join("nope.sh")).unwrap_err();
        assert!(matches!(err, ScanError::ArtifactNotFound(_)));
        assert!(dir.path().join("fix.sh").symlink_metadata().is_err());
    }

    #[test]
    fn no_staging_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("cis-results-0101-000000.xml");
        std::fs::write(&target, "<x/>").unwrap();
        repoint(dir.path(), "results.xml", &target).unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn update_kind_writes_both_aliases() {
        let dir = tempfile::tempdir().unwrap();
        let set = ScanArtifactSet::new(
            dir.path(),
            "cis",
            RunSuffix::parse("0101-000000").unwrap(),
        );
        std::fs::write(set.path(ArtifactKind::Variables), "<vars/>").unwrap();

        let [scoped, global] = update_kind(&set, ArtifactKind::Variables).unwrap();
        assert_eq!(scoped, dir.path().join("cis-variables.xml"));
        assert_eq!(global, dir.path().join("variables.xml"));
        assert!(resolve(dir.path(), "variables.xml").is_some());
        assert!(resolve(dir.path(), "fix.sh").is_none());
    }

    #[test]
    fn dangling_alias_does_not_resolve() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink("gone.sh", dir.path().join("fix.sh")).unwrap();
        assert!(resolve(dir.path(), "fix.sh").is_none());
    }
}
