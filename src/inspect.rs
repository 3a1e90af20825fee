//! Single-rule lookups against the current result document.
//!
//! Never writes to the scan directory.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::artifact::{alias, ArtifactKind};
use crate::engine::ScanEngine;
use crate::error::Result;
use crate::transform::{ReportTransform, RuleOutcome};

/// What re-running the rule's diagnostic check produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckVerdict {
    Evaluated { output: String },
    Failed { reason: String },
    Skipped { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckEvaluation {
    pub check_id: String,
    pub definitions: Option<PathBuf>,
    pub variables: Option<PathBuf>,
    pub verdict: CheckVerdict,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleInspection {
    Found {
        outcome: RuleOutcome,
        check: Option<CheckEvaluation>,
    },
    RuleNotFound {
        rule_id: String,
        suggestion: Option<String>,
    },
    /// No scan has published a result document yet.
    NoResults { scan_dir: PathBuf },
}

pub struct RuleInspector<'a, E, T> {
    engine: &'a E,
    transform: &'a T,
    /// Where check definition files named by the result document live.
    definitions_dir: Option<PathBuf>,
}

impl<'a, E: ScanEngine, T: ReportTransform> RuleInspector<'a, E, T> {
    pub fn new(engine: &'a E, transform: &'a T, definitions_dir: Option<PathBuf>) -> Self {
        Self {
            engine,
            transform,
            definitions_dir,
        }
    }

    pub fn inspect(&self, rule_id: &str, scan_dir: &Path) -> Result<RuleInspection> {
        let Some(results) = alias::resolve(scan_dir, &ArtifactKind::ResultDocument.global_alias())
        else {
            return Ok(RuleInspection::NoResults {
                scan_dir: scan_dir.to_path_buf(),
            });
        };

        let Some(outcome) = self.transform.rule_outcome(&results, rule_id)? else {
            let known = self.transform.rule_ids(&results)?;
            return Ok(RuleInspection::RuleNotFound {
                rule_id: rule_id.to_string(),
                suggestion: suggest(rule_id, &known),
            });
        };

        let check = outcome
            .check
            .as_ref()
            .map(|check| {
                let content_dir = self.definitions_dir.as_deref().unwrap_or(scan_dir);
                let definitions = check.definitions_path(content_dir);
                let variables =
                    alias::resolve(scan_dir, &ArtifactKind::Variables.global_alias());
                let verdict = self.evaluate_check(
                    &check.name,
                    definitions.as_deref(),
                    variables.as_deref(),
                );
                CheckEvaluation {
                    check_id: check.name.clone(),
                    definitions,
                    variables,
                    verdict,
                }
            });

        Ok(RuleInspection::Found { outcome, check })
    }

    fn evaluate_check(
        &self,
        check_id: &str,
        definitions: Option<&Path>,
        variables: Option<&Path>,
    ) -> CheckVerdict {
        let Some(definitions) = definitions.filter(|d| d.is_file()) else {
            return CheckVerdict::Skipped {
                reason: match definitions {
                    Some(d) => format!("definitions file {} not found", d.display()),
                    None => "rule does not name a definitions file".to_string(),
                },
            };
        };

        match self.engine.evaluate_check(check_id, definitions, variables) {
            Ok(output) => CheckVerdict::Evaluated { output },
            Err(e) => {
                tracing::warn!(check = check_id, error = %e, "check evaluation failed");
                CheckVerdict::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Closest known rule by short name, if reasonably close.
pub fn suggest(wanted: &str, known: &[String]) -> Option<String> {
    let short = |id: &str| -> String {
        id.rsplit_once("_rule_")
            .map(|(_, s)| s.to_string())
            .unwrap_or_else(|| id.to_string())
    };
    let wanted = short(wanted);
    let limit = (wanted.len() / 3).max(2);

    known
        .iter()
        .map(|id| (levenshtein::levenshtein(&wanted, &short(id)), id))
        .filter(|(distance, _)| *distance <= limit)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, id)| short(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use crate::transform::{RuleResult, XccdfTransform};
    use std::cell::RefCell;
    use std::time::SystemTime;

    const FIXTURE: &str = "tests/fixtures/xccdf-results.xml";

    #[derive(Default)]
    struct CheckEngine {
        fail: bool,
        checks: RefCell<Vec<(String, PathBuf, Option<PathBuf>)>>,
    }

    impl ScanEngine for CheckEngine {
        fn evaluate(&self, _: &crate::engine::EvaluateRequest<'_>) -> Result<()> {
            unreachable!()
        }
        fn generate_fix(&self, _: &str, _: &Path, _: &Path) -> Result<()> {
            unreachable!()
        }
        fn export_variables(&self, _: &str, _: &Path, _: &Path) -> Result<()> {
            unreachable!()
        }
        fn evaluate_check(
            &self,
            check_id: &str,
            definitions: &Path,
            variables: Option<&Path>,
        ) -> Result<String> {
            self.checks.borrow_mut().push((
                check_id.to_string(),
                definitions.to_path_buf(),
                variables.map(Path::to_path_buf),
            ));
            if self.fail {
                return Err(ScanError::Tool {
                    command: "oscap oval eval".into(),
                    message: "exit code 1".into(),
                });
            }
            Ok(format!("Definition {}: false", check_id))
        }
    }

    /// Scan dir with published results/variables aliases and a content dir
    /// holding the definitions file.
    fn published(dir: &Path) -> (PathBuf, PathBuf) {
        let scan_dir = dir.join("scans");
        let content = dir.join("content");
        std::fs::create_dir_all(&scan_dir).unwrap();
        std::fs::create_dir_all(&content).unwrap();
        std::fs::write(content.join("ssg-rhel9-oval.xml"), "<oval/>").unwrap();

        let results = scan_dir.join("std-results-0101-000000.xml");
        let variables = scan_dir.join("std-variables-0101-000000.xml");
        std::fs::copy(FIXTURE, &results).unwrap();
        std::fs::write(&variables, "<variables/>").unwrap();
        alias::repoint(&scan_dir, "results.xml", &results).unwrap();
        alias::repoint(&scan_dir, "variables.xml", &variables).unwrap();
        (scan_dir, content)
    }

    fn snapshot(dir: &Path) -> Vec<(String, Option<SystemTime>)> {
        let mut entries: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .flatten()
            .map(|e| {
                let modified = e.path().symlink_metadata().and_then(|m| m.modified()).ok();
                (e.file_name().to_string_lossy().into_owned(), modified)
            })
            .collect();
        entries.sort();
        entries
    }

    #[test]
    fn no_results_alias_means_no_results() {
        let dir = tempfile::tempdir().unwrap();
        let engine = CheckEngine::default();
        let inspector = RuleInspector::new(&engine, &XccdfTransform, None);
        let inspection = inspector.inspect("accounts_tmout", dir.path()).unwrap();
        assert!(matches!(inspection, RuleInspection::NoResults { .. }));
        assert!(engine.checks.borrow().is_empty());
    }

    #[test]
    fn found_rule_evaluates_its_check_with_variables() {
        let dir = tempfile::tempdir().unwrap();
        let (scan_dir, content) = published(dir.path());
        let engine = CheckEngine::default();
        let inspector = RuleInspector::new(&engine, &XccdfTransform, Some(content.clone()));

        let inspection = inspector.inspect("accounts_tmout", &scan_dir).unwrap();
        let RuleInspection::Found { outcome, check } = inspection else {
            panic!("rule should be found");
        };
        assert_eq!(outcome.result, RuleResult::Fail);

        let check = check.unwrap();
        assert_eq!(check.check_id, "oval:ssg-accounts_tmout:def:1");
        assert_eq!(
            check.verdict,
            CheckVerdict::Evaluated {
                output: "Definition oval:ssg-accounts_tmout:def:1: false".into()
            }
        );

        let calls = engine.checks.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, content.join("ssg-rhel9-oval.xml"));
        assert_eq!(calls[0].2, Some(scan_dir.join("variables.xml")));
    }

    #[test]
    fn unknown_rule_is_not_found_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (scan_dir, content) = published(dir.path());
        let before = snapshot(&scan_dir);

        let engine = CheckEngine::default();
        let inspector = RuleInspector::new(&engine, &XccdfTransform, Some(content));
        let inspection = inspector.inspect("accounts_tmoot", &scan_dir).unwrap();

        match inspection {
            RuleInspection::RuleNotFound { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("accounts_tmout"));
            }
            other => panic!("unexpected inspection: {other:?}"),
        }
        assert!(engine.checks.borrow().is_empty());
        assert_eq!(snapshot(&scan_dir), before);
    }

    #[test]
    fn check_failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let (scan_dir, content) = published(dir.path());
        let engine = CheckEngine {
            fail: true,
            ..Default::default()
        };
        let inspector = RuleInspector::new(&engine, &XccdfTransform, Some(content));

        let RuleInspection::Found { check, .. } =
            inspector.inspect("no_empty_passwords", &scan_dir).unwrap()
        else {
            panic!("rule should be found");
        };
        assert!(matches!(
            check.unwrap().verdict,
            CheckVerdict::Failed { .. }
        ));
    }

    #[test]
    fn missing_definitions_file_skips_check() {
        let dir = tempfile::tempdir().unwrap();
        let (scan_dir, _content) = published(dir.path());
        let engine = CheckEngine::default();
        let inspector =
            RuleInspector::new(&engine, &XccdfTransform, Some(dir.path().join("elsewhere")));

        let RuleInspection::Found { check, .. } =
            inspector.inspect("accounts_tmout", &scan_dir).unwrap()
        else {
            panic!("rule should be found");
        };
        assert!(matches!(
            check.unwrap().verdict,
            CheckVerdict::Skipped { .. }
        ));
        assert!(engine.checks.borrow().is_empty());
    }

    #[test]
    fn rule_without_check_has_no_evaluation() {
        let dir = tempfile::tempdir().unwrap();
        let (scan_dir, content) = published(dir.path());
        let engine = CheckEngine::default();
        let inspector = RuleInspector::new(&engine, &XccdfTransform, Some(content));

        let RuleInspection::Found { outcome, check } =
            inspector.inspect("service_telnet_disabled", &scan_dir).unwrap()
        else {
            panic!("rule should be found");
        };
        assert_eq!(outcome.result, RuleResult::NotSelected);
        assert!(check.is_none());
    }

    #[test]
    fn suggestion_needs_to_be_close() {
        let known = vec!["xccdf_org.ssgproject.content_rule_accounts_tmout".to_string()];
        assert_eq!(suggest("acounts_tmout", &known).as_deref(), Some("accounts_tmout"));
        assert_eq!(suggest("firewalld_enabled", &known), None);
    }
}
