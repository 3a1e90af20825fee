use std::path::Path;

use crate::error::Result;

use super::{EvaluateRequest, ScanEngine, ToolCommand};

/// `oscap xccdf eval` exits 2 when at least one rule failed.
const EVAL_RULES_FAILED: i32 = 2;

/// OpenSCAP command-line engine.
#[derive(Debug, Clone)]
pub struct OscapEngine {
    program: String,
}

impl OscapEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn eval_command(&self, request: &EvaluateRequest<'_>) -> ToolCommand {
        ToolCommand::new(&self.program)
            .args(["xccdf", "eval", "--profile", request.profile, "--results"])
            .arg(request.results)
            .arg("--report")
            .arg(request.report)
            .arg("--cpe")
            .arg(request.dictionary)
            .arg(request.datastream)
            .accept_exit_code(EVAL_RULES_FAILED)
    }

    pub fn fix_command(&self, profile: &str, results: &Path, output: &Path) -> ToolCommand {
        ToolCommand::new(&self.program)
            .args([
                "xccdf",
                "generate",
                "fix",
                "--fix-type",
                "bash",
                "--profile",
                profile,
                "--output",
            ])
            .arg(output)
            .arg(results)
    }

    pub fn export_variables_command(
        &self,
        profile: &str,
        datastream: &Path,
        workdir: &Path,
    ) -> ToolCommand {
        ToolCommand::new(&self.program)
            .args(["xccdf", "export-oval-variables", "--profile", profile])
            .arg(datastream)
            .current_dir(workdir)
    }

    pub fn check_command(
        &self,
        check_id: &str,
        definitions: &Path,
        variables: Option<&Path>,
    ) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.program).args(["oval", "eval", "--id", check_id]);
        if let Some(vars) = variables {
            cmd = cmd.arg("--variables").arg(vars);
        }
        cmd.arg(definitions)
    }
}

impl Default for OscapEngine {
    fn default() -> Self {
        Self::new("oscap")
    }
}

impl ScanEngine for OscapEngine {
    fn evaluate(&self, request: &EvaluateRequest<'_>) -> Result<()> {
        let out = self.eval_command(request).output()?;
        if out.code == Some(EVAL_RULES_FAILED) {
            tracing::info!(profile = request.profile, "evaluation finished with failing rules");
        }
        Ok(())
    }

    fn generate_fix(&self, profile: &str, results: &Path, output: &Path) -> Result<()> {
        self.fix_command(profile, results, output).output()?;
        Ok(())
    }

    fn export_variables(&self, profile: &str, datastream: &Path, workdir: &Path) -> Result<()> {
        self.export_variables_command(profile, datastream, workdir)
            .output()?;
        Ok(())
    }

    fn evaluate_check(
        &self,
        check_id: &str,
        definitions: &Path,
        variables: Option<&Path>,
    ) -> Result<String> {
        let out = self.check_command(check_id, definitions, variables).output()?;
        Ok(out.stdout.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Arguments after the program, split from the logged command line.
    fn rendered(cmd: &ToolCommand) -> Vec<String> {
        cmd.display().split(' ').skip(1).map(String::from).collect()
    }

    #[test]
    fn eval_passes_profile_outputs_and_inputs() {
        let engine = OscapEngine::new("/usr/bin/oscap");
        let results = PathBuf::from("/scan/cis-results-0101-000000.xml");
        let report = PathBuf::from("/scan/cis-results-0101-000000.html");
        let request = EvaluateRequest {
            profile: "cis",
            datastream: Path::new("/content/ds.xml"),
            dictionary: Path::new("/content/cpe.xml"),
            results: &results,
            report: &report,
        };
        let cmd = engine.eval_command(&request);
        assert_eq!(
            rendered(&cmd),
            [
                "xccdf",
                "eval",
                "--profile",
                "cis",
                "--results",
                "/scan/cis-results-0101-000000.xml",
                "--report",
                "/scan/cis-results-0101-000000.html",
                "--cpe",
                "/content/cpe.xml",
                "/content/ds.xml",
            ]
        );
        assert!(cmd.display().starts_with("/usr/bin/oscap xccdf eval"));
    }

    #[test]
    fn fix_reads_results_and_writes_script() {
        let engine = OscapEngine::default();
        let cmd = engine.fix_command("cis", Path::new("r.xml"), Path::new("f.sh"));
        let args = rendered(&cmd);
        assert_eq!(&args[..3], ["xccdf", "generate", "fix"]);
        assert_eq!(args.last().map(String::as_str), Some("r.xml"));
        let out = args.iter().position(|a| a == "--output").unwrap();
        assert_eq!(args[out + 1], "f.sh");
    }

    #[test]
    fn check_includes_variables_only_when_given() {
        let engine = OscapEngine::default();
        let without = rendered(&engine.check_command("oval:x:def:1", Path::new("oval.xml"), None));
        assert!(!without.iter().any(|a| a == "--variables"));

        let with = rendered(&engine.check_command(
            "oval:x:def:1",
            Path::new("oval.xml"),
            Some(Path::new("variables.xml")),
        ));
        assert_eq!(
            with,
            ["oval", "eval", "--id", "oval:x:def:1", "--variables", "variables.xml", "oval.xml"]
        );
    }
}
