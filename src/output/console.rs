use crate::artifact::history::RunRecord;
use crate::artifact::ArtifactKind;
use crate::fix::FixOutcome;
use crate::inspect::{CheckVerdict, RuleInspection};
use crate::pipeline::{OrchestrationReport, StepStatus};

/// Render an orchestration run: artifacts, step outcomes, then the tally.
pub fn render_scan(report: &OrchestrationReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n  Scan of {} (run {})\n\n",
        report.profile, report.suffix
    ));

    for kind in ArtifactKind::ALL {
        let path = report.artifacts.path(kind);
        let marker = if path.is_file() { "  " } else { "!!" };
        output.push_str(&format!(
            "  {} {:<17} {}\n",
            marker,
            kind.to_string(),
            path.display()
        ));
    }
    output.push('\n');

    for step in &report.steps {
        match &step.status {
            StepStatus::Ok => output.push_str(&format!("  [OK]     {}\n", step.step)),
            StepStatus::Failed { reason } => {
                output.push_str(&format!("  [FAILED] {}\n", step.step));
                output.push_str(&format!("           {}\n", reason));
            }
        }
    }
    output.push('\n');

    if let Some(tally) = &report.tally {
        for line in tally.to_string().lines() {
            output.push_str(&format!("  {}\n", line));
        }
        output.push('\n');
    }

    let failed = report.failed_steps().len();
    if failed > 0 {
        output.push_str(&format!(
            "  Completed with {} failed step(s); {} alias(es) updated.\n\n",
            failed,
            report.aliases.len()
        ));
    } else {
        output.push_str(&format!(
            "  Completed; {} alias(es) updated.\n\n",
            report.aliases.len()
        ));
    }

    output
}

pub fn render_rule(inspection: &RuleInspection) -> String {
    match inspection {
        RuleInspection::NoResults { scan_dir } => format!(
            "No result document in {}. Run `scanward scan` first.\n",
            scan_dir.display()
        ),
        RuleInspection::RuleNotFound {
            rule_id,
            suggestion,
        } => {
            let mut out = format!("Rule {} not found in the current results.\n", rule_id);
            if let Some(s) = suggestion {
                out.push_str(&format!("Did you mean {}?\n", s));
            }
            out
        }
        RuleInspection::Found { outcome, check } => {
            let mut out = String::new();
            out.push_str(&format!("{}\n", outcome.rule_id));
            out.push_str(&format!("  result:   {}\n", outcome.result));
            out.push_str(&format!("  severity: {}\n", outcome.severity));
            match (&outcome.check, check) {
                (Some(check_ref), Some(eval)) => {
                    out.push_str(&format!("  check:    {}", check_ref.name));
                    if let Some(href) = &check_ref.href {
                        out.push_str(&format!(" ({})", href));
                    }
                    out.push('\n');
                    match &eval.verdict {
                        CheckVerdict::Evaluated { output } => {
                            for line in output.lines() {
                                out.push_str(&format!("    {}\n", line));
                            }
                        }
                        CheckVerdict::Failed { reason } => {
                            out.push_str(&format!("    check evaluation failed: {}\n", reason));
                        }
                        CheckVerdict::Skipped { reason } => {
                            out.push_str(&format!("    check not evaluated: {}\n", reason));
                        }
                    }
                }
                _ => out.push_str("  check:    -\n"),
            }
            out
        }
    }
}

pub fn render_fix(outcome: &FixOutcome) -> String {
    match outcome {
        FixOutcome::NoFixAvailable => {
            "No fix script yet. Run `scanward scan` to generate one.\n".to_string()
        }
        FixOutcome::Applied { script, exit_code } => match exit_code {
            Some(0) => format!("Applied {}\n", script.display()),
            Some(code) => format!("Applied {} (exit code {})\n", script.display(), code),
            None => format!("Applied {} (terminated by signal)\n", script.display()),
        },
    }
}

pub fn render_runs(runs: &[RunRecord]) -> String {
    if runs.is_empty() {
        return "No scans recorded.\n".to_string();
    }

    let mut output = format!("{:<13} {:<9} {:<9} PROFILE\n", "RUN", "ARTIFACTS", "CURRENT");
    output.push_str(&format!("{}\n", "-".repeat(60)));
    for run in runs {
        output.push_str(&format!(
            "{:<13} {:<9} {:<9} {}\n",
            run.suffix.as_str(),
            format!(
                "{}/{}{}",
                run.kinds.len(),
                ArtifactKind::ALL.len(),
                if run.is_complete() { "" } else { "!" }
            ),
            if run.current { "*" } else { "" },
            run.profile,
        ));
    }
    output
}
