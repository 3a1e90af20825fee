use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Result, ScanError};

/// stderr kept in error messages.
const STDERR_TAIL: usize = 2048;

/// A blocking external tool invocation.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    accepted_codes: Vec<i32>,
}

/// Captured result of a finished invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolCommand {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            cwd: None,
            accepted_codes: vec![0],
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// Treat an extra exit code as success.
    pub fn accept_exit_code(mut self, code: i32) -> Self {
        self.accepted_codes.push(code);
        self
    }

    /// Shell-like rendering for logs and error messages.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Run to completion, capturing output. Unaccepted exit codes and
    /// spawn failures become `ScanError::Tool`.
    pub fn output(&self) -> Result<ToolOutput> {
        let command = self.display();
        tracing::debug!(%command, "running external tool");

        let output = self.command().output().map_err(|e| ScanError::Tool {
            command: command.clone(),
            message: e.to_string(),
        })?;

        let result = ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        match result.code {
            Some(code) if self.accepted_codes.contains(&code) => Ok(result),
            code => Err(ScanError::Tool {
                command,
                message: failure_message(code, &result.stderr),
            }),
        }
    }

    /// Run with inherited stdio and report the exit code without judging it.
    /// Only a failure to spawn is an error.
    pub fn status(&self) -> Result<Option<i32>> {
        let command = self.display();
        tracing::debug!(%command, "running external tool with inherited stdio");

        let status = self.command().status().map_err(|e| ScanError::Tool {
            command,
            message: e.to_string(),
        })?;
        Ok(status.code())
    }
}

fn failure_message(code: Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    };
    let stderr = stderr.trim();
    if stderr.is_empty() {
        return status;
    }
    let tail_start = stderr
        .char_indices()
        .rev()
        .nth(STDERR_TAIL)
        .map(|(i, _)| i)
        .unwrap_or(0);
    format!("{}: {}", status, &stderr[tail_start..])
}
