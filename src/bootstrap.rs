//! Package-manager bootstrap for generated projects.
//! Runs a fixed sequence of external commands inside the project directory
//! and stops at the first failing step.

use std::fmt;
use std::fs;
use std::path::Path;
use std::process::Command;

use console::style;
use log::debug;

use crate::error::{Error, Result};

/// Files the package manager's `init` creates that the project does not need.
pub const PLACEHOLDER_FILES: [&str; 2] = ["hello.py", "main.py"];

/// An external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<S: Into<String>>(program: S, args: &[&str]) -> Self {
        Self { program: program.into(), args: args.iter().map(|arg| arg.to_string()).collect() }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

/// Executes external commands.
pub trait CommandRunner {
    /// Runs `command` with `cwd` as working directory and waits for it.
    ///
    /// # Errors
    /// * `Error::CommandFailed` if the program cannot be started
    fn run(&self, command: &CommandSpec, cwd: &Path) -> Result<CommandOutput>;
}

/// Runs commands as child processes of this one.
#[derive(Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandSpec, cwd: &Path) -> Result<CommandOutput> {
        let output = Command::new(&command.program)
            .args(&command.args)
            .current_dir(cwd)
            .output()
            .map_err(|e| Error::CommandFailed {
                program: command.to_string(),
                status: "not started".to_string(),
                stderr: e.to_string(),
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// One step of the bootstrap sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapStep {
    Run(CommandSpec),
    RemovePlaceholders,
}

/// Returns the bootstrap sequence for a project pinned to `minor_version`.
pub fn bootstrap_steps(minor_version: &str, use_env: bool) -> Vec<BootstrapStep> {
    let django = format!("django~={minor_version}");
    let mut steps = vec![
        BootstrapStep::Run(CommandSpec::new("uv", &["init"])),
        BootstrapStep::RemovePlaceholders,
        BootstrapStep::Run(CommandSpec::new("uv", &["add", django.as_str()])),
    ];
    if use_env {
        steps.push(BootstrapStep::Run(CommandSpec::new("uv", &["add", "environs[django]"])));
    }
    steps.push(BootstrapStep::Run(CommandSpec::new("uv", &["run", "manage.py", "migrate"])));
    steps
}

fn remove_placeholders(project_dir: &Path) -> Result<()> {
    for name in PLACEHOLDER_FILES {
        let path = project_dir.join(name);
        if path.is_file() {
            debug!("Removing placeholder file: {}", path.display());
            fs::remove_file(path)?;
        }
    }
    Ok(())
}

/// Runs the bootstrap sequence inside `project_dir`.
///
/// # Errors
/// * `Error::CommandFailed` for the first command that does not succeed;
///   later steps are not run and nothing is rolled back
pub fn run_bootstrap(
    runner: &dyn CommandRunner,
    project_dir: &Path,
    minor_version: &str,
    use_env: bool,
) -> Result<()> {
    for step in bootstrap_steps(minor_version, use_env) {
        match step {
            BootstrapStep::RemovePlaceholders => remove_placeholders(project_dir)?,
            BootstrapStep::Run(command) => {
                println!("{} {}", style("==>").cyan().bold(), command);
                let output = runner.run(&command, project_dir)?;
                debug!("{command}: {}", output.stdout.trim_end());
                if !output.success {
                    return Err(Error::CommandFailed {
                        program: command.to_string(),
                        status: output.status,
                        stderr: output.stderr.trim_end().to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}
