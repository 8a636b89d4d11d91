//! Typed clients for the external tools the pipeline drives.
//!
//! Each client is bound to one fixed program and a validator chain matched
//! to that program's trust model. All four operations route through the
//! guarded executor; test doubles implement [`ToolRunner`] and record every
//! invocation.

use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Result};

use crate::exec::{ExecError, GuardedCommand, Validator};

/// Cluster provisioners the pipeline may invoke. The provisioner takes
/// user-influenced arguments (cluster name, passthrough flags), so it also
/// carries the program allow-list.
pub const CLUSTER_PROGRAMS: &[&str] = &["kind"];

/// Programs the setup pipeline shells out to.
pub const REQUIRED_PROGRAMS: &[&str] = &["kind", "kubectl", "docker"];

/// The four-operation boundary every external tool is driven through.
pub trait ToolRunner {
    fn run(&self, args: &[String]) -> Result<(), ExecError>;
    fn output(&self, args: &[String]) -> Result<Vec<u8>, ExecError>;
    fn combined_output(&self, args: &[String]) -> Result<Vec<u8>, ExecError>;
    fn run_with_output(
        &self,
        args: &[String],
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<(), ExecError>;
}

/// A guarded client for one external program.
pub struct Tool {
    program: String,
    validators: Vec<Validator>,
}

impl Tool {
    pub fn new(program: impl Into<String>, validators: Vec<Validator>) -> Self {
        Self {
            program: program.into(),
            validators,
        }
    }

    /// The control-plane CLI. Manifest paths it receives are confined to the
    /// manifest root; resource names must not carry control characters.
    pub fn kubectl(manifest_root: &Path) -> Self {
        Self::new(
            "kubectl",
            vec![
                Validator::ConfinePaths {
                    root: manifest_root.to_path_buf(),
                },
                Validator::NoControlChars,
            ],
        )
    }

    /// The cluster provisioner. Arguments are user-influenced, so the full
    /// chain applies: allow-list, shell metacharacters, control characters.
    pub fn cluster() -> Self {
        Self::new(
            "kind",
            vec![
                Validator::AllowPrograms {
                    allowed: CLUSTER_PROGRAMS,
                },
                Validator::NoShellMeta,
                Validator::NoControlChars,
            ],
        )
    }

    /// The image tool. Registry URLs and credentials flow through argv.
    pub fn docker() -> Self {
        Self::new(
            "docker",
            vec![Validator::NoShellMeta, Validator::NoControlChars],
        )
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, args: &[String]) -> Result<GuardedCommand, ExecError> {
        GuardedCommand::new(&self.program, args, &self.validators)
    }
}

impl ToolRunner for Tool {
    fn run(&self, args: &[String]) -> Result<(), ExecError> {
        self.command(args)?.run()
    }

    fn output(&self, args: &[String]) -> Result<Vec<u8>, ExecError> {
        self.command(args)?.output()
    }

    fn combined_output(&self, args: &[String]) -> Result<Vec<u8>, ExecError> {
        self.command(args)?.combined_output()
    }

    fn run_with_output(
        &self,
        args: &[String],
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<(), ExecError> {
        self.command(args)?.run_with_io(None, stdout, stderr)
    }
}

/// The full set of clients the production pipeline is wired with.
pub struct Toolset {
    pub kubectl: Box<dyn ToolRunner>,
    pub cluster: Box<dyn ToolRunner>,
    pub docker: Box<dyn ToolRunner>,
}

impl Toolset {
    pub fn production(manifest_root: &Path) -> Self {
        Self {
            kubectl: Box::new(Tool::kubectl(manifest_root)),
            cluster: Box::new(Tool::cluster()),
            docker: Box::new(Tool::docker()),
        }
    }
}

/// Verify every required program resolves on PATH before any step runs.
pub fn preflight(programs: &[&str]) -> Result<()> {
    let mut missing = Vec::new();
    for program in programs {
        if which::which(program).is_err() {
            missing.push(*program);
        }
    }
    if missing.is_empty() {
        return Ok(());
    }
    Err(anyhow!(
        "missing required tools on PATH: {}",
        missing.join(", ")
    ))
}
