//! Guarded execution of external tools.
//!
//! Every process spawn in this crate goes through [`GuardedCommand`], which
//! refuses to build an invocation until a validator chain has accepted the
//! full argument list. A rejected invocation never spawns a process, and the
//! error taxonomy keeps validation failures (malformed argument construction)
//! distinct from execution failures (the external system misbehaving) so
//! callers never retry the former.

use std::io::Write;
use std::process::{Command, ExitStatus, Output, Stdio};
use std::thread;

use thiserror::Error;

pub mod validators;

pub use validators::Validator;

/// A prospective external invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl ExecSpec {
    /// Human-readable command line for error messages and logs.
    pub fn command_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Failure modes of a guarded invocation.
#[derive(Debug, Error)]
pub enum ExecError {
    /// A validator rejected the invocation; no process was spawned.
    #[error("refusing to run `{program}`: {reason}")]
    Validation { program: String, reason: String },

    /// The process could not be started at all.
    #[error("failed to spawn `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited unsuccessfully.
    #[error("`{command}` failed: {status}: {stderr}")]
    Exit {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}

impl ExecError {
    /// True when the invocation was rejected before any process started.
    /// Such failures indicate unsafe argument construction, not an
    /// external-system fault, and must not be retried.
    pub fn is_validation(&self) -> bool {
        matches!(self, ExecError::Validation { .. })
    }
}

/// An invocation that has passed its validator chain.
#[derive(Debug, Clone)]
pub struct GuardedCommand {
    spec: ExecSpec,
}

impl GuardedCommand {
    /// Validate `{program, args}` against every validator in order. The
    /// first failure aborts construction; the chain is fail-closed.
    pub fn new(
        program: &str,
        args: &[String],
        validators: &[Validator],
    ) -> Result<Self, ExecError> {
        let spec = ExecSpec {
            program: program.to_string(),
            args: args.to_vec(),
        };
        for validator in validators {
            if let Err(reason) = validator.check(&spec) {
                return Err(ExecError::Validation {
                    program: spec.program,
                    reason,
                });
            }
        }
        Ok(Self { spec })
    }

    pub fn spec(&self) -> &ExecSpec {
        &self.spec
    }

    /// Run to completion, discarding output. Non-zero exit is an error
    /// carrying the process stderr.
    pub fn run(&self) -> Result<(), ExecError> {
        let output = self.capture()?;
        self.check_status(&output)
    }

    /// Run and return captured stdout.
    pub fn output(&self) -> Result<Vec<u8>, ExecError> {
        let output = self.capture()?;
        self.check_status(&output)?;
        Ok(output.stdout)
    }

    /// Run and return stdout followed by stderr. The two streams are
    /// captured separately and concatenated, so ordering between them is
    /// not preserved; callers only ever log the result.
    pub fn combined_output(&self) -> Result<Vec<u8>, ExecError> {
        let output = self.capture()?;
        self.check_status(&output)?;
        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        Ok(combined)
    }

    /// Blocking run with caller-supplied streams. Stdin, when given, is fed
    /// from a helper thread while the child's output is drained; both pipes
    /// are bounded, so writing the full input first could deadlock against a
    /// child that emits as it reads. Write errors from the feeder (the child
    /// closing stdin early) and stream-copy failures are ignored so display
    /// plumbing can never mask the exit status.
    pub fn run_with_io(
        &self,
        stdin: Option<&[u8]>,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<(), ExecError> {
        let mut command = Command::new(&self.spec.program);
        command.args(&self.spec.args);
        command.stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|source| ExecError::Spawn {
            command: self.spec.command_line(),
            source,
        })?;
        let feeder = stdin.map(|input| {
            let mut handle = child.stdin.take();
            let input = input.to_vec();
            thread::spawn(move || {
                if let Some(handle) = handle.as_mut() {
                    let _ = handle.write_all(&input);
                }
            })
        });
        let output = child
            .wait_with_output()
            .map_err(|source| ExecError::Spawn {
                command: self.spec.command_line(),
                source,
            })?;
        if let Some(feeder) = feeder {
            let _ = feeder.join();
        }
        let _ = stdout.write_all(&output.stdout);
        let _ = stderr.write_all(&output.stderr);
        self.check_status(&output)
    }

    fn capture(&self) -> Result<Output, ExecError> {
        Command::new(&self.spec.program)
            .args(&self.spec.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExecError::Spawn {
                command: self.spec.command_line(),
                source,
            })
    }

    fn check_status(&self, output: &Output) -> Result<(), ExecError> {
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(ExecError::Exit {
            command: self.spec.command_line(),
            status: output.status,
            stderr,
        })
    }
}

#[cfg(test)]
#[path = "exec/exec_tests.rs"]
mod tests;
