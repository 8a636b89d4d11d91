//! Pure predicates over a prospective external invocation.
//!
//! Validators are independently composable; [`GuardedCommand`] runs a chain
//! of them and the first rejection wins. Each tool client picks the chain
//! matching its trust model.
//!
//! [`GuardedCommand`]: super::GuardedCommand

use std::path::{Component, Path, PathBuf};

use super::ExecSpec;

/// Characters a downstream shell could re-interpret. The executor itself
/// never invokes a shell; this guards argument text that may later be pasted
/// into one.
const SHELL_META: &[char] = &['&', '|', ';', '<', '>', '(', ')', '$', '`'];

/// Characters that can smuggle extra manifest lines or CLI tokens into an
/// argument.
const CONTROL_CHARS: &[char] = &['\r', '\n', '\t'];

#[derive(Debug, Clone)]
pub enum Validator {
    /// Reject any argument containing a shell metacharacter.
    NoShellMeta,
    /// Reject any argument containing CR, LF, or TAB.
    NoControlChars,
    /// Reject path-like arguments unless they are absolute and stay inside
    /// `root` after lexical cleaning. Relative paths are rejected outright:
    /// the spawned child resolves them against the process working
    /// directory, not against `root`, so they cannot be confined. The
    /// literal token `-` (the stdin/stdout convention) is always accepted.
    ConfinePaths { root: PathBuf },
    /// Reject invocation of any program outside an explicit set. Used where
    /// argument content is user-influenced.
    AllowPrograms { allowed: &'static [&'static str] },
}

impl Validator {
    pub fn check(&self, spec: &ExecSpec) -> Result<(), String> {
        match self {
            Validator::NoShellMeta => reject_chars(spec, SHELL_META, "shell metacharacter"),
            Validator::NoControlChars => reject_chars(spec, CONTROL_CHARS, "control character"),
            Validator::ConfinePaths { root } => confine_paths(spec, root),
            Validator::AllowPrograms { allowed } => {
                if allowed.contains(&spec.program.as_str()) {
                    Ok(())
                } else {
                    Err(format!(
                        "program `{}` is not in the allow-list {allowed:?}",
                        spec.program
                    ))
                }
            }
        }
    }
}

fn reject_chars(spec: &ExecSpec, banned: &[char], label: &str) -> Result<(), String> {
    for (idx, arg) in spec.args.iter().enumerate() {
        if let Some(ch) = arg.chars().find(|ch| banned.contains(ch)) {
            return Err(format!("args[{idx}] contains {label} {ch:?}"));
        }
    }
    Ok(())
}

fn confine_paths(spec: &ExecSpec, root: &Path) -> Result<(), String> {
    for (idx, arg) in spec.args.iter().enumerate() {
        // For `--flag=value` arguments confinement applies to the value.
        let value = arg
            .split_once('=')
            .map_or(arg.as_str(), |(_, value)| value);
        if value == "-" {
            continue;
        }
        if !looks_like_path(value) {
            continue;
        }
        let path = Path::new(value);
        if !path.is_absolute() {
            return Err(format!(
                "args[{idx}] is a relative path; the child resolves it \
                 against the working directory, not {}",
                root.display()
            ));
        }
        let cleaned = clean_path(path);
        if !cleaned.starts_with(root) {
            return Err(format!(
                "args[{idx}] resolves to {} outside {}",
                cleaned.display(),
                root.display()
            ));
        }
    }
    Ok(())
}

fn looks_like_path(value: &str) -> bool {
    value.contains('/') || value == "." || value == ".."
}

/// Lexically normalize a path: `.` components drop, `..` pops the previous
/// component. Popping at the root boundary stays at the boundary, so an
/// over-deep `..` chain still resolves to an inspectable absolute path.
fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let _ = cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

#[cfg(test)]
#[path = "validators_tests.rs"]
mod tests;
