//! Best-effort state dumps when a readiness wait times out.

use anyhow::{Context, Result};

use crate::tools::ToolRunner;

/// List matching pods with extended detail so a timeout leaves a trail in
/// the log. Callers swallow errors from this path; a failed dump must never
/// replace the original timeout error.
pub fn dump_pod_state(kubectl: &dyn ToolRunner, namespace: &str, selector: &str) -> Result<()> {
    let args = vec![
        "get".to_string(),
        "pods".to_string(),
        "--namespace".to_string(),
        namespace.to_string(),
        "--selector".to_string(),
        selector.to_string(),
        "--output".to_string(),
        "wide".to_string(),
    ];
    let output = kubectl
        .combined_output(&args)
        .context("list pods for diagnostics")?;
    tracing::warn!(
        namespace,
        selector,
        pods = %String::from_utf8_lossy(&output),
        "resource not ready; current pod state"
    );
    Ok(())
}
