//! Production collaborator implementations over the external tools.
//!
//! The pipeline has no rollback: a failed run is recovered by fixing the
//! environment and re-running end to end. Each operation here is therefore
//! written to converge when repeated (apply semantics, get-then-create,
//! delete-then-create) rather than to assume a clean slate.

use anyhow::{anyhow, Context, Result};
use std::path::Path;

use crate::setup::plan::{ExternalRegistry, SetupPlan};
use crate::setup::PLATFORM_NAMESPACE;
use crate::tools::ToolRunner;

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| (*part).to_string()).collect()
}

fn utf8_path(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow!("path {} is not valid UTF-8", path.display()))
}

/// Create the cluster unless one with the plan's name already exists;
/// `--force` deletes and recreates it.
pub fn bootstrap_cluster(cluster: &dyn ToolRunner, plan: &SetupPlan) -> Result<()> {
    let exists = cluster_exists(cluster, &plan.cluster_name)?;
    if exists && plan.force {
        cluster
            .run(&argv(&["delete", "cluster", "--name", &plan.cluster_name]))
            .context("delete existing cluster")?;
    } else if exists {
        tracing::info!(cluster = %plan.cluster_name, "cluster already exists; skipping creation");
        return Ok(());
    }
    let mut args = argv(&["create", "cluster", "--name", &plan.cluster_name]);
    args.extend(plan.cluster_args.iter().cloned());
    cluster.run(&args).context("create cluster")?;
    Ok(())
}

fn cluster_exists(cluster: &dyn ToolRunner, name: &str) -> Result<bool> {
    let output = cluster
        .output(&argv(&["get", "clusters"]))
        .context("list clusters")?;
    let text = String::from_utf8_lossy(&output);
    Ok(text.lines().any(|line| line.trim() == name))
}

/// `kubectl apply` converges, so re-running is harmless.
pub fn apply_manifests(kubectl: &dyn ToolRunner, path: &Path) -> Result<()> {
    let path = utf8_path(path)?;
    kubectl
        .run(&argv(&["apply", "--recursive", "--filename", path]))
        .with_context(|| format!("apply manifests at {path}"))?;
    Ok(())
}

/// Install cert-manager from the bundled manifests.
pub fn configure_tls(kubectl: &dyn ToolRunner, plan: &SetupPlan) -> Result<()> {
    apply_manifests(kubectl, &plan.cert_manager_manifest())
}

/// Deploy the in-cluster registry, then size its volume claim from the plan.
/// Patching keeps the checked-in manifest free of run-specific values.
pub fn deploy_registry(kubectl: &dyn ToolRunner, plan: &SetupPlan) -> Result<()> {
    apply_manifests(kubectl, &plan.registry_manifest())?;
    let patch = format!(
        r#"{{"spec":{{"resources":{{"requests":{{"storage":"{}"}}}}}}}}"#,
        plan.storage_size
    );
    kubectl
        .run(&argv(&[
            "patch",
            "persistentvolumeclaim",
            "registry-storage",
            "--namespace",
            PLATFORM_NAMESPACE,
            "--type",
            "merge",
            "--patch",
            &patch,
        ]))
        .context("size registry volume claim")?;
    Ok(())
}

/// Log in to an external registry. Credentials ride argv through the guarded
/// executor; no shell is ever involved.
pub fn registry_login(docker: &dyn ToolRunner, registry: &ExternalRegistry) -> Result<()> {
    let (Some(username), Some(password)) =
        (registry.username.as_deref(), registry.password.as_deref())
    else {
        return Err(anyhow!("registry login requires both username and password"));
    };
    docker
        .run(&argv(&[
            "login",
            &registry.url,
            "--username",
            username,
            "--password",
            password,
        ]))
        .with_context(|| format!("docker login {}", registry.url))?;
    Ok(())
}

/// Build the operator image from the bundled build context.
pub fn build_image(docker: &dyn ToolRunner, plan: &SetupPlan) -> Result<String> {
    let image = plan.operator_image_target();
    let context = plan.operator_build_context();
    let context = utf8_path(&context)?;
    docker
        .run(&argv(&["build", "--tag", &image, context]))
        .with_context(|| format!("build {image}"))?;
    Ok(image)
}

pub fn push_image(docker: &dyn ToolRunner, image: &str) -> Result<()> {
    docker
        .run(&argv(&["push", image]))
        .with_context(|| format!("push {image}"))?;
    Ok(())
}

/// Get-then-create so re-runs are clean.
pub fn ensure_namespace(kubectl: &dyn ToolRunner, namespace: &str) -> Result<()> {
    if kubectl.run(&argv(&["get", "namespace", namespace])).is_ok() {
        return Ok(());
    }
    kubectl
        .run(&argv(&["create", "namespace", namespace]))
        .with_context(|| format!("create namespace {namespace}"))?;
    Ok(())
}

/// Recreate the image-pull secret. `create` fails on an existing secret, so
/// a best-effort delete first keeps the call idempotent; the operator pod
/// reads the credentials from the secret, never from its manifest.
pub fn configure_credentials(
    kubectl: &dyn ToolRunner,
    registry: &ExternalRegistry,
    secret_name: &str,
    namespace: &str,
) -> Result<()> {
    let (Some(username), Some(password)) =
        (registry.username.as_deref(), registry.password.as_deref())
    else {
        return Err(anyhow!(
            "cannot create secret {secret_name}: registry credentials are incomplete"
        ));
    };
    let _ = kubectl.run(&argv(&[
        "delete",
        "secret",
        secret_name,
        "--namespace",
        namespace,
        "--ignore-not-found",
    ]));
    kubectl
        .run(&argv(&[
            "create",
            "secret",
            "docker-registry",
            secret_name,
            "--namespace",
            namespace,
            &format!("--docker-server={}", registry.url),
            &format!("--docker-username={username}"),
            &format!("--docker-password={password}"),
        ]))
        .with_context(|| format!("create secret {secret_name}"))?;
    Ok(())
}

/// Rolling restart so freshly created pull secrets are picked up. The
/// resource is named in `TYPE NAME` form; a slash-joined `TYPE/NAME` ref
/// reads as a relative path to the confinement validator.
pub fn restart_deployment(kubectl: &dyn ToolRunner, name: &str, namespace: &str) -> Result<()> {
    kubectl
        .run(&argv(&[
            "rollout",
            "restart",
            "deployment",
            name,
            "--namespace",
            namespace,
        ]))
        .with_context(|| format!("restart deployment {name}"))?;
    Ok(())
}

/// Ready replica count for a deployment; the field is absent until the
/// first replica reports ready, which reads as zero.
pub fn ready_replicas(kubectl: &dyn ToolRunner, name: &str, namespace: &str) -> Result<u64> {
    let output = kubectl
        .output(&argv(&[
            "get",
            "deployment",
            name,
            "--namespace",
            namespace,
            "--output",
            "jsonpath={.status.readyReplicas}",
        ]))
        .with_context(|| format!("query ready replicas for {name}"))?;
    let text = String::from_utf8_lossy(&output);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<u64>()
        .with_context(|| format!("parse ready replica count {trimmed:?}"))
}

/// A CRD is present once `kubectl get` succeeds for it. A validation
/// rejection is a bug in argument construction and propagates; an execution
/// failure just means "not there yet".
pub fn crd_established(kubectl: &dyn ToolRunner, name: &str) -> Result<bool> {
    match kubectl.run(&argv(&["get", "customresourcedefinition", name])) {
        Ok(()) => Ok(true),
        Err(err) if err.is_validation() => Err(err.into()),
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod tests;
