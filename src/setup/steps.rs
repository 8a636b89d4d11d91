//! The provisioning steps.
//!
//! Each step is a named unit of work over the dependency bag and the shared
//! context. Steps never swallow dependency errors; every failure is wrapped
//! with a short description of what the step was doing.

use anyhow::{anyhow, Context, Result};

use crate::setup::context::SetupContext;
use crate::setup::deps::Deps;
use crate::setup::plan::{IngressMode, RegistryKind};
use crate::setup::readiness::ReadyTimeout;
use crate::setup::{
    CERT_MANAGER_NAMESPACE, CERT_MANAGER_SELECTOR, CERT_MANAGER_WEBHOOK, OPERATOR_DEPLOYMENT,
    OPERATOR_SELECTOR, PLATFORM_NAMESPACE, REGISTRY_DEPLOYMENT, REGISTRY_SELECTOR, TEST_MODE_IMAGE,
    WORKLOAD_CRD,
};

/// A named unit of the pipeline. Stateless: all mutable state lives in the
/// context.
pub struct Step {
    pub name: &'static str,
    pub run: fn(&Deps, &mut SetupContext) -> Result<()>,
}

pub(crate) fn bootstrap_cluster(deps: &Deps, ctx: &mut SetupContext) -> Result<()> {
    tracing::info!(cluster = %ctx.plan.cluster_name, "bootstrapping cluster");
    (deps.bootstrap_cluster)(&ctx.plan).context("bootstrap cluster")
}

pub(crate) fn configure_tls(deps: &Deps, ctx: &mut SetupContext) -> Result<()> {
    (deps.configure_tls)(&ctx.plan).context("install cert-manager")?;
    wait_and_diagnose(
        deps,
        CERT_MANAGER_WEBHOOK,
        CERT_MANAGER_NAMESPACE,
        CERT_MANAGER_SELECTOR,
    )
}

pub(crate) fn configure_registry(deps: &Deps, ctx: &mut SetupContext) -> Result<()> {
    match ctx.plan.registry {
        RegistryKind::External => {
            let registry = ctx
                .external_registry
                .clone()
                .ok_or_else(|| anyhow!("external registry selected but none resolved"))?;
            ctx.using_external_registry = true;
            if registry.has_credentials() {
                (deps.registry_login)(&registry)
                    .with_context(|| format!("log in to {}", registry.url))?;
            }
            Ok(())
        }
        RegistryKind::Internal => {
            (deps.deploy_registry)(&ctx.plan).context("deploy internal registry")?;
            if ctx.plan.ingress == IngressMode::Ingress {
                if let Some(manifest) = &ctx.plan.ingress_manifest {
                    (deps.deploy_manifests)(manifest).context("deploy registry ingress")?;
                }
            }
            wait_and_diagnose(deps, REGISTRY_DEPLOYMENT, PLATFORM_NAMESPACE, REGISTRY_SELECTOR)
        }
    }
}

pub(crate) fn prepare_operator_image(deps: &Deps, ctx: &mut SetupContext) -> Result<()> {
    if ctx.plan.test_mode {
        // The test harness pre-loads this image into the cluster.
        ctx.operator_image = TEST_MODE_IMAGE.to_string();
        tracing::info!(image = %ctx.operator_image, "test mode: reusing pre-loaded image");
        return Ok(());
    }
    let image = (deps.build_image)(&ctx.plan).context("build operator image")?;
    (deps.push_image)(&image).with_context(|| format!("push {image}"))?;
    ctx.operator_image = image;
    Ok(())
}

pub(crate) fn deploy_operator(deps: &Deps, ctx: &mut SetupContext) -> Result<()> {
    (deps.ensure_namespace)(PLATFORM_NAMESPACE).context("ensure platform namespace")?;
    (deps.deploy_manifests)(&ctx.plan.operator_manifest()).context("deploy operator manifests")?;
    if ctx.using_external_registry {
        if let Some(registry) = ctx.external_registry.clone() {
            if registry.has_credentials() {
                (deps.configure_credentials)(
                    &registry,
                    &ctx.registry_secret_name,
                    PLATFORM_NAMESPACE,
                )
                .context("configure registry credentials")?;
                (deps.restart_deployment)(OPERATOR_DEPLOYMENT, PLATFORM_NAMESPACE)
                    .context("restart operator deployment")?;
            }
        }
    }
    Ok(())
}

pub(crate) fn verify_install(deps: &Deps, ctx: &mut SetupContext) -> Result<()> {
    if ctx.plan.registry == RegistryKind::Internal {
        wait_and_diagnose(deps, REGISTRY_DEPLOYMENT, PLATFORM_NAMESPACE, REGISTRY_SELECTOR)?;
    }
    wait_and_diagnose(deps, OPERATOR_DEPLOYMENT, PLATFORM_NAMESPACE, OPERATOR_SELECTOR)?;
    let present = (deps.crd_established)(WORKLOAD_CRD).context("check workload CRD")?;
    if !present {
        return Err(anyhow!(
            "custom resource definition {WORKLOAD_CRD} is not established"
        ));
    }
    Ok(())
}

/// Wait for a deployment, dumping pod state on timeout before surfacing the
/// original error. Diagnostic failures are swallowed.
fn wait_and_diagnose(deps: &Deps, name: &str, namespace: &str, selector: &str) -> Result<()> {
    match (deps.wait_for_ready)(name, namespace, selector, deps.ready_timeout) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<ReadyTimeout>().is_some() {
                if let Err(diag_err) = (deps.diagnose)(namespace, selector) {
                    tracing::warn!(%diag_err, "diagnostics failed");
                }
            }
            Err(err)
        }
    }
}
