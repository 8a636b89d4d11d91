//! Plan resolution: CLI flags become an immutable [`SetupPlan`].
//!
//! Everything contradictory or incomplete is rejected here, before the
//! pipeline is even assembled; steps only ever see a plan that already
//! makes sense.

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::{IngressArg, RegistryArg, SetupArgs};
use crate::setup::{OPERATOR_IMAGE_NAME, OPERATOR_IMAGE_TAG};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryKind {
    Internal,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngressMode {
    NodePort,
    Ingress,
}

/// A registry outside the managed cluster, identified by URL and optional
/// credentials.
#[derive(Debug, Clone, Serialize)]
pub struct ExternalRegistry {
    pub url: String,
    pub username: Option<String>,
    /// Never serialized: the dry-run dump must not leak credentials.
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl ExternalRegistry {
    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

/// Fully resolved configuration for one pipeline run. Read-only after
/// [`SetupPlan::resolve`].
#[derive(Debug, Clone, Serialize)]
pub struct SetupPlan {
    pub registry: RegistryKind,
    pub storage_size: String,
    pub ingress: IngressMode,
    pub ingress_manifest: Option<PathBuf>,
    pub external_registry: Option<ExternalRegistry>,
    pub tls_enabled: bool,
    pub test_mode: bool,
    pub force: bool,
    pub manifest_root: PathBuf,
    pub cluster_name: String,
    pub cluster_args: Vec<String>,
    pub ready_timeout_secs: u64,
    pub registry_port: u16,
}

impl SetupPlan {
    pub fn resolve(args: &SetupArgs) -> Result<Self> {
        let manifest_root = resolve_manifest_root(args.manifest_root.as_deref())?;
        let registry = match args.registry {
            RegistryArg::Internal => RegistryKind::Internal,
            RegistryArg::External => RegistryKind::External,
        };
        let external_registry = resolve_external_registry(args, registry)?;
        let ingress = match args.ingress {
            IngressArg::NodePort => IngressMode::NodePort,
            IngressArg::Ingress => IngressMode::Ingress,
        };
        if ingress == IngressMode::Ingress && args.ingress_manifest.is_none() {
            return Err(anyhow!("--ingress ingress requires --ingress-manifest"));
        }
        // Anchor the manifest here so every path handed to the tools is
        // absolute; a relative path would be resolved against the process
        // working directory by the spawned tool.
        let ingress_manifest = args.ingress_manifest.as_ref().map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                manifest_root.join(path)
            }
        });
        let cluster_args = match args.cluster_args.as_deref() {
            Some(raw) => shell_words::split(raw).context("split --cluster-args")?,
            None => Vec::new(),
        };

        Ok(Self {
            registry,
            storage_size: args.storage_size.clone(),
            ingress,
            ingress_manifest,
            external_registry,
            tls_enabled: args.tls,
            test_mode: args.test_mode,
            force: args.force,
            manifest_root,
            cluster_name: args.cluster_name.clone(),
            cluster_args,
            ready_timeout_secs: args.timeout,
            registry_port: args.registry_port,
        })
    }

    /// Manifest directory for the registry deployment; TLS selects the
    /// overlay.
    pub fn registry_manifest(&self) -> PathBuf {
        if self.tls_enabled {
            self.manifest_root.join("registry/tls")
        } else {
            self.manifest_root.join("registry/base")
        }
    }

    pub fn operator_manifest(&self) -> PathBuf {
        self.manifest_root.join("operator")
    }

    pub fn cert_manager_manifest(&self) -> PathBuf {
        self.manifest_root.join("cert-manager")
    }

    /// Docker build context for the operator image.
    pub fn operator_build_context(&self) -> PathBuf {
        self.manifest_root.join("operator-image")
    }

    /// Image reference the operator build pushes to.
    pub fn operator_image_target(&self) -> String {
        match &self.external_registry {
            Some(registry) => format!(
                "{}/{OPERATOR_IMAGE_NAME}:{OPERATOR_IMAGE_TAG}",
                registry.url
            ),
            None => format!(
                "localhost:{}/{OPERATOR_IMAGE_NAME}:{OPERATOR_IMAGE_TAG}",
                self.registry_port
            ),
        }
    }
}

fn resolve_manifest_root(explicit: Option<&Path>) -> Result<PathBuf> {
    let root = match explicit {
        Some(path) => path.to_path_buf(),
        None => dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow!("cannot determine data directory for manifest root"))?
            .join("groundwork")
            .join("manifests"),
    };
    if !root.is_dir() {
        return Err(anyhow!(
            "manifest root {} is not a directory (pass --manifest-root)",
            root.display()
        ));
    }
    root.canonicalize()
        .with_context(|| format!("resolve manifest root {}", root.display()))
}

fn resolve_external_registry(
    args: &SetupArgs,
    registry: RegistryKind,
) -> Result<Option<ExternalRegistry>> {
    let url = args
        .external_registry_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty());
    let username = args.external_registry_username.clone();
    let password = args.external_registry_password.clone();

    if registry == RegistryKind::Internal {
        if url.is_some() || username.is_some() || password.is_some() {
            return Err(anyhow!(
                "external registry settings supplied with --registry internal"
            ));
        }
        return Ok(None);
    }

    let url = url.ok_or_else(|| anyhow!("--registry external requires --external-registry-url"))?;
    if username.is_some() != password.is_some() {
        return Err(anyhow!(
            "external registry username and password must be supplied together"
        ));
    }
    Ok(Some(ExternalRegistry {
        url: url.to_string(),
        username,
        password,
    }))
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
