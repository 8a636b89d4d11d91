//! CLI argument parsing for the provisioning workflow.
//!
//! The CLI is intentionally thin: flags are resolved once into an immutable
//! plan before the pipeline runs, so no policy lives here.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "groundwork",
    version,
    about = "Provision a local platform cluster, registry, and operator",
    after_help = "Commands:\n  setup       Run the provisioning pipeline\n  preflight   Check that required external tools are on PATH\n\nExamples:\n  groundwork preflight\n  groundwork setup --manifest-root ./deploy/manifests\n  groundwork setup --tls --storage-size 20Gi\n  groundwork setup --registry external --external-registry-url registry.example.com\n  groundwork setup --dry-run",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Setup(SetupArgs),
    Preflight(PreflightArgs),
}

/// Registry flavors the plan can resolve to.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryArg {
    /// Deploy a registry inside the cluster
    Internal,
    /// Use an existing registry outside the cluster
    External,
}

/// How the registry is exposed outside the cluster.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngressArg {
    /// Publish on a fixed host port
    NodePort,
    /// Route through an ingress manifest
    Ingress,
}

/// Setup command inputs, resolved once into a `SetupPlan`.
#[derive(Parser, Debug)]
#[command(about = "Run the provisioning pipeline")]
pub struct SetupArgs {
    /// Registry flavor to provision for operator images
    #[arg(long, value_enum, default_value_t = RegistryArg::Internal)]
    pub registry: RegistryArg,

    /// Persistent volume size for the internal registry
    #[arg(long, value_name = "SIZE", default_value = "10Gi")]
    pub storage_size: String,

    /// How the registry is exposed outside the cluster
    #[arg(long, value_enum, default_value_t = IngressArg::NodePort)]
    pub ingress: IngressArg,

    /// Ingress manifest, relative to the manifest root (required for
    /// --ingress ingress)
    #[arg(long, value_name = "PATH")]
    pub ingress_manifest: Option<PathBuf>,

    /// External registry URL (required for --registry external)
    #[arg(long, value_name = "URL")]
    pub external_registry_url: Option<String>,

    /// External registry username
    #[arg(long, value_name = "USER")]
    pub external_registry_username: Option<String>,

    /// External registry password
    #[arg(long, value_name = "PASS")]
    pub external_registry_password: Option<String>,

    /// Serve the internal registry over TLS (selects the TLS manifest
    /// overlay and installs cert-manager)
    #[arg(long)]
    pub tls: bool,

    /// Reuse the pre-loaded dev operator image instead of building one
    #[arg(long)]
    pub test_mode: bool,

    /// Recreate the cluster even if one already exists
    #[arg(long)]
    pub force: bool,

    /// Root directory holding the deployment manifests
    #[arg(long, value_name = "DIR")]
    pub manifest_root: Option<PathBuf>,

    /// Cluster name passed to the provisioner
    #[arg(long, value_name = "NAME", default_value = "groundwork")]
    pub cluster_name: String,

    /// Extra provisioner arguments, split shell-style
    #[arg(long, value_name = "ARGS")]
    pub cluster_args: Option<String>,

    /// Readiness timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    pub timeout: u64,

    /// Host port the internal registry is published on
    #[arg(long, value_name = "PORT", default_value_t = 5000)]
    pub registry_port: u16,

    /// Print the resolved plan and step order as JSON without provisioning
    #[arg(long)]
    pub dry_run: bool,

    /// Emit a verbose transcript of the workflow
    #[arg(long)]
    pub verbose: bool,
}

/// Preflight command inputs.
#[derive(Parser, Debug)]
#[command(about = "Check that required external tools are on PATH")]
pub struct PreflightArgs {
    /// Emit a verbose transcript of the workflow
    #[arg(long)]
    pub verbose: bool,
}

impl RootArgs {
    /// Whether the selected command asked for a verbose transcript.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Command::Setup(args) => args.verbose,
            Command::Preflight(args) => args.verbose,
        }
    }
}
