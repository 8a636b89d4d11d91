//! The provisioning pipeline: plan, context, steps, and runner.
//!
//! One invocation resolves a [`plan::SetupPlan`] from CLI flags, builds a
//! [`pipeline::Pipeline`] from it, and runs the steps strictly in order
//! against a [`context::SetupContext`] threaded through a [`deps::Deps`]
//! bag. First failure halts the run; recovery is forward-only (fix the
//! environment and re-run, relying on per-step idempotence).

pub mod context;
pub mod deps;
pub mod diagnostics;
pub mod ops;
pub mod pipeline;
pub mod plan;
pub mod readiness;
pub mod steps;

/// Namespace every platform component lands in.
pub const PLATFORM_NAMESPACE: &str = "groundwork-system";

/// The in-cluster registry deployment and its pod selector.
pub const REGISTRY_DEPLOYMENT: &str = "registry";
pub const REGISTRY_SELECTOR: &str = "app=registry";

/// The control-plane operator deployment and its pod selector.
pub const OPERATOR_DEPLOYMENT: &str = "groundwork-operator";
pub const OPERATOR_SELECTOR: &str = "app=groundwork-operator";

/// The custom resource type the operator must serve before setup is done.
pub const WORKLOAD_CRD: &str = "workloads.groundwork.io";

/// Name of the image-pull secret created for external registries.
pub const DEFAULT_REGISTRY_SECRET: &str = "registry-credentials";

/// Image the test harness pre-loads into the cluster; test mode reuses it
/// instead of building.
pub const TEST_MODE_IMAGE: &str = "groundwork-operator:dev";

/// Name the operator image is built and pushed under.
pub const OPERATOR_IMAGE_NAME: &str = "groundwork-operator";
pub const OPERATOR_IMAGE_TAG: &str = "latest";

/// cert-manager webhook, the last cert-manager component to come up.
pub const CERT_MANAGER_NAMESPACE: &str = "cert-manager";
pub const CERT_MANAGER_WEBHOOK: &str = "cert-manager-webhook";
pub const CERT_MANAGER_SELECTOR: &str = "app.kubernetes.io/component=webhook";
