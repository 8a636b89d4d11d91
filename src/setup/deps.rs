//! The dependency bag: every side-effecting capability a step needs.
//!
//! The bag is explicit and fully constructed — there is no global default
//! executor and no fill-if-nil defaulting. [`Deps::production`] is the only
//! place real collaborators are wired; tests build the bag field by field
//! with recording fakes.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::setup::diagnostics;
use crate::setup::ops;
use crate::setup::plan::{ExternalRegistry, SetupPlan};
use crate::setup::readiness;
use crate::tools::Toolset;

pub type PlanFn = Box<dyn Fn(&SetupPlan) -> Result<()>>;
pub type LoginFn = Box<dyn Fn(&ExternalRegistry) -> Result<()>>;
pub type WaitFn = Box<dyn Fn(&str, &str, &str, Duration) -> Result<()>>;
pub type BuildImageFn = Box<dyn Fn(&SetupPlan) -> Result<String>>;
pub type PushImageFn = Box<dyn Fn(&str) -> Result<()>>;
pub type NamespaceFn = Box<dyn Fn(&str) -> Result<()>>;
pub type ManifestFn = Box<dyn Fn(&Path) -> Result<()>>;
pub type CredentialsFn = Box<dyn Fn(&ExternalRegistry, &str, &str) -> Result<()>>;
pub type RestartFn = Box<dyn Fn(&str, &str) -> Result<()>>;
pub type CrdFn = Box<dyn Fn(&str) -> Result<bool>>;
pub type DiagnoseFn = Box<dyn Fn(&str, &str) -> Result<()>>;

pub struct Deps {
    pub bootstrap_cluster: PlanFn,
    pub configure_tls: PlanFn,
    pub registry_login: LoginFn,
    pub deploy_registry: PlanFn,
    /// `(name, namespace, selector, timeout)`.
    pub wait_for_ready: WaitFn,
    pub build_image: BuildImageFn,
    pub push_image: PushImageFn,
    pub ensure_namespace: NamespaceFn,
    pub deploy_manifests: ManifestFn,
    /// `(registry, secret_name, namespace)`.
    pub configure_credentials: CredentialsFn,
    /// `(deployment, namespace)`.
    pub restart_deployment: RestartFn,
    pub crd_established: CrdFn,
    /// `(namespace, selector)`; best-effort, callers swallow failures.
    pub diagnose: DiagnoseFn,
    pub ready_timeout: Duration,
}

impl Deps {
    /// Wire the production collaborators over a shared toolset.
    pub fn production(tools: Arc<Toolset>, plan: &SetupPlan) -> Self {
        let ready_timeout = Duration::from_secs(plan.ready_timeout_secs);

        let bootstrap = Arc::clone(&tools);
        let tls = Arc::clone(&tools);
        let login = Arc::clone(&tools);
        let registry = Arc::clone(&tools);
        let wait = Arc::clone(&tools);
        let build = Arc::clone(&tools);
        let push = Arc::clone(&tools);
        let namespace = Arc::clone(&tools);
        let manifests = Arc::clone(&tools);
        let credentials = Arc::clone(&tools);
        let restart = Arc::clone(&tools);
        let crd = Arc::clone(&tools);
        let diagnose = tools;

        Self {
            bootstrap_cluster: Box::new(move |plan| {
                ops::bootstrap_cluster(bootstrap.cluster.as_ref(), plan)
            }),
            configure_tls: Box::new(move |plan| ops::configure_tls(tls.kubectl.as_ref(), plan)),
            registry_login: Box::new(move |registry| {
                ops::registry_login(login.docker.as_ref(), registry)
            }),
            deploy_registry: Box::new(move |plan| {
                ops::deploy_registry(registry.kubectl.as_ref(), plan)
            }),
            wait_for_ready: Box::new(move |name, namespace, selector, timeout| {
                readiness::wait_for_ready(
                    || ops::ready_replicas(wait.kubectl.as_ref(), name, namespace),
                    name,
                    namespace,
                    selector,
                    timeout,
                )
            }),
            build_image: Box::new(move |plan| ops::build_image(build.docker.as_ref(), plan)),
            push_image: Box::new(move |image| ops::push_image(push.docker.as_ref(), image)),
            ensure_namespace: Box::new(move |name| {
                ops::ensure_namespace(namespace.kubectl.as_ref(), name)
            }),
            deploy_manifests: Box::new(move |path| {
                ops::apply_manifests(manifests.kubectl.as_ref(), path)
            }),
            configure_credentials: Box::new(move |registry, secret_name, namespace| {
                ops::configure_credentials(
                    credentials.kubectl.as_ref(),
                    registry,
                    secret_name,
                    namespace,
                )
            }),
            restart_deployment: Box::new(move |name, namespace| {
                ops::restart_deployment(restart.kubectl.as_ref(), name, namespace)
            }),
            crd_established: Box::new(move |name| {
                ops::crd_established(crd.kubectl.as_ref(), name)
            }),
            diagnose: Box::new(move |namespace, selector| {
                diagnostics::dump_pod_state(diagnose.kubectl.as_ref(), namespace, selector)
            }),
            ready_timeout,
        }
    }
}
