//! Shared test infrastructure: a recording dependency bag and plan helpers.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;

use groundwork::cli::{IngressArg, RegistryArg, SetupArgs};
use groundwork::setup::deps::Deps;
use groundwork::setup::plan::SetupPlan;

/// One dependency invocation made by the pipeline, with the arguments that
/// matter for ordering assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Bootstrap,
    ConfigureTls,
    Login { url: String },
    DeployRegistry,
    Wait { name: String, namespace: String },
    BuildImage,
    PushImage { image: String },
    EnsureNamespace { namespace: String },
    DeployManifests { path: PathBuf },
    ConfigureCredentials { secret: String, namespace: String },
    RestartDeployment { name: String },
    CrdCheck { name: String },
    Diagnose { namespace: String, selector: String },
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn record(log: &CallLog, call: Call) {
    log.lock().unwrap().push(call);
}

pub fn calls(log: &CallLog) -> Vec<Call> {
    log.lock().unwrap().clone()
}

/// A dependency bag where every operation succeeds and records itself.
/// Tests override individual fields to inject failures.
pub fn recording_deps(log: &CallLog) -> Deps {
    let bootstrap = Arc::clone(log);
    let tls = Arc::clone(log);
    let login = Arc::clone(log);
    let registry = Arc::clone(log);
    let wait = Arc::clone(log);
    let build = Arc::clone(log);
    let push = Arc::clone(log);
    let namespace = Arc::clone(log);
    let manifests = Arc::clone(log);
    let credentials = Arc::clone(log);
    let restart = Arc::clone(log);
    let crd = Arc::clone(log);
    let diagnose = Arc::clone(log);

    Deps {
        bootstrap_cluster: Box::new(move |_| {
            record(&bootstrap, Call::Bootstrap);
            Ok(())
        }),
        configure_tls: Box::new(move |_| {
            record(&tls, Call::ConfigureTls);
            Ok(())
        }),
        registry_login: Box::new(move |target| {
            record(
                &login,
                Call::Login {
                    url: target.url.clone(),
                },
            );
            Ok(())
        }),
        deploy_registry: Box::new(move |_| {
            record(&registry, Call::DeployRegistry);
            Ok(())
        }),
        wait_for_ready: Box::new(move |name, ns, _, _| {
            record(
                &wait,
                Call::Wait {
                    name: name.to_string(),
                    namespace: ns.to_string(),
                },
            );
            Ok(())
        }),
        build_image: Box::new(move |plan| {
            record(&build, Call::BuildImage);
            Ok(plan.operator_image_target())
        }),
        push_image: Box::new(move |image| {
            record(
                &push,
                Call::PushImage {
                    image: image.to_string(),
                },
            );
            Ok(())
        }),
        ensure_namespace: Box::new(move |ns| {
            record(
                &namespace,
                Call::EnsureNamespace {
                    namespace: ns.to_string(),
                },
            );
            Ok(())
        }),
        deploy_manifests: Box::new(move |path| {
            record(
                &manifests,
                Call::DeployManifests {
                    path: path.to_path_buf(),
                },
            );
            Ok(())
        }),
        configure_credentials: Box::new(move |_, secret, ns| {
            record(
                &credentials,
                Call::ConfigureCredentials {
                    secret: secret.to_string(),
                    namespace: ns.to_string(),
                },
            );
            Ok(())
        }),
        restart_deployment: Box::new(move |name, _| {
            record(
                &restart,
                Call::RestartDeployment {
                    name: name.to_string(),
                },
            );
            Ok(())
        }),
        crd_established: Box::new(move |name| {
            record(
                &crd,
                Call::CrdCheck {
                    name: name.to_string(),
                },
            );
            Ok(true)
        }),
        diagnose: Box::new(move |ns, selector| {
            record(
                &diagnose,
                Call::Diagnose {
                    namespace: ns.to_string(),
                    selector: selector.to_string(),
                },
            );
            Ok(())
        }),
        ready_timeout: Duration::from_secs(1),
    }
}

pub fn manifest_root() -> TempDir {
    tempfile::tempdir().expect("create manifest root")
}

pub fn base_args(manifest_root: &Path) -> SetupArgs {
    SetupArgs {
        registry: RegistryArg::Internal,
        storage_size: "10Gi".to_string(),
        ingress: IngressArg::NodePort,
        ingress_manifest: None,
        external_registry_url: None,
        external_registry_username: None,
        external_registry_password: None,
        tls: false,
        test_mode: false,
        force: false,
        manifest_root: Some(manifest_root.to_path_buf()),
        cluster_name: "groundwork".to_string(),
        cluster_args: None,
        timeout: 300,
        registry_port: 5000,
        dry_run: false,
        verbose: false,
    }
}

pub fn plan_for(args: &SetupArgs) -> SetupPlan {
    SetupPlan::resolve(args).expect("resolve plan")
}
