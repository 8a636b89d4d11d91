use std::path::PathBuf;

use super::{IngressMode, RegistryKind, SetupPlan};
use crate::cli::{IngressArg, RegistryArg, SetupArgs};

fn base_args(manifest_root: &std::path::Path) -> SetupArgs {
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

fn manifest_root() -> tempfile::TempDir {
    tempfile::tempdir().expect("create temp manifest root")
}

#[test]
fn internal_defaults_resolve() {
    let root = manifest_root();
    let plan = SetupPlan::resolve(&base_args(root.path())).unwrap();
    assert_eq!(plan.registry, RegistryKind::Internal);
    assert_eq!(plan.ingress, IngressMode::NodePort);
    assert!(plan.external_registry.is_none());
    assert!(!plan.tls_enabled);
}

#[test]
fn registry_manifest_selects_tls_overlay() {
    let root = manifest_root();
    let mut args = base_args(root.path());
    let plan = SetupPlan::resolve(&args).unwrap();
    assert!(plan.registry_manifest().ends_with("registry/base"));

    args.tls = true;
    let plan = SetupPlan::resolve(&args).unwrap();
    assert!(plan.registry_manifest().ends_with("registry/tls"));
}

#[test]
fn credentials_without_url_are_rejected() {
    let root = manifest_root();
    let mut args = base_args(root.path());
    args.external_registry_username = Some("robot".to_string());
    args.external_registry_password = Some("hunter2".to_string());
    let err = SetupPlan::resolve(&args).unwrap_err();
    assert!(err.to_string().contains("registry"), "got: {err}");
}

#[test]
fn external_registry_requires_url() {
    let root = manifest_root();
    let mut args = base_args(root.path());
    args.registry = RegistryArg::External;
    assert!(SetupPlan::resolve(&args).is_err());

    args.external_registry_url = Some("registry.example.com".to_string());
    let plan = SetupPlan::resolve(&args).unwrap();
    let registry = plan.external_registry.unwrap();
    assert_eq!(registry.url, "registry.example.com");
    assert!(!registry.has_credentials());
}

#[test]
fn username_without_password_is_rejected() {
    let root = manifest_root();
    let mut args = base_args(root.path());
    args.registry = RegistryArg::External;
    args.external_registry_url = Some("registry.example.com".to_string());
    args.external_registry_username = Some("robot".to_string());
    assert!(SetupPlan::resolve(&args).is_err());
}

#[test]
fn ingress_mode_requires_manifest() {
    let root = manifest_root();
    let mut args = base_args(root.path());
    args.ingress = IngressArg::Ingress;
    assert!(SetupPlan::resolve(&args).is_err());

    args.ingress_manifest = Some(PathBuf::from("registry/ingress.yaml"));
    assert!(SetupPlan::resolve(&args).is_ok());
}

#[test]
fn ingress_manifest_is_anchored_under_the_manifest_root() {
    let root = manifest_root();
    let mut args = base_args(root.path());
    args.ingress = IngressArg::Ingress;
    args.ingress_manifest = Some(PathBuf::from("registry/ingress.yaml"));
    let plan = SetupPlan::resolve(&args).unwrap();
    let manifest = plan.ingress_manifest.unwrap();
    assert!(manifest.is_absolute());
    assert!(manifest.starts_with(&plan.manifest_root));
    assert!(manifest.ends_with("registry/ingress.yaml"));

    // An already-absolute path is taken as given.
    args.ingress_manifest = Some(plan.manifest_root.join("other/ingress.yaml"));
    let plan = SetupPlan::resolve(&args).unwrap();
    assert!(plan
        .ingress_manifest
        .unwrap()
        .ends_with("other/ingress.yaml"));
}

#[test]
fn cluster_args_split_shell_style() {
    let root = manifest_root();
    let mut args = base_args(root.path());
    args.cluster_args = Some("--config kind.yaml --wait 60s".to_string());
    let plan = SetupPlan::resolve(&args).unwrap();
    assert_eq!(plan.cluster_args, ["--config", "kind.yaml", "--wait", "60s"]);
}

#[test]
fn missing_manifest_root_is_a_configuration_error() {
    let mut args = base_args(&PathBuf::from("/definitely/not/a/real/dir"));
    args.manifest_root = Some(PathBuf::from("/definitely/not/a/real/dir"));
    assert!(SetupPlan::resolve(&args).is_err());
}

#[test]
fn image_target_prefers_external_registry() {
    let root = manifest_root();
    let mut args = base_args(root.path());
    let plan = SetupPlan::resolve(&args).unwrap();
    assert_eq!(
        plan.operator_image_target(),
        "localhost:5000/groundwork-operator:latest"
    );

    args.registry = RegistryArg::External;
    args.external_registry_url = Some("registry.example.com".to_string());
    let plan = SetupPlan::resolve(&args).unwrap();
    assert_eq!(
        plan.operator_image_target(),
        "registry.example.com/groundwork-operator:latest"
    );
}
