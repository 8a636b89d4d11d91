use std::path::PathBuf;

use super::Validator;
use crate::exec::ExecSpec;

fn spec(args: &[&str]) -> ExecSpec {
    ExecSpec {
        program: "kubectl".to_string(),
        args: args.iter().map(|arg| (*arg).to_string()).collect(),
    }
}

fn confined(root: &str) -> Validator {
    Validator::ConfinePaths {
        root: PathBuf::from(root),
    }
}

#[test]
fn shell_meta_rejects_each_banned_character() {
    for meta in ["&", "|", ";", "<", ">", "(", ")", "$", "`"] {
        let arg = format!("value{meta}tail");
        let result = Validator::NoShellMeta.check(&spec(&[&arg]));
        assert!(result.is_err(), "{arg:?} should be rejected");
    }
}

#[test]
fn shell_meta_accepts_plain_arguments() {
    let spec = spec(&["apply", "--filename", "registry/base", "name=value"]);
    assert!(Validator::NoShellMeta.check(&spec).is_ok());
}

#[test]
fn control_chars_rejects_cr_lf_and_tab() {
    for arg in ["a\rb", "a\nb", "a\tb"] {
        let result = Validator::NoControlChars.check(&spec(&[arg]));
        assert!(result.is_err(), "{arg:?} should be rejected");
    }
    assert!(Validator::NoControlChars.check(&spec(&["a b"])).is_ok());
}

#[test]
fn dash_is_always_accepted() {
    let validator = confined("/srv/manifests");
    assert!(validator.check(&spec(&["apply", "--filename", "-"])).is_ok());
    assert!(validator.check(&spec(&["--filename=-"])).is_ok());
}

#[test]
fn relative_paths_are_rejected_regardless_of_root() {
    // A relative argument is resolved by the child against the process
    // working directory, so `etc/hostname` run from `/` reads
    // `/etc/hostname` even though root.join("etc/hostname") sits inside
    // the root.
    let validator = confined("/srv/manifests");
    let err = validator.check(&spec(&["etc/hostname"])).unwrap_err();
    assert!(err.contains("working directory"), "unexpected message: {err}");
    assert!(validator.check(&spec(&["registry/base"])).is_err());
    assert!(validator
        .check(&spec(&["--filename=operator/deploy.yaml"]))
        .is_err());
}

#[test]
fn parent_traversal_escaping_root_is_rejected() {
    let validator = confined("/srv/manifests");
    assert!(validator.check(&spec(&["../outside.yaml"])).is_err());
    assert!(validator
        .check(&spec(&["registry/../../etc/passwd"]))
        .is_err());
    assert!(validator.check(&spec(&["--filename=../escape"])).is_err());
}

#[test]
fn absolute_paths_are_confined_to_root() {
    let validator = confined("/srv/manifests");
    assert!(validator
        .check(&spec(&["/srv/manifests/registry/base"]))
        .is_ok());
    assert!(validator.check(&spec(&["/etc/passwd"])).is_err());
    // Traversal out of an in-root absolute path is still caught.
    assert!(validator
        .check(&spec(&["/srv/manifests/../../etc/passwd"]))
        .is_err());
}

#[test]
fn non_path_arguments_are_not_confined() {
    let validator = confined("/srv/manifests");
    let spec = spec(&["get", "deployment", "registry", "--namespace", "platform"]);
    assert!(validator.check(&spec).is_ok());
}

#[test]
fn label_selectors_pass_confinement() {
    // The key may contain a slash; only the value after `=` is examined.
    let validator = confined("/srv/manifests");
    let spec = spec(&["--selector", "app.kubernetes.io/component=webhook"]);
    assert!(validator.check(&spec).is_ok());
}

#[test]
fn allow_list_rejects_unknown_programs() {
    let validator = Validator::AllowPrograms {
        allowed: &["kind", "kubectl"],
    };
    let allowed = ExecSpec {
        program: "kind".to_string(),
        args: Vec::new(),
    };
    let denied = ExecSpec {
        program: "bash".to_string(),
        args: Vec::new(),
    };
    assert!(validator.check(&allowed).is_ok());
    let err = validator.check(&denied).unwrap_err();
    assert!(err.contains("allow-list"), "unexpected message: {err}");
}
