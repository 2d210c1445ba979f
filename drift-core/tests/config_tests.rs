//! Config error-message, init, and path-selection integration tests.

use assert_fs::prelude::*;
use drift_core::{
    config::{self, Settings},
    input, ConfigError, PathFilter, RelativePath,
};
use predicates::prelude::predicate;

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn corrupt_yaml_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".drift").create_dir_all().expect("mkdir");
    home.child(".drift/config.yaml")
        .write_str("concurrency: [unclosed\n")
        .expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"), "got: {err}");
}

#[test]
fn wrong_type_yaml_returns_parse_error() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".drift").create_dir_all().expect("mkdir");
    home.child(".drift/config.yaml")
        .write_str("- this is a list, not a mapping\n")
        .expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

#[test]
fn missing_target_message_names_the_flag() {
    let err = Settings::default().target().unwrap_err();
    assert!(err.to_string().contains("-t"));
}

// ---------------------------------------------------------------------------
// 2. Init
// ---------------------------------------------------------------------------

#[test]
fn init_writes_loadable_yaml() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let (written, created) = config::init_at(home.path(), Some("web01".into())).expect("init");
    assert!(created);

    home.child(".drift/config.yaml")
        .assert(predicate::path::exists())
        .assert(predicate::str::contains("target: web01"))
        .assert(predicate::str::contains("remote_root: /var/www/html"));

    let loaded = config::load_at(home.path()).expect("load");
    assert_eq!(loaded, written);
}

// ---------------------------------------------------------------------------
// 3. Path selection feeding an input list
// ---------------------------------------------------------------------------

#[test]
fn filter_output_roundtrips_through_a_path_list() {
    let workspace = assert_fs::TempDir::new().expect("tempdir");
    for dir in ["html/css", "data/Smarty/templates_c"] {
        workspace.child(dir).create_dir_all().expect("mkdir");
    }
    workspace.child("html/index.php").write_str("<?php").unwrap();
    workspace.child("html/css/site.css").write_str("body{}").unwrap();
    workspace.child("data/Smarty/templates_c/x.php").write_str("cache").unwrap();
    workspace.child("dump.sql").write_str("--").unwrap();

    let filter = PathFilter::from_settings(&Settings::default());
    let paths = filter.collect(workspace.path()).expect("collect");
    let names: Vec<&str> = paths.iter().map(RelativePath::as_str).collect();
    assert_eq!(names, ["html/css/site.css", "html/index.php"]);

    let list = workspace.child("list.txt");
    input::write_path_list(list.path(), &paths).expect("write list");
    list.assert("html/css/site.css\nhtml/index.php\n");
    assert_eq!(input::read_path_list(list.path()).expect("read"), paths);
}
