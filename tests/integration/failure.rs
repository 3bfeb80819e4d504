//! Failing tasks abort their sequence and leave later groups unrun.

use tokio_test::{assert_err, assert_ok};

use sitepipe::{Error, SchedulerEvent};

use crate::fixtures::*;

#[tokio::test]
async fn test_unknown_target() {
    let project = TestProject::new();
    let err = assert_err!(project.orchestrator().run("deploy").await);
    assert_eq!(err.to_string(), "Task not found: deploy");
}

#[tokio::test]
async fn test_lint_error_aborts_build() {
    let project = TestProject::new();
    project.write("src/scss/_vars.scss", "$c: red; // LINT_ERROR");
    let (orchestrator, mut rx) = project.observed();

    assert_ok!(orchestrator.run("copy-static").await);
    let err = assert_err!(orchestrator.run("build").await);

    match err {
        Error::TaskFailed { task, reason } => {
            assert_eq!(task, "sass");
            assert!(reason.contains("sass-lint"));
        }
        other => panic!("unexpected error {:?}", other),
    }

    let events = drain(&mut rx);
    assert_eq!(started_at(&events, "single-file"), None);
    assert_eq!(started_at(&events, "style-tag"), None);
    assert!(events
        .iter()
        .any(|e| matches!(e, SchedulerEvent::TaskFailed { task, .. } if task == "build")));
    assert!(!project.exists("css/style.css"));
    assert!(!project.exists("index.html"));
}

#[tokio::test]
async fn test_missing_page_fails_html_tag() {
    let project = TestProject::new();
    project.remove("src/index.html");
    let orchestrator = project.orchestrator();

    assert_ok!(orchestrator.run("copy-static").await);
    match assert_err!(orchestrator.run("build").await) {
        Error::TaskFailed { task, reason } => {
            assert_eq!(task, "html-tag");
            assert!(reason.starts_with("Input not found"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(!project.exists("index.html"));
}

#[tokio::test]
async fn test_missing_base_library_fails_modules() {
    let project = TestProject::new();
    project.remove("src/js/lib/jquery-2.2.4.min.js");

    let err = assert_err!(project.orchestrator().run("modules").await);
    assert!(matches!(err, Error::TaskFailed { ref task, .. } if task == "modules"));
    assert!(!project.exists("js/vendor.js"));
}

#[tokio::test]
async fn test_missing_fragments_fail_assembly() {
    let project = TestProject::new();

    let err = assert_err!(project.orchestrator().run("build").await);
    match err {
        Error::TaskFailed { task, reason } => {
            assert_eq!(task, "single-file");
            assert!(reason.contains("header.html"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_run_can_be_retried() {
    let project = TestProject::new();
    project.write("src/scss/style.scss", "LINT_ERROR");
    let orchestrator = project.orchestrator();

    assert_err!(orchestrator.run("sass").await);
    project.write("src/scss/style.scss", "a {}");
    assert_ok!(orchestrator.run("sass").await);
    assert!(project.exists("css/style.css"));
}

#[tokio::test]
async fn test_compile_error_publishes_no_css() {
    let project = TestProject::new();
    project.write("src/scss/zz-broken.scss", "a { COMPILE_ERROR }");

    match assert_err!(project.orchestrator().run("sass").await) {
        Error::TaskFailed { task, reason } => {
            assert_eq!(task, "sass");
            assert!(reason.starts_with("sass exited"));
            assert!(reason.contains("zz-broken.scss"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    // style.scss compiled fine but sorts first; it must not be written either.
    assert!(file_names(&project.dist("css")).is_empty());
}

#[tokio::test]
async fn test_prefix_error_publishes_no_css() {
    let project = TestProject::new();
    project.write("src/scss/zz-broken.scss", "a { PREFIX_ERROR }");

    let err = assert_err!(project.orchestrator().run("sass").await);
    assert!(err.to_string().contains("postcss"));
    assert!(file_names(&project.dist("css")).is_empty());
}

#[tokio::test]
async fn test_transpile_error_fails_min_js() {
    let project = TestProject::new();
    project.write("src/js/zz-broken.js", "TRANSPILE_ERROR");

    match assert_err!(project.orchestrator().run("min-js").await) {
        Error::TaskFailed { task, reason } => {
            assert_eq!(task, "min-js");
            assert!(reason.starts_with("babel exited"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(!project.exists("js/bundle.js"));
}

#[tokio::test]
async fn test_transpile_error_aborts_build() {
    let project = TestProject::new();
    project.write("src/js/zz-broken.js", "TRANSPILE_ERROR");
    let orchestrator = project.orchestrator();

    assert_ok!(orchestrator.run("copy-static").await);
    let err = assert_err!(orchestrator.run("build").await);

    assert!(matches!(err, Error::TaskFailed { ref task, .. } if task == "min-js"));
    assert!(!project.exists("js/bundle.js"));
    assert!(!project.exists("js/bundleVendor.js"));
    assert!(!project.exists("index.html"));
}
