//! Scheduling and concatenation order.

use tokio_test::assert_ok;

use sitepipe::SchedulerEvent;

use crate::fixtures::*;

#[tokio::test]
async fn test_vendor_bundle_order() {
    let project = TestProject::new();
    project.write("src/js/lib/a-first-alphabetically.js", "/*alpha*/");

    assert_ok!(project.orchestrator().run("modules").await);

    // Base library first, declared modules next, remaining library files last.
    assert_eq!(
        project.read_dist("js/vendor.js"),
        "/*jquery*/\n/*popup*/\n/*alpha*/\n/*extra*/"
    );
}

#[tokio::test]
async fn test_app_bundle_excludes_library_directory() {
    let project = TestProject::new();
    project.write("src/js/widgets/menu.js", "menu();");

    assert_ok!(project.orchestrator().run("min-js").await);

    let bundle = project.read_dist("js/bundle.js");
    assert!(bundle.contains("/*es5*/console.log('app');"));
    assert!(bundle.contains("/*es5*/menu();"));
    assert!(!bundle.contains("jquery"));
    assert!(!bundle.contains("extra"));
    assert!(bundle.find("app").unwrap() < bundle.find("menu").unwrap());
}

#[tokio::test]
async fn test_prerequisites_finish_before_dependents() {
    let project = TestProject::new();
    let (orchestrator, mut rx) = project.observed();

    assert_ok!(orchestrator.run("script-tag").await);

    let events = drain(&mut rx);
    assert_before(&events, "min-js", "script-tag");
    assert_before(&events, "sass", "script-tag");
    assert_before(&events, "modules", "script-tag");
}

#[tokio::test]
async fn test_shared_prerequisite_runs_once() {
    let project = TestProject::new();
    let (orchestrator, mut rx) = project.observed();

    assert_ok!(orchestrator.run("copy-static").await);
    assert_ok!(orchestrator.run("build").await);

    let events = drain(&mut rx);
    assert_eq!(start_count(&events, "sass"), 1);
    assert_before(&events, "sass", "style-tag");
    assert_before(&events, "style-tag", "single-file");
    assert_before(&events, "script-tag", "single-file");
    assert_before(&events, "html-tag", "single-file");
}

#[tokio::test]
async fn test_prod_groups_run_in_order() {
    let project = TestProject::new();
    let (orchestrator, mut rx) = project.observed();

    assert_ok!(orchestrator.run("prod").await);

    let events = drain(&mut rx);
    for member in ["script-tag", "copy-html", "style-tag", "copy-static"] {
        assert_before(&events, "clean", member);
        assert_before(&events, member, "single-file-prod");
    }
    assert_before(&events, "single-file-prod", "clean-tmp");
    assert_before(&events, "clean-tmp", "change-img-path");

    let groups: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            SchedulerEvent::GroupComplete { sequence, index } if sequence == "prod" => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(groups, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn test_cleanup_is_idempotent() {
    let project = TestProject::new();
    let orchestrator = project.orchestrator();
    assert_ok!(orchestrator.run("copy-static").await);
    assert_ok!(orchestrator.run("build").await);

    assert_ok!(orchestrator.run("clean-tmp").await);
    let once = file_names(&project.dist(""));
    assert_ok!(orchestrator.run("clean-tmp").await);
    assert_eq!(file_names(&project.dist("")), once);
    assert!(!once.contains(&"header.html".to_string()));

    assert_ok!(orchestrator.run("clean").await);
    assert_ok!(orchestrator.run("clean").await);
    assert!(file_names(&project.dist("")).is_empty());
}

#[tokio::test]
async fn test_clean_without_output_directory() {
    let project = TestProject::new();
    assert_ok!(project.orchestrator().run("clean").await);
    assert!(!project.exists(""));
}

#[tokio::test]
async fn test_history_follows_completion() {
    let project = TestProject::new();
    let orchestrator = project.orchestrator();

    assert_ok!(orchestrator.run("style-tag").await);

    let names: Vec<String> = orchestrator.history().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["sass", "style-tag"]);
}
