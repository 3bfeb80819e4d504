//! Production pipeline: clean start, no source maps, staging cleanup and
//! image path markers.

use tokio_test::assert_ok;

use crate::fixtures::*;

#[tokio::test]
async fn test_prod_document() {
    let project = TestProject::new();

    assert_ok!(project.orchestrator().run("prod").await);

    let document = project.read_dist("index.html");
    assert!(document.starts_with(HEADER));
    assert!(document.ends_with(FOOTER));
    assert!(document.contains(
        "<main><img src=\"img/logo.png?$ORIGIN_PNG$\"><img src=\"a.jpg?$ORIGIN_JPG$\"></main>"
    ));
    // The production page is the copied page, not the body-wrapped one.
    assert!(!document.contains("<body>"));
    assert!(!document.contains(SOURCE_MAP));
    assert!(document.contains("<style>\n/*prefixed*//*compiled*/body { color: $c; }\n</style>"));
}

#[tokio::test]
async fn test_prod_removes_staging_and_fragments() {
    let project = TestProject::new();

    assert_ok!(project.orchestrator().run("prod").await);

    assert!(!project.exists("css/.tmp"));
    assert!(!project.exists("js/.tmp"));
    assert!(!project.exists("header.html"));
    assert!(!project.exists("footer.html"));
    assert!(project.exists("images/logo.png"));
    assert!(project.exists("js/bundleVendor.js"));
}

#[tokio::test]
async fn test_prod_rewrites_every_document() {
    let project = TestProject::new();

    assert_ok!(project.orchestrator().run("prod").await);

    let copied = project.read_dist("html/index.html");
    assert!(copied.contains("logo.png?$ORIGIN_PNG$"));
    assert!(!copied.contains("?$ORIGIN_PNG$?$ORIGIN_PNG$"));
}

#[tokio::test]
async fn test_prod_starts_from_clean_output() {
    let project = TestProject::new();
    project.write("dist/stale/old.js", "old");
    project.write("dist/leftover.txt", "old");

    assert_ok!(project.orchestrator().run("prod").await);

    assert!(!project.exists("stale"));
    assert!(!project.exists("leftover.txt"));
    assert!(project.exists("index.html"));
}

#[tokio::test]
async fn test_custom_markers() {
    let project = TestProject::new();
    project.write(
        "sitepipe.toml",
        "[markers]\npng = \"v=1\"\njpg = \"v=2\"\ngif = \"v=3\"\n",
    );
    let config = sitepipe::Config::load(&project.path).unwrap();

    assert_ok!(project.orchestrator_with(config).run("prod").await);

    let document = project.read_dist("index.html");
    assert!(document.contains("logo.png?v=1"));
    assert!(document.contains("a.jpg?v=2"));
}
