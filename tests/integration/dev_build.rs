//! Development pipeline outputs.

use tokio_test::assert_ok;

use crate::fixtures::*;

fn expected_css() -> String {
    format!("/*prefixed*//*compiled*/body {{ color: $c; }}\n{}", SOURCE_MAP)
}

fn expected_scripts() -> String {
    format!(
        "/*jquery*/\n/*popup*/\n/*extra*/\n/*es5*/console.log('app');\n{}",
        SOURCE_MAP
    )
}

#[tokio::test]
async fn test_build_assembles_single_document() {
    let project = TestProject::new();
    let orchestrator = project.orchestrator();

    assert_ok!(orchestrator.run("copy-static").await);
    assert_ok!(orchestrator.run("build").await);

    let expected = [
        HEADER.to_string(),
        format!("<style>\n{}\n</style>", expected_css()),
        format!("<body>\n{}\n</body>", PAGE),
        format!("<script>\n{}\n</script>", expected_scripts()),
        FOOTER.to_string(),
    ]
    .join("\n");
    assert_eq!(project.read_dist("index.html"), expected);
}

#[tokio::test]
async fn test_build_keeps_staging_artifacts() {
    let project = TestProject::new();
    let orchestrator = project.orchestrator();

    assert_ok!(orchestrator.run("copy-static").await);
    assert_ok!(orchestrator.run("build").await);

    assert_eq!(project.read_dist("css/style.css"), expected_css());
    assert!(project.exists("css/.tmp/cssWithTag.css"));
    assert!(project.exists("js/.tmp/bundleVendorWithTag.js"));
    assert!(project.exists("html/indexWithBodyTag.html"));
    assert_eq!(project.read_dist("js/bundleVendor.js"), expected_scripts());
    // Development documents are not rewritten.
    assert!(!project.read_dist("index.html").contains("$ORIGIN_PNG$"));
}

#[tokio::test]
async fn test_partials_produce_no_css() {
    let project = TestProject::new();
    project.write("src/scss/pages/home.scss", ".home {}");

    assert_ok!(project.orchestrator().run("sass").await);

    assert_eq!(file_names(&project.dist("css")), vec!["pages", "style.css"]);
    assert!(project.exists("css/pages/home.css"));
    assert!(!project.exists("css/_vars.css"));
}

#[tokio::test]
async fn test_copy_static_keeps_paths_relative_to_source_root() {
    let project = TestProject::new();

    assert_ok!(project.orchestrator().run("copy-static").await);

    assert_eq!(project.read_dist("images/logo.png"), "PNG");
    assert_eq!(project.read_dist("fonts/icons.woff"), "WOFF");
    assert_eq!(project.read_dist("header.html"), HEADER);
    assert_eq!(project.read_dist("footer.html"), FOOTER);
    assert!(!project.exists("index.html"));
}

#[tokio::test]
async fn test_copy_lib_css() {
    let project = TestProject::new();

    assert_ok!(project.orchestrator().run("copy-lib-css").await);

    assert_eq!(project.read_dist("css/reset.css"), "* { margin: 0; }");
}

#[tokio::test]
async fn test_copy_html_skips_fragments() {
    let project = TestProject::new();
    project.write("src/about/index.html", "<p>about</p>");

    assert_ok!(project.orchestrator().run("copy-html").await);

    assert_eq!(project.read_dist("html/index.html"), PAGE);
    assert_eq!(project.read_dist("html/about/index.html"), "<p>about</p>");
    assert!(!project.exists("html/header.html"));
    assert!(!project.exists("html/footer.html"));
}
