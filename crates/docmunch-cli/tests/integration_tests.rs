use assert_cmd::cargo;
use httpmock::{Method::GET, MockServer};
use std::fs;
use std::path::Path;

fn docmunch(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo::cargo_bin_cmd!("docmunch");
    cmd.current_dir(dir)
        .env("DOCMUNCH_DELAY_MS", "0")
        .env("DOCMUNCH_CHROME", "/nonexistent/docmunch-test-chrome")
        .env("RUST_LOG", "off");
    cmd
}

fn stdout_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).to_string()
}

fn stderr_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stderr).to_string()
}

fn docs_page(title: &str, body: &str) -> String {
    format!(
        r#"<html><head><title>{title} | Example Docs</title>
        <meta name="description" content="Example documentation"></head><body>
        <header>Site header</header>
        <aside><nav>
            <a href="/docs/intro">Intro</a>
            <a href="/docs/setup">Setup</a>
            <a href="/docs/usage">Usage</a>
        </nav></aside>
        <main><h1>{title}</h1><p>{body}</p></main>
        <footer>Footer</footer></body></html>"#
    )
}

fn serve_docs(server: &MockServer) {
    for (path, title) in [("/docs/intro", "Intro"), ("/docs/setup", "Setup"), ("/docs/usage", "Usage")] {
        let body = format!(
            "The {} page explains one part of the example product in enough detail to count as real documentation content. \
             It covers configuration, common pitfalls and the commands you will run most often.",
            title
        );
        server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(200)
                .header("content-type", "text/html")
                .body(docs_page(title, &body));
        });
    }
}

#[test]
fn test_fetch_single_page_to_file() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start();
    serve_docs(&server);
    let dir = tempfile::tempdir()?;

    docmunch(dir.path())
        .arg(server.url("/docs/intro"))
        .arg("-o")
        .arg("intro.md")
        .assert()
        .success()
        .code(0);

    let written = fs::read_to_string(dir.path().join("intro.md"))?;
    assert!(written.starts_with("---\nsource: "));
    assert!(written.contains("platform: generic"));
    assert!(written.contains("Intro"));
    assert!(written.contains("explains one part"));
    assert!(!written.contains("Site header"));
    assert!(!written.contains("Footer"));
    Ok(())
}

#[test]
fn test_add_and_list() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;

    let assert = docmunch(dir.path())
        .args(["add", "https://docs.example.com/guide", "--crawl"])
        .assert()
        .success();
    assert!(stdout_of(&assert).contains("docs-example-com.md"));
    assert!(dir.path().join(".docmunch.yaml").is_file());

    docmunch(dir.path())
        .args(["add", "https://api.example.com/", "--name", "api", "-o", "api.md"])
        .assert()
        .success();

    let assert = docmunch(dir.path()).arg("list").assert().success();
    let listing = stdout_of(&assert);
    assert!(listing.contains("docs-example-com\thttps://docs.example.com/guide\tcrawl (depth 2)\tdocs-example-com.md"));
    assert!(listing.contains("api\thttps://api.example.com/\tpage\tapi.md"));
    Ok(())
}

#[test]
fn test_add_rejects_invalid_url() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;

    docmunch(dir.path()).args(["add", "not a url"]).assert().failure();
    assert!(!dir.path().join(".docmunch.yaml").exists());
    Ok(())
}

#[test]
fn test_update_without_config() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;

    let assert = docmunch(dir.path()).arg("update").assert().failure();
    assert!(stderr_of(&assert).contains("No .docmunch.yaml found"));
    Ok(())
}

#[test]
fn test_update_directory_source() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start();
    serve_docs(&server);
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join(".docmunch.yaml"),
        format!(
            "version: 1\noutput_dir: out\nsources:\n  - name: example\n    url: {}\n    crawl: true\n    max_depth: 2\n    output: example\n",
            server.url("/docs/intro")
        ),
    )?;

    docmunch(dir.path()).arg("update").assert().success();

    let source_dir = dir.path().join("out/example");
    for page in ["intro.md", "setup.md", "usage.md"] {
        assert!(source_dir.join(page).is_file(), "missing {}", page);
    }

    let index: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(source_dir.join("_index.json"))?)?;
    assert_eq!(index["name"], "example");
    assert_eq!(index["platform"], "generic");
    assert_eq!(index["display_name"], "Intro");
    assert_eq!(index["pages"][0]["path"], "intro.md");
    assert_eq!(index["pages"].as_array().map(Vec::len), Some(3));

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out/manifest.json"))?)?;
    assert_eq!(manifest["sources"][0]["name"], "example");
    assert_eq!(manifest["sources"][0]["path"], "example");
    assert_eq!(manifest["sources"][0]["page_count"], 3);

    let before = fs::read_to_string(source_dir.join("intro.md"))?;
    let assert = docmunch(dir.path()).arg("update").assert().success();
    assert!(stdout_of(&assert).contains("example: unchanged"));
    assert_eq!(fs::read_to_string(source_dir.join("intro.md"))?, before);
    Ok(())
}

#[test]
fn test_update_unknown_source_name() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join(".docmunch.yaml"), "sources: []\n")?;

    let assert = docmunch(dir.path())
        .args(["update", "--name", "missing"])
        .assert()
        .failure();
    assert!(stderr_of(&assert).contains("missing"));
    Ok(())
}

#[test]
fn test_no_arguments_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    docmunch(dir.path()).assert().failure();
}
