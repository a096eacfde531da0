use std::fs;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use og_preview::OgMetadata;
use predicates::prelude::*;

fn spawn_site_server() -> (String, mpsc::Sender<()>, thread::JoinHandle<()>) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
    let base_url = format!("http://{}", server.server_addr());

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }
            let request = match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(req)) => req,
                Ok(None) => continue,
                Err(_) => break,
            };

            let (status, body, content_type): (u16, &[u8], &str) = match request.url() {
                "/article" => (
                    200,
                    b"<!doctype html>
<html>
  <head>
    <title>Caf\xe9 notes</title>
    <meta property=\"og:image\" content=\"/cover.png\">
  </head>
  <body>
    <nav>Home | About</nav>
    <p>Cr\xe8me br\xfbl\xe9e recipes.</p>
  </body>
</html>
",
                    "text/html; charset=ISO-8859-1",
                ),
                _ => (404, b"not found", "text/plain"),
            };

            let mut response =
                tiny_http::Response::from_data(body.to_vec()).with_status_code(status);
            let header =
                tiny_http::Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes())
                    .expect("build header");
            response.add_header(header);
            let _ = request.respond(response);
        }
    });

    (base_url, shutdown_tx, handle)
}

#[test]
fn encoding_prints_declared_charset() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let page = temp.path().join("page.html");
    fs::write(&page, r#"<html><head><meta charset="Shift_JIS"></head></html>"#)?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("og-preview");
    cmd.args(["encoding", "--file", page.to_str().unwrap()])
        .assert()
        .success()
        .stdout("Shift_JIS\n");
    Ok(())
}

#[test]
fn encoding_reads_header_from_flag() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("og-preview");
    cmd.args(["encoding", "--file", "-", "--content-type", "text/html; charset=ascii"])
        .write_stdin("<html></html>")
        .assert()
        .success()
        .stdout("ascii\n");
}

#[test]
fn extract_prints_metadata_json() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let page = temp.path().join("page.html");
    fs::write(
        &page,
        "<html><head><title>Foo</title></head><body>Some text.<!-- c -->More.</body></html>",
    )?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("og-preview");
    let output = cmd
        .args([
            "extract",
            "--file",
            page.to_str().unwrap(),
            "--url",
            "http://example.com/page.html",
        ])
        .output()?;
    assert!(output.status.success());

    let og: OgMetadata = serde_json::from_slice(&output.stdout)?;
    assert_eq!(og.title(), Some("Foo"));
    assert_eq!(og.description(), Some("Some text.\n\nMore."));
    Ok(())
}

#[test]
fn extract_of_empty_file_prints_empty_object() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let page = temp.path().join("empty.html");
    fs::write(&page, "")?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("og-preview");
    cmd.args([
        "extract",
        "--file",
        page.to_str().unwrap(),
        "--url",
        "http://example.com/",
    ])
    .assert()
    .success()
    .stdout("{}\n");
    Ok(())
}

#[test]
fn extract_rejects_invalid_url() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("og-preview");
    cmd.args(["extract", "--file", "-", "--url", "not a url"])
        .write_stdin("<title>x</title>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("parse target url"));
}

#[test]
fn extract_rejects_inverted_budget() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("og-preview");
    cmd.args([
        "extract",
        "--file",
        "-",
        "--url",
        "http://example.com/",
        "--min-size",
        "50",
        "--max-size",
        "10",
    ])
    .write_stdin("<title>x</title>")
    .assert()
    .failure()
    .stderr(predicate::str::contains("must not exceed max size"));
}

#[test]
fn summarize_reads_blank_line_separated_paragraphs() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("og-preview");
    cmd.args(["summarize", "--file", "-", "--min-size", "5", "--max-size", "40"])
        .write_stdin("First paragraph\nwraps here.\n\nSecond paragraph is ignored.\n")
        .assert()
        .success()
        .stdout("First paragraph wraps here.\n");
}

#[test]
fn preview_fetches_and_extracts() -> anyhow::Result<()> {
    let (base_url, shutdown_tx, server_handle) = spawn_site_server();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("og-preview");
    let output = cmd
        .args(["preview", "--url", &format!("{base_url}/article")])
        .output()?;

    let _ = shutdown_tx.send(());
    let _ = server_handle.join();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let og: OgMetadata = serde_json::from_slice(&output.stdout)?;
    assert_eq!(og.title(), Some("Café notes"));
    assert_eq!(og.description(), Some("Crème brûlée recipes."));
    assert_eq!(
        og.value("og:image"),
        Some(format!("{base_url}/cover.png").as_str())
    );
    Ok(())
}

#[test]
fn preview_fails_on_missing_page() {
    let (base_url, shutdown_tx, server_handle) = spawn_site_server();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("og-preview");
    cmd.args(["preview", "--url", &format!("{base_url}/missing")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("404"));

    let _ = shutdown_tx.send(());
    let _ = server_handle.join();
}

#[test]
fn rust_log_debug_emits_debug_line_to_stderr() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("og-preview");
    cmd.env("RUST_LOG", "debug")
        .args(["encoding", "--file", "-"])
        .write_stdin("")
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));
}
