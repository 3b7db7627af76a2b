use assert_cmd::Command;
use predicates::prelude::*;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use tempfile::NamedTempFile;

fn webunit() -> Command {
    let mut cmd = Command::cargo_bin("webunit").unwrap();
    cmd.arg("--no-color");
    cmd
}

fn test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn respond(stream: TcpStream) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap() == 0 || line.trim_end().is_empty() {
            break;
        }
    }

    let path = request_line.split_whitespace().nth(1).unwrap_or("/");
    let (status, body) = match path {
        "/" => ("200 OK", "<h1>Welcome to the site</h1>"),
        "/empty" => ("204 No Content", ""),
        "/old" => ("301 Moved Permanently", ""),
        _ => ("404 Not Found", "Not found"),
    };
    let mut stream = stream;
    let _ = write!(
        stream,
        "HTTP/1.1 {}\r\nContent-Type: text/html\r\nLocation: /\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
}

// Serves requests on a loopback port until the test process exits.
fn serve() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            respond(stream);
        }
    });
    port
}

#[test]
fn test_missing_argument_is_usage_error() {
    webunit().assert().code(2);
}

#[test]
fn test_invalid_set_is_usage_error() {
    let file = test_file("get http://localhost/\n");
    webunit()
        .args(["--set", "not-a-pair"])
        .arg(file.path())
        .assert()
        .code(2);
}

#[test]
fn test_unreadable_file() {
    webunit()
        .arg("/nonexistent/site.webunit")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Cannot read test file"));
}

#[test]
fn test_empty_file() {
    let file = test_file("\n\n");
    webunit()
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No test cases found"));
}

#[test]
fn test_parse_errors() {
    let file = test_file(
        "get http://localhost/\n\
         assert-contains a\n\
         \n\
         get http://localhost/b\n\
         foo\n\
         assert-empty !\n\
         assert-contains x y\n",
    );
    let path = file.path().display().to_string();
    webunit()
        .arg(file.path())
        .assert()
        .code(4)
        .stdout(predicate::str::contains(format!(
            "{}:5: Syntax error: Invalid command foo.",
            path
        )))
        .stdout(predicate::str::contains(format!(
            "{}:7: Extra argument: Unexpected argument y for assert-contains.",
            path
        )));
}

#[test]
fn test_passing_run() {
    let port = serve();
    let file = test_file(
        "set-default HOST = 127.0.0.1:1\n\
         get http://{HOST}/\n\
         assert-contains welcome ~\n\
         assert-header \"Content-Type: text/html\"\n\
         get http://{HOST}/empty\n\
         assert-empty\n\
         assert-status-code 204\n\
         assert-status-code 200 !\n",
    );
    webunit()
        .args(["--set", &format!("HOST=127.0.0.1:{}", port)])
        .arg(file.path())
        .assert()
        .code(0)
        .stdout(predicate::str::contains("All 2 test case(s) passed"));
}

#[test]
fn test_failing_run() {
    let port = serve();
    let file = test_file(
        "get http://127.0.0.1:{PORT}/\n\
         assert-contains Goodbye\n\
         get http://127.0.0.1:{PORT}/missing\n\
         get http://127.0.0.1:{PORT}/\n",
    );
    let path = file.path().display().to_string();
    webunit()
        .args(["--set", &format!("PORT={}", port)])
        .arg(file.path())
        .assert()
        .code(5)
        .stdout(predicate::str::contains(format!(
            "{}:2: Failed asserting that response body contains \"Goodbye\"",
            path
        )))
        .stdout(predicate::str::contains(format!(
            "{}:3: Failed asserting that status code 404 is successful (2xx)",
            path
        )))
        .stdout(predicate::str::contains(
            "Summary: 3 test case(s), 2 failed, 1 successful",
        ));
}

#[test]
fn test_redirect_not_followed_by_default() {
    let port = serve();
    let file = test_file("get http://127.0.0.1:{PORT}/old\n");
    webunit()
        .args(["--set", &format!("PORT={}", port)])
        .arg(file.path())
        .assert()
        .code(5)
        .stdout(predicate::str::contains("status code 301"));

    webunit()
        .args(["--follow-redirects", "--set", &format!("PORT={}", port)])
        .arg(file.path())
        .assert()
        .code(0);

    let asserted = test_file(
        "get http://127.0.0.1:{PORT}/old\n\
         assert-status-code 301\n\
         assert-header \"Location: /\"\n",
    );
    webunit()
        .args(["--set", &format!("PORT={}", port)])
        .arg(asserted.path())
        .assert()
        .code(0);
}

#[test]
fn test_non_success_status_code_assertion() {
    let port = serve();
    let file = test_file(
        "get http://127.0.0.1:{PORT}/missing\n\
         assert-status-code 404\n\
         assert-contains \"Not found\"\n\
         get http://127.0.0.1:{PORT}/missing\n\
         assert-status-code 200 !\n",
    );
    webunit()
        .args(["--set", &format!("PORT={}", port)])
        .arg(file.path())
        .assert()
        .code(0)
        .stdout(predicate::str::contains("All 2 test case(s) passed"));
}

#[test]
fn test_help_is_not_a_usage_error() {
    webunit()
        .arg("--help")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("--follow-redirects"));
}

#[test]
fn test_verbose_lists_assertions() {
    let port = serve();
    let file = test_file("get http://127.0.0.1:{PORT}/\nassert-contains Welcome\n");
    let path = file.path().display().to_string();
    webunit()
        .args(["-v", "--set", &format!("PORT={}", port)])
        .arg(file.path())
        .assert()
        .code(0)
        .stdout(predicate::str::contains(format!("✓ {}:1 default", path)))
        .stdout(predicate::str::contains(format!("✓ {}:2 assert-contains", path)));
}
