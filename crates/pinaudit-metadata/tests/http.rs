use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pinaudit_core::source::DependencySource;
use pinaudit_metadata::auth::Credentials;
use pinaudit_metadata::http::HttpSource;

#[derive(Debug, Clone)]
struct Recorded {
    request_line: String,
    authorization: Option<String>,
}

/// A one-shot HTTP server answering each connection with the next canned
/// `(status, body)` pair.
struct MockServer {
    base: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockServer {
    fn start(responses: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        std::thread::spawn(move || {
            for (status, body) in responses {
                let Ok((stream, _)) = listener.accept() else {
                    return;
                };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                let mut authorization = None;
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        if name.eq_ignore_ascii_case("authorization") {
                            authorization = Some(value.trim().to_string());
                        }
                    }
                }
                recorded.lock().unwrap().push(Recorded {
                    request_line: request_line.trim_end().to_string(),
                    authorization,
                });

                let mut stream = stream;
                let response = format!(
                    "HTTP/1.1 {status} MOCK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        Self { base, requests }
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

fn source(server: &MockServer, credentials: Credentials, retries: u32) -> HttpSource {
    HttpSource::new(&server.base, credentials, Duration::from_secs(5), retries)
        .unwrap()
        .with_retry_delay(Duration::from_millis(10))
}

#[test]
fn dependencies_are_decoded() {
    let server = MockServer::start(vec![(
        200,
        r#"[{"targetFramework":"net8.0","dependencyName":"Lib","dependencyVersionRange":"[2.0.0, 3.0.0)"}]"#,
    )]);
    let s = source(&server, Credentials::Bearer("s3cret".to_string()), 1);

    let rows = s.fetch_dependencies("App", "1.0.0").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].target_framework, "net8.0");
    assert_eq!(rows[0].dependency_name, "Lib");
    assert_eq!(rows[0].dependency_version_range, "[2.0.0, 3.0.0)");

    let requests = server.requests();
    assert_eq!(
        requests[0].request_line,
        "GET /packages/App/1.0.0/dependencies HTTP/1.1"
    );
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer s3cret"));
}

#[test]
fn assemblies_with_basic_auth() {
    let server = MockServer::start(vec![(
        200,
        r#"[{"assemblyName":"Lib.dll","assemblyVersion":"2.0.0.0","libraryDirectoryPath":"lib/net8.0"}]"#,
    )]);
    let creds = Credentials::Basic {
        username: "ci".to_string(),
        password: Some("pw".to_string()),
    };
    let s = source(&server, creds, 1);

    let rows = s.fetch_assemblies("Lib", "2.0.0").unwrap();
    assert_eq!(rows[0].assembly_name, "Lib.dll");
    assert_eq!(rows[0].library_directory_path, "lib/net8.0");
    let requests = server.requests();
    assert_eq!(
        requests[0].request_line,
        "GET /packages/Lib/2.0.0/assemblies HTTP/1.1"
    );
    assert_eq!(requests[0].authorization.as_deref(), Some("Basic Y2k6cHc="));
}

#[test]
fn not_found_is_empty() {
    let server = MockServer::start(vec![(404, "")]);
    let s = source(&server, Credentials::Anonymous, 3);
    assert!(s.fetch_dependencies("Ghost", "1.0.0").unwrap().is_empty());
    assert_eq!(server.requests().len(), 1);
    assert!(server.requests()[0].authorization.is_none());
}

#[test]
fn server_errors_are_retried() {
    let server = MockServer::start(vec![(503, ""), (500, ""), (200, "[]")]);
    let s = source(&server, Credentials::Anonymous, 2);
    assert!(s.fetch_dependencies("App", "1.0.0").unwrap().is_empty());
    assert_eq!(server.requests().len(), 3);
}

#[test]
fn retries_are_bounded() {
    // One first attempt plus two retries; the fourth response is never asked for.
    let server = MockServer::start(vec![(500, ""), (500, ""), (500, ""), (200, "[]")]);
    let s = source(&server, Credentials::Anonymous, 2);
    let err = s.fetch_dependencies("App", "1.0.0").unwrap_err();
    assert!(err.to_string().contains("Failed after 3 attempts"), "got: {err}");
    assert_eq!(server.requests().len(), 3);
}

#[test]
fn zero_retries_is_a_single_attempt() {
    let server = MockServer::start(vec![(502, ""), (200, "[]")]);
    let s = source(&server, Credentials::Anonymous, 0);
    let err = s.fetch_dependencies("App", "1.0.0").unwrap_err();
    assert!(err.to_string().contains("Failed after 1 attempts"), "got: {err}");
    assert_eq!(server.requests().len(), 1);
}

#[test]
fn client_errors_fail_immediately() {
    let server = MockServer::start(vec![(401, ""), (200, "[]")]);
    let s = source(&server, Credentials::Anonymous, 3);
    let err = s.fetch_dependencies("App", "1.0.0").unwrap_err();
    assert!(err.to_string().contains("Metadata query failed"), "got: {err}");
    assert!(err.to_string().contains("401"), "got: {err}");
    assert_eq!(server.requests().len(), 1);
}

#[test]
fn malformed_body_is_a_query_error() {
    let server = MockServer::start(vec![(200, r#"{"not":"a list"}"#)]);
    let s = source(&server, Credentials::Anonymous, 1);
    let err = s.fetch_dependencies("App", "1.0.0").unwrap_err();
    assert!(err.to_string().contains("Invalid response"), "got: {err}");
}
