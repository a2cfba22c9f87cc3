use log::{debug, error, info, warn};
use std::fs;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::net::TcpStream;
use std::path::{Component, Path, PathBuf};

use super::http_status::HttpStatus;
use crate::static_files::html_content;

static MIME_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("json", "application/json"),
    ("txt", "text/plain"),
];

/// Sent on every response so the browser re-fetches test pages on each
/// reload instead of replaying a cached copy mid-development.
static NO_CACHE_HEADERS: &str =
    "Cache-Control: no-cache, no-store, must-revalidate\r\nPragma: no-cache\r\nExpires: 0\r\n";

pub fn handle_client(mut stream: TcpStream, root: &Path) {
    let peer_addr = match stream.peer_addr() {
        Ok(addr) => addr.to_string(),
        Err(_) => "unknown".to_string(),
    };

    debug!("Handling request from {}", peer_addr);

    let mut buffer = [0u8; 8192];
    let bytes_read = match stream.read(&mut buffer) {
        Ok(0) => {
            debug!("Connection closed by client {}", peer_addr);
            return;
        }
        Ok(n) => n,
        Err(e) => {
            error!("Error reading from {}: {}", peer_addr, e);
            return;
        }
    };

    let request = String::from_utf8_lossy(&buffer[..bytes_read]);
    let request_line: Vec<&str> = match request.lines().next() {
        Some(line) => line.split_whitespace().collect(),
        None => Vec::new(),
    };

    if request_line.len() < 2 {
        let outcome = send_error(&mut stream, HttpStatus::BadRequest);
        log_outcome("-", "<malformed request>", &peer_addr, outcome);
        return;
    }

    let method = request_line[0];
    let raw_path = request_line[1];

    // Test pages append query strings; they never select a different file.
    let path = raw_path.split('?').next().unwrap_or(raw_path);

    let outcome = if method != "GET" && method != "HEAD" {
        warn!("Unsupported method from {}: {}", peer_addr, method);
        send_error(&mut stream, HttpStatus::MethodNotAllowed)
    } else if path.contains("..") || !path.starts_with('/') {
        warn!("Path traversal attempt from {}: {}", peer_addr, raw_path);
        send_error(&mut stream, HttpStatus::Forbidden)
    } else if path == "/" && !root.join("index.html").is_file() {
        send_landing_page(&mut stream, method == "HEAD")
    } else {
        let rel = if path == "/" { "index.html" } else { &path[1..] };
        match resolve_under_root(root, rel) {
            Some(file_path) => serve_file(&mut stream, &file_path, method == "HEAD", &peer_addr),
            None => {
                warn!("Path escapes the served root from {}: {}", peer_addr, raw_path);
                send_error(&mut stream, HttpStatus::Forbidden)
            }
        }
    };

    log_outcome(method, raw_path, &peer_addr, outcome);
}

fn log_outcome(method: &str, raw_path: &str, peer_addr: &str, outcome: io::Result<HttpStatus>) {
    match outcome {
        Ok(status) => info!("{} {} -> {} {}", method, raw_path, status.code(), status.text()),
        Err(e) => {
            error!("Error sending response to {}: {}", peer_addr, e);
            info!("{} {} -> aborted", method, raw_path);
        }
    }
}

/// Maps a request path onto a file under `root`. Every component must be
/// a plain name, so absolute forms (`//etc/passwd`) and dot components
/// cannot make `join` leave the root.
fn resolve_under_root(root: &Path, rel: &str) -> Option<PathBuf> {
    let rel = Path::new(rel);
    let mut components = rel.components().peekable();
    components.peek()?;
    if components.all(|c| matches!(c, Component::Normal(_))) {
        Some(root.join(rel))
    } else {
        None
    }
}

fn serve_file(
    stream: &mut TcpStream,
    file_path: &Path,
    is_head: bool,
    client_addr: &str,
) -> io::Result<HttpStatus> {
    if !file_path.exists() {
        debug!("File not found for {}: {:?}", client_addr, file_path);
        return send_error(stream, HttpStatus::NotFound);
    }

    if !file_path.is_file() {
        warn!("Attempt to access directory from {}: {:?}", client_addr, file_path);
        return send_error(stream, HttpStatus::Forbidden);
    }

    let metadata = match fs::metadata(file_path) {
        Ok(meta) => meta,
        Err(e) => {
            error!("Error getting metadata for {:?}: {}", file_path, e);
            return send_error(stream, HttpStatus::InternalServerError);
        }
    };

    let content_type = content_type_for(file_path);
    let headers = format!(
        "{}Content-Type: {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
        HttpStatus::Ok.as_response_line(),
        content_type,
        metadata.len(),
        NO_CACHE_HEADERS
    );

    if is_head {
        stream.write_all(headers.as_bytes())?;
        return Ok(HttpStatus::Ok);
    }

    match fs::File::open(file_path) {
        Ok(file) => {
            let mut reader = BufReader::new(file);
            let mut writer = BufWriter::new(stream);

            writer.write_all(headers.as_bytes())?;

            let mut buffer = [0u8; 8192];
            loop {
                match reader.read(&mut buffer) {
                    Ok(0) => break,
                    Ok(n) => writer.write_all(&buffer[..n])?,
                    Err(e) => {
                        // Truncates a response whose status is already on
                        // the wire; nothing better to send at this point.
                        error!("Error reading file for {}: {}", client_addr, e);
                        break;
                    }
                }
            }

            writer.flush()?;
            Ok(HttpStatus::Ok)
        }
        Err(e) => {
            error!("Error opening file {:?} for {}: {}", file_path, client_addr, e);
            send_error(stream, HttpStatus::InternalServerError)
        }
    }
}

/// Served for `/` when the root has no index.html, so opening the bare
/// server address still lands somewhere useful.
fn send_landing_page(stream: &mut TcpStream, is_head: bool) -> io::Result<HttpStatus> {
    let body = html_content::landing_page();
    let headers = format!(
        "{}Content-Type: text/html\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
        HttpStatus::Ok.as_response_line(),
        body.len(),
        NO_CACHE_HEADERS
    );

    let mut response = headers.into_bytes();
    if !is_head {
        response.extend_from_slice(body.as_bytes());
    }

    stream.write_all(&response)?;
    Ok(HttpStatus::Ok)
}

fn send_error(stream: &mut TcpStream, status: HttpStatus) -> io::Result<HttpStatus> {
    let body = format!(
        "<html><body><h1>{} {}</h1></body></html>",
        status.code(),
        status.text()
    );
    let response = format!(
        "{}Content-Type: text/html\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n{}",
        status.as_response_line(),
        body.len(),
        NO_CACHE_HEADERS,
        body
    );

    stream.write_all(response.as_bytes())?;
    Ok(status)
}

fn content_type_for(file_path: &Path) -> &'static str {
    let ext = file_path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    MIME_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or("application/octet-stream")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Shutdown, TcpListener};
    use std::thread;

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "sdk-test-server-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("create temp root");
        dir
    }

    /// Runs one request/response cycle against `handle_client` over a
    /// real loopback socket and returns the raw response text.
    fn roundtrip(root: &Path, request: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().unwrap();
        let root = root.to_path_buf();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            handle_client(stream, &root);
        });

        let mut client = TcpStream::connect(addr).expect("connect");
        client.write_all(request.as_bytes()).expect("send request");
        let mut response = String::new();
        client.read_to_string(&mut response).expect("read response");
        server.join().unwrap();
        response
    }

    /// Accepted stream whose write side is already dead, for exercising
    /// the aborted-response paths.
    fn dead_stream() -> TcpStream {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).expect("connect");
        let (server_side, _) = listener.accept().expect("accept");
        server_side.shutdown(Shutdown::Both).expect("shutdown");
        drop(client);
        server_side
    }

    #[test]
    fn get_existing_file_returns_body_and_no_cache_headers() {
        let root = temp_root("get-ok");
        fs::write(root.join("index.html"), "<h1>ok</h1>").unwrap();

        let response = roundtrip(&root, "GET /index.html HTTP/1.1\r\n\r\n");

        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Cache-Control: no-cache, no-store, must-revalidate\r\n"));
        assert!(response.contains("Expires: 0\r\n"));
        assert!(response.contains("Content-Type: text/html\r\n"));
        assert!(response.ends_with("<h1>ok</h1>"));
    }

    #[test]
    fn root_path_serves_index_when_present() {
        let root = temp_root("root-index");
        fs::write(root.join("index.html"), "<h1>ok</h1>").unwrap();

        let response = roundtrip(&root, "GET / HTTP/1.1\r\n\r\n");

        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("<h1>ok</h1>"));
    }

    #[test]
    fn root_path_without_index_serves_landing_page() {
        let root = temp_root("root-landing");
        let _ = fs::remove_file(root.join("index.html"));

        let response = roundtrip(&root, "GET / HTTP/1.1\r\n\r\n");

        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Cache-Control: no-cache, no-store, must-revalidate\r\n"));
        assert!(response.contains("test-comprehensive.html"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let root = temp_root("missing");

        let response = roundtrip(&root, "GET /nope.html HTTP/1.1\r\n\r\n");

        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(response.contains("Cache-Control: no-cache, no-store, must-revalidate\r\n"));
    }

    #[test]
    fn parent_traversal_is_forbidden() {
        let root = temp_root("traversal");

        let response = roundtrip(&root, "GET /../../etc/passwd HTTP/1.1\r\n\r\n");

        assert!(response.starts_with("HTTP/1.1 403 Forbidden\r\n"));
        assert!(!response.contains("root:"));
    }

    #[test]
    fn absolute_path_after_double_slash_is_forbidden() {
        let root = temp_root("double-slash");
        let secret = std::env::temp_dir().join(format!(
            "sdk-test-server-outside-{}.txt",
            std::process::id()
        ));
        fs::write(&secret, "TOP-SECRET").unwrap();

        // Request path starts with two slashes, so the part after the
        // first one is an absolute path outside the root.
        let request = format!("GET /{} HTTP/1.1\r\n\r\n", secret.display());
        let response = roundtrip(&root, &request);

        assert!(response.starts_with("HTTP/1.1 403 Forbidden\r\n"));
        assert!(!response.contains("TOP-SECRET"));
    }

    #[test]
    fn resolve_under_root_accepts_only_plain_components() {
        let root = Path::new("/srv/pages");

        assert_eq!(
            resolve_under_root(root, "index.html"),
            Some(PathBuf::from("/srv/pages/index.html"))
        );
        assert_eq!(
            resolve_under_root(root, "sub/page.html"),
            Some(PathBuf::from("/srv/pages/sub/page.html"))
        );
        assert_eq!(resolve_under_root(root, "/etc/passwd"), None);
        assert_eq!(resolve_under_root(root, "a/../b"), None);
        assert_eq!(resolve_under_root(root, "./a"), None);
        assert_eq!(resolve_under_root(root, ""), None);
    }

    #[test]
    fn head_returns_headers_without_body() {
        let root = temp_root("head");
        fs::write(root.join("page.html"), "<h1>head</h1>").unwrap();

        let response = roundtrip(&root, "HEAD /page.html HTTP/1.1\r\n\r\n");

        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Content-Length: 13\r\n"));
        assert!(response.ends_with("\r\n\r\n"));
    }

    #[test]
    fn post_is_method_not_allowed() {
        let root = temp_root("post");

        let response = roundtrip(&root, "POST /index.html HTTP/1.1\r\n\r\n");

        assert!(response.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
    }

    #[test]
    fn malformed_request_line_is_bad_request() {
        let root = temp_root("malformed");

        let response = roundtrip(&root, "GARBAGE\r\n\r\n");

        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[test]
    fn query_string_does_not_change_the_file() {
        let root = temp_root("query");
        fs::write(root.join("test.html"), "<p>q</p>").unwrap();

        let response = roundtrip(&root, "GET /test.html?run=1 HTTP/1.1\r\n\r\n");

        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("<p>q</p>"));
    }

    #[test]
    fn send_error_reports_a_dead_connection() {
        let mut stream = dead_stream();

        let result = send_error(&mut stream, HttpStatus::NotFound);

        assert!(result.is_err());
    }

    #[test]
    fn serve_file_reports_a_dead_connection_instead_of_ok() {
        let root = temp_root("dead-conn");
        fs::write(root.join("page.html"), "<h1>dead</h1>").unwrap();
        let mut stream = dead_stream();

        let result = serve_file(&mut stream, &root.join("page.html"), false, "test");

        assert!(result.is_err());
    }

    #[test]
    fn content_type_is_inferred_from_extension() {
        assert_eq!(content_type_for(Path::new("a.html")), "text/html");
        assert_eq!(content_type_for(Path::new("a.js")), "application/javascript");
        assert_eq!(content_type_for(Path::new("a.json")), "application/json");
        assert_eq!(content_type_for(Path::new("a.bin")), "application/octet-stream");
    }
}
