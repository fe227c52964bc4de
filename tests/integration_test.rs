use raw_http_server::{ConnectionAcceptor, ServerConfig};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::PathBuf;
use std::sync::mpsc::channel;
use std::thread;
use std::time::{Duration, Instant};

const READ_TIMEOUT: Duration = Duration::from_millis(500);

// Runs a server on its own runtime thread and returns the bound address
fn start_server(directory: Option<PathBuf>) -> SocketAddr {
    let (tx, rx) = channel();

    thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let mut config = ServerConfig::new()
                .with_address("127.0.0.1", 0)
                .with_read_timeout(READ_TIMEOUT);
            if let Some(directory) = directory {
                config = config.with_directory(directory);
            }

            let acceptor = ConnectionAcceptor::bind(config).unwrap();
            tx.send(acceptor.local_addr()).unwrap();
            let _ = acceptor.run().await;
        });
    });

    rx.recv().unwrap()
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("raw-http-it-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn connect(addr: SocketAddr) -> TcpStream {
    let client = TcpStream::connect(addr).unwrap();
    client.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    client
}

// Sends one request and reads until the server closes the connection
fn send(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut client = connect(addr);
    client.write_all(request).unwrap();

    let mut response = Vec::new();
    client.read_to_end(&mut response).unwrap();
    response
}

fn send_str(addr: SocketAddr, request: &str) -> String {
    String::from_utf8(send(addr, request.as_bytes())).unwrap()
}

#[test]
fn test_root_ignores_headers() {
    let addr = start_server(None);

    assert_eq!(send_str(addr, "GET / HTTP/1.1\r\n\r\n"), "HTTP/1.1 200 OK\r\n\r\n");
    assert_eq!(
        send_str(addr, "GET / HTTP/1.1\r\nHost: localhost:4221\r\nAccept: */*\r\nX-Junk: 1\r\n\r\n"),
        "HTTP/1.1 200 OK\r\n\r\n"
    );
}

#[test]
fn test_echo() {
    let addr = start_server(None);

    for value in ["abc", "hello-world", "", "with%20escape"] {
        let response = send_str(addr, &format!("GET /echo/{} HTTP/1.1\r\n\r\n", value));
        assert_eq!(
            response,
            format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n{}",
                value.len(),
                value
            )
        );
    }
}

#[test]
fn test_user_agent() {
    let addr = start_server(None);

    assert_eq!(
        send_str(addr, "GET /user-agent HTTP/1.1\r\nHost: localhost\r\nUser-Agent: foo/1.0\r\n\r\n"),
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 7\r\n\r\nfoo/1.0"
    );
    assert_eq!(
        send_str(addr, "GET /user-agent HTTP/1.1\r\nHost: localhost\r\n\r\n"),
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 0\r\n\r\n"
    );
}

#[test]
fn test_unknown_path() {
    let addr = start_server(None);
    assert_eq!(send_str(addr, "GET /nope HTTP/1.1\r\n\r\n"), "HTTP/1.1 404 Not Found\r\n\r\n");
}

#[test]
fn test_file_round_trip() {
    let dir = scratch_dir("roundtrip");
    let addr = start_server(Some(dir.clone()));

    let body = "report body\nline two";
    let created = send_str(
        addr,
        &format!(
            "POST /files/report.txt HTTP/1.1\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        ),
    );
    assert_eq!(created, "HTTP/1.1 201 Created\r\n\r\n");
    assert_eq!(std::fs::read_to_string(dir.join("report.txt")).unwrap(), body);

    let fetched = send_str(addr, "GET /files/report.txt HTTP/1.1\r\n\r\n");
    assert_eq!(
        fetched,
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        )
    );
}

#[test]
fn test_large_file_is_streamed_back() {
    let dir = scratch_dir("large");
    let contents: Vec<u8> = (0..256 * 1024).map(|i| (i % 251) as u8).collect();
    std::fs::write(dir.join("blob.bin"), &contents).unwrap();
    let addr = start_server(Some(dir));

    let response = send(addr, b"GET /files/blob.bin HTTP/1.1\r\n\r\n");
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\n\r\n",
        contents.len()
    );
    assert!(response.starts_with(head.as_bytes()));
    assert_eq!(&response[head.len()..], &contents[..]);
}

#[test]
fn test_missing_file() {
    let addr = start_server(Some(scratch_dir("missing")));
    assert_eq!(
        send_str(addr, "GET /files/missing.txt HTTP/1.1\r\n\r\n"),
        "HTTP/1.1 404 Not Found\r\n\r\n"
    );
}

#[test]
fn test_upload_without_content_length() {
    let addr = start_server(Some(scratch_dir("nolength")));
    assert_eq!(
        send_str(addr, "POST /files/x.txt HTTP/1.1\r\n\r\nabc"),
        "HTTP/1.1 400 Bad Request\r\n\r\n"
    );
}

#[test]
fn test_short_upload_does_not_hang() {
    let dir = scratch_dir("short");
    let addr = start_server(Some(dir.clone()));

    let mut client = connect(addr);
    client
        .write_all(b"POST /files/x.txt HTTP/1.1\r\nContent-Length: 100\r\n\r\nonly a little")
        .unwrap();

    // The client keeps its end open; the server must give up on its own
    let started = Instant::now();
    let mut response = Vec::new();
    client.read_to_end(&mut response).unwrap();

    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(response, b"HTTP/1.1 500 Internal Server Error\r\n\r\n");
    assert!(!dir.join("x.txt").exists());
}

#[test]
fn test_files_without_directory() {
    let addr = start_server(None);
    assert_eq!(
        send_str(addr, "GET /files/a.txt HTTP/1.1\r\n\r\n"),
        "HTTP/1.1 404 Not Found\r\n\r\n"
    );
    assert_eq!(
        send_str(addr, "POST /files/a.txt HTTP/1.1\r\nContent-Length: 1\r\n\r\na"),
        "HTTP/1.1 500 Internal Server Error\r\n\r\n"
    );
}

#[test]
fn test_malformed_request_closes_silently() {
    let addr = start_server(None);
    assert!(send(addr, b"BROKEN\r\n\r\n").is_empty());
}

#[test]
fn test_concurrent_connections() {
    const NUM_CLIENTS: usize = 10;

    let addr = start_server(None);

    // An idle client must not hold up anyone else
    let idle = connect(addr);

    let mut client_threads = Vec::with_capacity(NUM_CLIENTS);
    for client_id in 0..NUM_CLIENTS {
        client_threads.push(thread::spawn(move || {
            let value = format!("client-{}", client_id);
            let response = send_str(addr, &format!("GET /echo/{} HTTP/1.1\r\n\r\n", value));
            assert_eq!(
                response,
                format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n{}",
                    value.len(),
                    value
                )
            );
        }));
    }

    for thread in client_threads {
        thread.join().unwrap();
    }
    drop(idle);
}
