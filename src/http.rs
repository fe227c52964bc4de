use std::collections::HashMap;
use std::fmt;
use tokio::fs::File;

/// HTTP Status Codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok = 200,
    Created = 201,

    BadRequest = 400,
    Forbidden = 403,
    NotFound = 404,

    InternalServerError = 500,
}

impl Status {
    /// Get the text description for this status code
    pub fn as_str(&self) -> &'static str {
        match *self {
            Status::Ok => "OK",
            Status::Created => "Created",

            Status::BadRequest => "Bad Request",
            Status::Forbidden => "Forbidden",
            Status::NotFound => "Not Found",

            Status::InternalServerError => "Internal Server Error",
        }
    }

    pub fn code(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.as_str())
    }
}

/// HTTP Methods
///
/// Any token is accepted on the request line; the ones the server knows by
/// name get their own variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Options,
    Patch,
    Other(String),
}

impl Method {
    /// Parse a method from a request-line token
    pub fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "OPTIONS" => Method::Options,
            "PATCH" => Method::Patch,
            other => Method::Other(other.to_string()),
        }
    }

    /// Convert the method to a string
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
            Method::Other(token) => token.as_str(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request header map.
///
/// Names are stored exactly as received (no case folding) and a repeated
/// name replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    map: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, returning the value it replaced
    pub fn insert(&mut self, name: &str, value: &str) -> Option<String> {
        self.map.insert(name.to_string(), value.to_string())
    }

    /// Look up a header by its exact name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    /// The `Content-Length` header parsed as a byte count
    pub fn content_length(&self) -> Option<u64> {
        self.get("Content-Length")?.parse().ok()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// HTTP Request
///
/// Holds the request head only. The body stays on the connection until a
/// handler asks for it.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    /// Protocol token from the request line, empty if the client omitted it
    pub version: String,
    pub headers: Headers,
}

impl Request {
    /// Create a new request
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            version: "HTTP/1.1".to_string(),
            headers: Headers::new(),
        }
    }

    /// Set a header
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name, value);
    }

    /// Get a header
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

/// Response body
#[derive(Debug)]
pub enum Body {
    Empty,
    Bytes(Vec<u8>),
    /// An open file streamed to the client, with its size taken at open time
    File { file: File, len: u64 },
}

/// HTTP Response
#[derive(Debug)]
pub struct Response {
    pub status: Status,
    pub content_type: Option<&'static str>,
    pub body: Body,
}

impl Response {
    /// Create a new response with no body and no content headers
    pub fn new(status: Status) -> Self {
        Self {
            status,
            content_type: None,
            body: Body::Empty,
        }
    }

    /// A `text/plain` response carrying `text`
    pub fn text(status: Status, text: &str) -> Self {
        Self {
            status,
            content_type: Some("text/plain"),
            body: Body::Bytes(text.as_bytes().to_vec()),
        }
    }

    /// An `application/octet-stream` response streaming `file`
    pub fn file(file: File, len: u64) -> Self {
        Self {
            status: Status::Ok,
            content_type: Some("application/octet-stream"),
            body: Body::File { file, len },
        }
    }

    /// Value for the Content-Length header, `None` when no body is framed
    pub fn content_length(&self) -> Option<u64> {
        match &self.body {
            Body::Empty => None,
            Body::Bytes(bytes) => Some(bytes.len() as u64),
            Body::File { len, .. } => Some(*len),
        }
    }

    /// In-memory body bytes, empty for streamed or absent bodies
    pub fn body_bytes(&self) -> &[u8] {
        match &self.body {
            Body::Bytes(bytes) => bytes,
            _ => &[],
        }
    }
}
