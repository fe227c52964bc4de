use crate::error::{ServerError, ServerResult};
use crate::http::{Headers, Method, Request};
use log::debug;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// HTTP Parser State
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    RequestLine,
    Headers,
    Complete,
}

/// One line pulled off the stream, surrounding whitespace stripped.
enum Line {
    Complete(Vec<u8>),
    /// The stream ended before a `\n`; holds whatever arrived.
    Eof(Vec<u8>),
}

/// Line-oriented reader for a request head.
///
/// Reads exactly up to and including the blank line that ends the header
/// block; body bytes are left in the reader for the handler that wants them.
#[derive(Debug)]
pub struct RequestParser {
    state: ParserState,
    limit: usize,
    budget: usize,
}

impl RequestParser {
    /// Create a parser that refuses heads larger than `max_head_size` bytes
    pub fn new(max_head_size: usize) -> Self {
        Self {
            state: ParserState::RequestLine,
            limit: max_head_size,
            budget: max_head_size,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Read the request line and header block from `reader`
    pub async fn read_request<R>(&mut self, reader: &mut R) -> ServerResult<Request>
    where
        R: AsyncBufRead + Unpin,
    {
        let (method, path, version) = self.read_request_line(reader).await?;
        let headers = self.read_headers(reader).await?;
        Ok(Request {
            method,
            path,
            version,
            headers,
        })
    }

    /// Read and tokenize the first line of a request
    pub async fn read_request_line<R>(&mut self, reader: &mut R) -> ServerResult<(Method, String, String)>
    where
        R: AsyncBufRead + Unpin,
    {
        self.state = ParserState::RequestLine;
        self.budget = self.limit;

        let line = match self.read_line(reader).await? {
            Line::Complete(line) => line,
            Line::Eof(partial) if partial.is_empty() => return Err(ServerError::ConnectionClosed),
            Line::Eof(partial) => {
                return Err(ServerError::MalformedRequestLine(
                    String::from_utf8_lossy(&partial).into_owned(),
                ))
            }
        };
        // Request lines must be valid UTF-8; nothing is decoded lossily
        let line = String::from_utf8(line).map_err(|e| {
            ServerError::MalformedRequestLine(String::from_utf8_lossy(e.as_bytes()).into_owned())
        })?;
        let (method, path, version) = parse_request_line(&line)?;

        self.state = ParserState::Headers;
        Ok((method, path.to_string(), version.to_string()))
    }

    /// Read header lines up to and including the blank line
    pub async fn read_headers<R>(&mut self, reader: &mut R) -> ServerResult<Headers>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut headers = Headers::new();
        loop {
            let line = match self.read_line(reader).await? {
                Line::Complete(line) => line,
                Line::Eof(_) => return Err(ServerError::IncompleteHeaders),
            };
            if line.is_empty() {
                break;
            }
            let line = match String::from_utf8(line) {
                Ok(line) => line,
                Err(e) => {
                    debug!("Skipping non-UTF-8 header line: {:?}", e.as_bytes());
                    continue;
                }
            };
            match parse_header_line(&line) {
                Some((name, value)) => {
                    headers.insert(name, value);
                }
                None => debug!("Skipping header line without separator: {:?}", line),
            }
        }

        self.state = ParserState::Complete;
        Ok(headers)
    }

    async fn read_line<R>(&mut self, reader: &mut R) -> ServerResult<Line>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        let n = (&mut *reader)
            .take(self.budget as u64)
            .read_until(b'\n', &mut buf)
            .await?;
        self.budget -= n;

        let text = trim_ascii(&buf).to_vec();
        if buf.last() == Some(&b'\n') {
            Ok(Line::Complete(text))
        } else if self.budget == 0 {
            Err(ServerError::HeadersTooLarge(self.limit))
        } else {
            Ok(Line::Eof(text))
        }
    }
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// Split a trimmed request line into method, path and protocol token.
///
/// Tokens are separated by single spaces. The protocol token may be missing.
pub fn parse_request_line(line: &str) -> ServerResult<(Method, &str, &str)> {
    let parts: Vec<&str> = line.split(' ').collect();
    if parts.len() < 2 {
        return Err(ServerError::MalformedRequestLine(line.to_string()));
    }
    let version = parts.get(2).copied().unwrap_or("");
    Ok((Method::parse(parts[0]), parts[1], version))
}

/// Split a header line on the first `": "`.
pub fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(": ")
}
