use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handlers::Handlers;
use crate::http::Request;
use crate::parser::RequestParser;
use crate::router::Router;
use crate::writer;
use log::{debug, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{self, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::time::{self, Instant};

/// Represents the current state of a connection
///
/// Transitions only move forward; a connection serves exactly one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    AwaitRequestLine,
    AwaitHeaders,
    Dispatched,
    WritingResponse,
    Closed,
}

/// Read-only state shared by every connection task
#[derive(Debug)]
pub struct ConnectionContext {
    pub config: ServerConfig,
    pub router: Router,
    pub handlers: Handlers,
}

impl ConnectionContext {
    pub fn new(config: ServerConfig) -> Self {
        let handlers = Handlers::from_config(&config);
        Self {
            config,
            router: Router::new(),
            handlers,
        }
    }
}

/// One accepted client connection
pub struct Connection<S> {
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    peer_addr: SocketAddr,
    id: usize,
    state: ConnectionState,
    context: Arc<ConnectionContext>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite,
{
    /// Create a new connection from a stream
    pub fn new(stream: S, peer_addr: SocketAddr, id: usize, context: Arc<ConnectionContext>) -> Self {
        let (read_half, write_half) = io::split(stream);
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            peer_addr,
            id,
            state: ConnectionState::AwaitRequestLine,
            context,
        }
    }

    /// Get the connection's peer address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Get the connection's unique ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get the current state of the connection
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Read one request, answer it, and close the stream.
    ///
    /// The stream is shut down on every path, including parse failures that
    /// leave the client without a response.
    pub async fn serve(mut self) -> ServerResult<()> {
        let result = self.process().await;
        self.close().await;
        result
    }

    async fn process(&mut self) -> ServerResult<()> {
        let request = self.read_request().await?;

        self.state = ConnectionState::Dispatched;
        let route = self.context.router.resolve(&request.method, &request.path);
        debug!("Connection {} dispatched to {:?}", self.id, route);
        let response = self
            .context
            .handlers
            .handle(route, &request, &mut self.reader)
            .await;

        info!(
            "{} {} {} -> {}",
            self.peer_addr, request.method, request.path, response.status
        );

        self.state = ConnectionState::WritingResponse;
        let write_timeout = self.context.config.write_timeout;
        time::timeout(write_timeout, writer::write_response(&mut self.writer, response))
            .await
            .map_err(|_| ServerError::Timeout(write_timeout))??;

        Ok(())
    }

    /// Read the request head within the configured read deadline
    async fn read_request(&mut self) -> ServerResult<Request> {
        let read_timeout = self.context.config.read_timeout;
        let deadline = Instant::now() + read_timeout;
        let mut parser = RequestParser::new(self.context.config.max_header_size);

        self.state = ConnectionState::AwaitRequestLine;
        let (method, path, version) = time::timeout_at(deadline, parser.read_request_line(&mut self.reader))
            .await
            .map_err(|_| ServerError::Timeout(read_timeout))??;

        self.state = ConnectionState::AwaitHeaders;
        let headers = time::timeout_at(deadline, parser.read_headers(&mut self.reader))
            .await
            .map_err(|_| ServerError::Timeout(read_timeout))??;

        Ok(Request {
            method,
            path,
            version,
            headers,
        })
    }

    async fn close(&mut self) {
        self.state = ConnectionState::Closed;
        if let Err(e) = self.writer.shutdown().await {
            debug!("Connection {} shutdown: {}", self.id, e);
        }
    }
}
