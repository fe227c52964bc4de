pub mod acceptor;
pub mod config;
pub mod connection;
pub mod error;
pub mod handlers;
pub mod http;
pub mod parser;
pub mod router;
pub mod static_files;
pub mod writer;

/// Re-exports of common components for easier access
pub use acceptor::ConnectionAcceptor;
pub use config::ServerConfig;
pub use connection::{Connection, ConnectionContext, ConnectionState};
pub use error::{ServerError, ServerResult};
pub use handlers::Handlers;
pub use http::{Body, Headers, Method, Request, Response, Status};
pub use parser::RequestParser;
pub use router::{Route, Router};
pub use static_files::FileStore;
