use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::http::{Headers, Request, Response, Status};
use crate::router::Route;
use crate::static_files::FileStore;
use log::warn;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::time;

/// The route behaviors, plus what they need from the server configuration
#[derive(Debug, Clone)]
pub struct Handlers {
    files: FileStore,
    read_timeout: Duration,
}

impl Handlers {
    pub fn new(files: FileStore, read_timeout: Duration) -> Self {
        Self {
            files,
            read_timeout,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(FileStore::new(config.directory.clone()), config.read_timeout)
    }

    /// Run the handler for `route`.
    ///
    /// `body` is the connection's unread input; only the file upload reads
    /// from it. Handler errors are turned into their status response here.
    pub async fn handle<R>(&self, route: Route<'_>, request: &Request, body: &mut R) -> Response
    where
        R: AsyncRead + Unpin,
    {
        let result = match route {
            Route::Root => Ok(Response::new(Status::Ok)),
            Route::Echo(value) => Ok(echo(value)),
            Route::UserAgent => Ok(user_agent(&request.headers)),
            Route::ReadFile(name) => self.read_file(name).await,
            Route::WriteFile(name) => self.write_file(name, &request.headers, body).await,
            Route::NotFound => Ok(Response::new(Status::NotFound)),
        };

        result.unwrap_or_else(|e| {
            warn!("{} {}: {}", request.method, request.path, e);
            Response::new(e.status().unwrap_or(Status::InternalServerError))
        })
    }

    /// Stream a file from the serving directory
    pub async fn read_file(&self, name: &str) -> ServerResult<Response> {
        let (file, len) = self.files.open(name).await?;
        Ok(Response::file(file, len))
    }

    /// Store exactly `Content-Length` bytes of `body` under `name`
    pub async fn write_file<R>(&self, name: &str, headers: &Headers, body: &mut R) -> ServerResult<Response>
    where
        R: AsyncRead + Unpin,
    {
        let len = headers
            .content_length()
            .ok_or(ServerError::MissingOrInvalidContentLength)?;

        let mut file = self.files.create(name).await?;

        let mut limited = (&mut *body).take(len);
        let outcome = match time::timeout(self.read_timeout, tokio::io::copy(&mut limited, &mut file)).await {
            Ok(Ok(copied)) if copied == len => file.flush().await,
            Ok(Ok(copied)) => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("body ended after {} of {} bytes", copied, len),
            )),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("body not received within {:?}", self.read_timeout),
            )),
        };
        drop(file);

        if let Err(source) = outcome {
            self.files.discard(name).await;
            return Err(ServerError::FileIo {
                name: name.to_string(),
                source,
            });
        }

        Ok(Response::new(Status::Created))
    }
}

/// Echo the path parameter back as plain text
pub fn echo(value: &str) -> Response {
    Response::text(Status::Ok, value)
}

/// Reflect the `User-Agent` header, or an empty body when absent
pub fn user_agent(headers: &Headers) -> Response {
    Response::text(Status::Ok, headers.get("User-Agent").unwrap_or(""))
}
