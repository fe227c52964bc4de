use crate::config::ServerConfig;
use crate::connection::{Connection, ConnectionContext};
use crate::error::{ServerError, ServerResult};
use log::{debug, info, warn};
use socket2::{Domain, Protocol, Socket, Type};
use std::future::Future;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// The ConnectionAcceptor owns the listening socket and hands every accepted
/// connection to its own Tokio task.
pub struct ConnectionAcceptor {
    listener: TcpListener,
    address: SocketAddr,
    connection_count: AtomicUsize,
    context: Arc<ConnectionContext>,
}

impl ConnectionAcceptor {
    /// Bind the address named by `config`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn bind(config: ServerConfig) -> ServerResult<Self> {
        let address = config.socket_address();
        let bind_error = |source: io::Error| ServerError::Bind {
            address: address.clone(),
            source,
        };

        let socket_addr = address
            .to_socket_addrs()
            .map_err(bind_error)?
            .next()
            .ok_or_else(|| bind_error(io::Error::new(io::ErrorKind::InvalidInput, "No socket addresses found")))?;

        let socket = Self::create_socket(&socket_addr, config.backlog_size).map_err(bind_error)?;
        let listener = TcpListener::from_std(socket.into()).map_err(bind_error)?;
        let address = listener.local_addr().map_err(bind_error)?;

        Ok(Self {
            listener,
            address,
            connection_count: AtomicUsize::new(0),
            context: Arc::new(ConnectionContext::new(config)),
        })
    }

    /// Get the local address this acceptor is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.address
    }

    /// Number of connections accepted so far
    pub fn connection_count(&self) -> usize {
        self.connection_count.load(Ordering::Relaxed)
    }

    /// Accept a new connection
    pub async fn accept(&self) -> ServerResult<Connection<TcpStream>> {
        let (stream, peer_addr) = self.listener.accept().await.map_err(ServerError::Accept)?;
        let id = self.connection_count.fetch_add(1, Ordering::Relaxed);

        if let Err(e) = stream.set_nodelay(true) {
            debug!("Could not set TCP_NODELAY for {}: {}", peer_addr, e);
        }

        Ok(Connection::new(stream, peer_addr, id, Arc::clone(&self.context)))
    }

    /// Accept connections until an accept error occurs
    pub async fn run(&self) -> ServerResult<()> {
        loop {
            let connection = self.accept().await?;
            debug!(
                "Accepted connection {} from {}",
                connection.id(),
                connection.peer_addr()
            );
            tokio::spawn(async move {
                let (id, peer) = (connection.id(), connection.peer_addr());
                if let Err(e) = connection.serve().await {
                    warn!("Connection {} from {} failed: {}", id, peer, e);
                }
            });
        }
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Connections already handed off keep running to completion.
    pub async fn run_until<F>(&self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.run() => result,
            _ = shutdown => {
                info!("Stopped accepting on {}", self.address);
                Ok(())
            }
        }
    }

    /// Create a properly configured socket
    fn create_socket(addr: &SocketAddr, backlog: u32) -> io::Result<Socket> {
        let domain = if addr.is_ipv6() {
            Domain::IPV6
        } else {
            Domain::IPV4
        };

        let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

        // Tokio requires the listener to be non-blocking
        socket.set_nonblocking(true)?;
        socket.set_reuse_address(true)?;

        socket.bind(&(*addr).into())?;
        socket.listen(backlog as i32)?;

        Ok(socket)
    }
}
