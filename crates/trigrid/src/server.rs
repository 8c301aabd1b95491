//! Server builder and accept loop.

use tokio::sync::mpsc;
use trigrid_transport::{Transport, WebSocketTransport};

use crate::TrigridError;
use crate::handler::handle_connection;
use crate::lobby::{LobbyCommand, spawn_lobby};

/// Default capacity of the lobby mailbox. Connection tasks briefly wait
/// when it fills, which is the only backpressure in the system.
const DEFAULT_MAILBOX_CAPACITY: usize = 64;

/// Builder for configuring and starting a Trigrid server.
///
/// # Example
///
/// ```rust,ignore
/// let server = ServerBuilder::new()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct ServerBuilder {
    bind_addr: String,
    mailbox_capacity: usize,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the lobby mailbox capacity.
    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    /// Binds the transport and spawns the lobby actor.
    pub async fn build(self) -> Result<Server, TrigridError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let lobby = spawn_lobby(self.mailbox_capacity);
        Ok(Server { transport, lobby })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Trigrid server. Call [`run()`](Self::run) to start
/// accepting connections.
pub struct Server {
    transport: WebSocketTransport,
    lobby: mpsc::Sender<LobbyCommand>,
}

impl Server {
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop: one reader/writer task pair per connection,
    /// all feeding the single lobby actor. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), TrigridError> {
        tracing::info!("Trigrid server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let lobby = self.lobby.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, lobby).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
