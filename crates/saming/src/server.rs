//! Server builder and accept loop.

use std::sync::Arc;

use saming_game::GameConfig;
use saming_room::RoomRegistry;
use tokio::net::TcpListener;

use crate::handler::handle_connection;
use crate::ServerError;

/// Shared state handed to every connection handler.
pub(crate) struct ServerState {
    pub(crate) registry: RoomRegistry,
}

/// Builder for a [`SamingServer`].
///
/// ```rust,no_run
/// use saming::SamingServer;
///
/// # async fn run() -> Result<(), saming::ServerError> {
/// let server = SamingServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct SamingServerBuilder {
    bind_addr: String,
    config: GameConfig,
}

impl SamingServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            config: GameConfig::default(),
        }
    }

    /// Sets the listen address.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Overrides the per-room game configuration.
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<SamingServer, ServerError> {
        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .map_err(ServerError::Bind)?;
        tracing::info!(addr = %self.bind_addr, "listening");

        Ok(SamingServer {
            listener,
            state: Arc::new(ServerState {
                registry: RoomRegistry::new(self.config),
            }),
        })
    }
}

impl Default for SamingServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running saming game server.
pub struct SamingServer {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl SamingServer {
    /// Creates a new builder.
    pub fn builder() -> SamingServerBuilder {
        SamingServerBuilder::new()
    }

    /// The bound local address.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), ServerError> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    tracing::debug!(%addr, "connection accepted");
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, state).await {
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
