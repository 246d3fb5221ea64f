//! HTTP/1.1 server hosting a built route table.
//!
//! # Example
//!
//! ```rust,ignore
//! use vestibule_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let routes = registry.build()?;
//!     let config = ServerConfig::builder().http_addr("0.0.0.0:8080").build();
//!
//!     Server::new(config, routes).run().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use vestibule_config::ServerSection;

use crate::error::ServerError;
use crate::routes::{error_response, Routes};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Default HTTP bind address.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default request body limit.
pub const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Server settings. Build with [`ServerConfig::builder`] or load from a
/// [`ServerSection`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    http_addr: String,
    shutdown_timeout: Duration,
    keep_alive: bool,
    max_body_bytes: usize,
}

impl ServerConfig {
    /// Starts a builder with default values.
    ///
    /// ```rust
    /// use vestibule_server::ServerConfig;
    /// use std::time::Duration;
    ///
    /// let config = ServerConfig::builder()
    ///     .http_addr("127.0.0.1:3000")
    ///     .shutdown_timeout(Duration::from_secs(5))
    ///     .build();
    ///
    /// assert_eq!(config.http_addr(), "127.0.0.1:3000");
    /// assert!(config.keep_alive());
    /// ```
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Settings from the `[server]` section of a configuration file.
    #[must_use]
    pub fn from_section(section: &ServerSection) -> Self {
        Self::builder()
            .http_addr(section.http_addr.clone())
            .shutdown_timeout(Duration::from_secs(section.shutdown_timeout_secs))
            .keep_alive(section.keep_alive)
            .max_body_bytes(section.max_body_bytes)
            .build()
    }

    /// Bind address.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.http_addr
    }

    /// Parses the bind address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.http_addr.parse()
    }

    /// How long shutdown waits for open connections.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Whether connections are kept alive between requests.
    #[must_use]
    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// Largest accepted request body in bytes.
    #[must_use]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    http_addr: String,
    shutdown_timeout: Duration,
    keep_alive: bool,
    max_body_bytes: usize,
}

impl ServerConfigBuilder {
    /// Creates a builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            keep_alive: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Sets the bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.http_addr = addr.into();
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Enables or disables HTTP/1.1 keep-alive.
    #[must_use]
    pub fn keep_alive(mut self, enabled: bool) -> Self {
        self.keep_alive = enabled;
        self
    }

    /// Sets the request body limit. Larger bodies get 413.
    #[must_use]
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            http_addr: self.http_addr,
            shutdown_timeout: self.shutdown_timeout,
            keep_alive: self.keep_alive,
            max_body_bytes: self.max_body_bytes,
        }
    }
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Serves [`Routes`] over HTTP/1.1.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    routes: Arc<Routes>,
}

impl Server {
    /// Creates a server for a built route table.
    #[must_use]
    pub fn new(config: ServerConfig, routes: Routes) -> Self {
        Self {
            config,
            routes: Arc::new(routes),
        }
    }

    /// Server settings.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Served route table.
    #[must_use]
    pub fn routes(&self) -> &Arc<Routes> {
        &self.routes
    }

    /// Runs until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Runs until `shutdown` is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|e| ServerError::Bind(format!("invalid address '{}': {e}", self.config.http_addr())))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("failed to bind to {addr}: {e}")))?;

        self.serve(listener, shutdown).await
    }

    /// Accepts connections from `listener` until `shutdown` is triggered,
    /// then waits up to the shutdown timeout for open connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener address cannot be read.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "server listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            let token = tracker.acquire();
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, remote_addr, shutdown).await {
                                    tracing::debug!(remote = %remote_addr, error = %e, "connection error");
                                }
                                drop(token);
                            });
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to accept connection");
                        }
                    }
                }

                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, stopping server");
                    break;
                }
            }
        }

        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            timeout = ?shutdown_timeout,
            connections = tracker.active_connections(),
            "waiting for connections to close"
        );

        tokio::select! {
            () = tracker.wait_for_shutdown() => {
                tracing::info!("all connections closed");
            }
            () = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!(
                    connections = tracker.active_connections(),
                    "shutdown timeout reached"
                );
            }
        }

        tracing::info!("server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: &Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(self);

        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_request(req, remote_addr).await) }
        });

        let conn = http1::Builder::new()
            .keep_alive(self.config.keep_alive())
            .serve_connection(io, service);
        tokio::pin!(conn);

        let mut draining = false;
        loop {
            tokio::select! {
                result = conn.as_mut() => return result,
                () = shutdown.recv(), if !draining => {
                    // finish the in-flight request, then close
                    tracing::debug!(remote = %remote_addr, "draining connection");
                    conn.as_mut().graceful_shutdown();
                    draining = true;
                }
            }
        }
    }

    async fn handle_request(&self, req: Request<Incoming>, remote_addr: SocketAddr) -> Response<Full<Bytes>> {
        let (parts, body) = req.into_parts();

        let body = match Limited::new(body, self.config.max_body_bytes()).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.is::<LengthLimitError>() => {
                tracing::warn!(path = %parts.uri.path(), limit = self.config.max_body_bytes(), "request body too large");
                return error_response(StatusCode::PAYLOAD_TOO_LARGE, "request body too large");
            }
            Err(e) => {
                tracing::warn!(path = %parts.uri.path(), error = %e, "failed to read request body");
                return error_response(StatusCode::BAD_REQUEST, "failed to read request body");
            }
        };

        self.routes
            .handle(Request::from_parts(parts, body), Some(remote_addr))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use vestibule_core::{DispatchResult, RequestContext};
    use vestibule_macros::{Masked, Params};
    use vestibule_middleware::BoxFuture;

    use crate::controller::{Controller, Input, Output};
    use crate::endpoint::Endpoint;
    use crate::registry::Vestibule;

    #[derive(Default, Serialize, Deserialize, Params, Masked)]
    struct Item {
        id: serde_json::Value,
    }

    #[derive(Default)]
    struct Echo {
        input: Item,
    }

    impl Controller for Echo {
        fn handle<'a>(&'a mut self, _ctx: &'a mut RequestContext) -> BoxFuture<'a, DispatchResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn input(&mut self) -> Option<&mut dyn Input> {
            Some(&mut self.input)
        }

        fn result(&self) -> Option<&dyn Output> {
            Some(&self.input)
        }
    }

    async fn start(config: ServerConfig) -> (SocketAddr, ShutdownSignal, tokio::task::JoinHandle<Result<(), ServerError>>) {
        let mut vestibule = Vestibule::default();
        vestibule.add(Endpoint::post("/echo", Echo::default));
        let server = Server::new(config, vestibule.build().unwrap());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = ShutdownSignal::new();
        let handle = tokio::spawn(server.serve(listener, shutdown.clone()));
        (addr, shutdown, handle)
    }

    async fn send(addr: SocketAddr, raw: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();
        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    fn post(body: &str) -> String {
        format!(
            "POST /echo HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        )
    }

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr(), DEFAULT_HTTP_ADDR);
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_body_bytes(), DEFAULT_MAX_BODY_BYTES);
        assert!(config.keep_alive());
    }

    #[test]
    fn test_config_from_section() {
        let section = ServerSection {
            http_addr: "127.0.0.1:9000".to_string(),
            shutdown_timeout_secs: 5,
            max_body_bytes: 1024,
            keep_alive: false,
        };
        let config = ServerConfig::from_section(&section);
        assert_eq!(config.socket_addr().unwrap().port(), 9000);
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_body_bytes(), 1024);
        assert!(!config.keep_alive());
    }

    #[tokio::test]
    async fn test_invalid_address() {
        let config = ServerConfig::builder().http_addr("not an address").build();
        let server = Server::new(config, Vestibule::default().build().unwrap());
        let err = server.run_with_shutdown(ShutdownSignal::new()).await.unwrap_err();
        assert!(matches!(err, ServerError::Bind(_)));
    }

    #[tokio::test]
    async fn test_serves_and_shuts_down() {
        let (addr, shutdown, handle) = start(ServerConfig::default()).await;

        let response = send(addr, &post(r#"{"id":7}"#)).await;
        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
        assert!(response.ends_with(r#"{"id":7}"#), "{response}");

        let response = send(addr, "GET /missing HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 404"), "{response}");

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_oversized_body() {
        let config = ServerConfig::builder().max_body_bytes(8).build();
        let (addr, shutdown, _handle) = start(config).await;

        let response = send(addr, &post(r#"{"id":"0123456789"}"#)).await;
        assert!(response.starts_with("HTTP/1.1 413"), "{response}");
        assert!(response.ends_with(r#"{"message":"request body too large"}"#), "{response}");

        shutdown.trigger();
    }
}
