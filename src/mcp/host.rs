//! Process lifecycle: registration, serving and interrupt-driven shutdown

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::transport::sse_server::SseServer;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpService,
};
use rmcp::{transport::stdio, ServiceExt};
use tracing::{error, info, warn};

use super::server::{ExchangeRateService, SERVER_NAME};
use crate::config::{ServerConfig, TransportKind};
use crate::types::ServiceError;
use crate::upstream::FrankfurterClient;

/// Where the host is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Idle,
    Registering,
    Running,
    ShuttingDown,
    Stopped,
}

/// Owns the configuration and drives the server from startup to exit
#[derive(Debug)]
pub struct ServiceHost {
    config: ServerConfig,
    state: HostState,
}

impl ServiceHost {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            state: HostState::Idle,
        }
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    fn transition(&mut self, next: HostState) {
        info!(from = ?self.state, to = ?next, "host state change");
        self.state = next;
    }

    /// Build the service and register its tools
    pub fn register(
        &mut self,
        client: FrankfurterClient,
    ) -> Result<ExchangeRateService, ServiceError> {
        self.register_routers(client, ExchangeRateService::routers())
    }

    /// Build the service from `routers`.
    ///
    /// A duplicate tool stops the host for good.
    pub(crate) fn register_routers(
        &mut self,
        client: FrankfurterClient,
        routers: Vec<ToolRouter<ExchangeRateService>>,
    ) -> Result<ExchangeRateService, ServiceError> {
        self.transition(HostState::Registering);
        ExchangeRateService::with_routers(client, routers).inspect_err(|e| {
            error!(error = %e, "tool registration failed");
            self.transition(HostState::Stopped);
        })
    }

    /// Serve `service` on the configured transport until the client goes
    /// away or `shutdown` resolves.
    ///
    /// In-flight requests are abandoned on shutdown.
    pub async fn serve<F>(
        &mut self,
        service: ExchangeRateService,
        shutdown: F,
    ) -> Result<(), ServiceError>
    where
        F: Future<Output = ()> + Send,
    {
        match self.config.transport {
            TransportKind::Stdio => self.serve_stdio(service, shutdown).await?,
            TransportKind::StreamableHttp => self.serve_http(service, shutdown).await?,
            TransportKind::Sse => self.serve_sse(service, shutdown).await?,
        }
        self.transition(HostState::Stopped);
        Ok(())
    }

    async fn serve_stdio<F>(
        &mut self,
        service: ExchangeRateService,
        shutdown: F,
    ) -> Result<(), ServiceError>
    where
        F: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);
        self.transition(HostState::Running);
        info!("MCP server running on stdio, waiting for a client...");

        // The handshake blocks until a client sends `initialize`
        let running = tokio::select! {
            biased;
            _ = &mut shutdown => {
                self.shut_down();
                return Ok(());
            }
            running = service.serve(stdio()) => running
                .map_err(|e| ServiceError::Startup(format!("stdio transport: {}", e)))?,
        };
        info!("client connected, waiting for requests...");

        tokio::select! {
            biased;
            _ = &mut shutdown => self.shut_down(),
            quit = running.waiting() => match quit {
                Ok(reason) => info!(?reason, "client disconnected"),
                Err(e) => return Err(ServiceError::Transport(e.to_string())),
            },
        }
        Ok(())
    }

    async fn serve_http<F>(
        &mut self,
        service: ExchangeRateService,
        shutdown: F,
    ) -> Result<(), ServiceError>
    where
        F: Future<Output = ()> + Send,
    {
        let mcp = StreamableHttpService::new(
            move || Ok(service.clone()),
            LocalSessionManager::default().into(),
            Default::default(),
        );
        let router = axum::Router::new().nest_service("/mcp", mcp);

        let addr = self.bind_addr().await?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServiceError::Startup(format!("cannot bind {}: {}", addr, e)))?;
        let local = listener.local_addr().unwrap_or(addr);
        self.transition(HostState::Running);
        info!("MCP server listening on http://{}/mcp", local);

        tokio::select! {
            biased;
            _ = shutdown => self.shut_down(),
            result = axum::serve(listener, router).into_future() => {
                result.map_err(|e| ServiceError::Transport(e.to_string()))?;
            }
        }
        Ok(())
    }

    async fn serve_sse<F>(
        &mut self,
        service: ExchangeRateService,
        shutdown: F,
    ) -> Result<(), ServiceError>
    where
        F: Future<Output = ()> + Send,
    {
        let addr = self.bind_addr().await?;
        let server = SseServer::serve(addr)
            .await
            .map_err(|e| ServiceError::Startup(format!("cannot bind {}: {}", addr, e)))?;
        let cancel = server.with_service(move || service.clone());
        self.transition(HostState::Running);
        info!("MCP server listening on http://{}/sse", addr);

        shutdown.await;
        self.shut_down();
        cancel.cancel();
        Ok(())
    }

    /// Resolve the configured host and port; hostnames are looked up
    async fn bind_addr(&self) -> Result<SocketAddr, ServiceError> {
        let (host, port) = (self.config.host.as_str(), self.config.port);
        tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| {
                ServiceError::Startup(format!("cannot resolve {}:{}: {}", host, port, e))
            })?
            .next()
            .ok_or_else(|| ServiceError::Startup(format!("no address for {}:{}", host, port)))
    }

    fn shut_down(&mut self) {
        self.transition(HostState::ShuttingDown);
        info!("Attempting graceful shutdown, please wait...");
    }

    /// Full lifecycle: banner, registration, serving until Ctrl-C
    pub async fn run(mut self) -> Result<(), ServiceError> {
        info!(
            "Initiating startup of {} {}, press CTRL+C to exit...",
            SERVER_NAME,
            env!("CARGO_PKG_VERSION")
        );
        let client = FrankfurterClient::from_config(&self.config);
        let service = self.register(client)?;
        self.serve(service, interrupt()).await
    }
}

/// Resolves on the first operator interrupt
async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C; shutdown only on client disconnect");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::MockTransport;
    use std::sync::Arc;

    fn client() -> FrankfurterClient {
        FrankfurterClient::new(
            "https://api.example.test",
            Arc::new(MockTransport::with_body("{}")),
        )
    }

    #[test]
    fn test_new_host_is_idle() {
        let host = ServiceHost::new(ServerConfig::default());
        assert_eq!(host.state(), HostState::Idle);
        assert_eq!(host.config().transport, TransportKind::Stdio);
    }

    #[test]
    fn test_register_moves_to_registering() {
        let mut host = ServiceHost::new(ServerConfig::default());

        let service = host.register(client()).unwrap();
        assert_eq!(host.state(), HostState::Registering);
        assert_eq!(service.catalog().len(), 3);
    }

    #[test]
    fn test_duplicate_registration_stops_host() {
        let mut host = ServiceHost::new(ServerConfig::default());
        let mut routers = ExchangeRateService::routers();
        routers.extend(ExchangeRateService::routers());

        let err = host.register_routers(client(), routers).unwrap_err();
        assert!(matches!(err, ServiceError::Startup(_)));
        assert!(err.is_fatal());
        assert_eq!(host.state(), HostState::Stopped);
    }

    #[tokio::test]
    async fn test_stdio_shutdown_before_client_connects() {
        let mut host = ServiceHost::new(ServerConfig::default());

        let service = host.register(client()).unwrap();
        host.serve(service, async {}).await.unwrap();
        assert_eq!(host.state(), HostState::Stopped);
    }

    #[tokio::test]
    async fn test_http_shutdown_stops_host() {
        let config = ServerConfig::default()
            .with_transport(TransportKind::StreamableHttp)
            .with_bind("127.0.0.1", 0);
        let mut host = ServiceHost::new(config);

        let service = host.register(client()).unwrap();
        host.serve(service, async {}).await.unwrap();
        assert_eq!(host.state(), HostState::Stopped);
    }

    #[tokio::test]
    async fn test_sse_shutdown_stops_host() {
        let config = ServerConfig::default()
            .with_transport(TransportKind::Sse)
            .with_bind("127.0.0.1", 0);
        let mut host = ServiceHost::new(config);

        let service = host.register(client()).unwrap();
        host.serve(service, async {}).await.unwrap();
        assert_eq!(host.state(), HostState::Stopped);
    }

    #[tokio::test]
    async fn test_bind_addr_resolves_hostname() {
        let host = ServiceHost::new(ServerConfig::default().with_bind("localhost", 8123));

        let addr = host.bind_addr().await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 8123);
    }
}
