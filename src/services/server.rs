//! HTTP server.
//!
//! Wires the directories into the services, serves the API routes with
//! axum and shuts down gracefully when the handle is cancelled.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::services::api::api_routes;
use crate::services::directory::{PullRequestStore, TeamDirectory, UserDirectory};
use crate::services::{AssignmentEngine, StatsService, TeamService, UserService};

/// Shared state for the axum routes.
#[derive(Clone)]
pub struct AppState {
    pub engine: AssignmentEngine,
    pub teams: TeamService,
    pub users: UserService,
    pub stats: StatsService,
}

impl AppState {
    /// Build every service over the same three directories.
    pub fn new(
        users: Arc<dyn UserDirectory>,
        teams: Arc<dyn TeamDirectory>,
        prs: Arc<dyn PullRequestStore>,
    ) -> Self {
        Self {
            engine: AssignmentEngine::new(users.clone(), teams.clone(), prs.clone()),
            teams: TeamService::new(users.clone(), teams),
            users: UserService::new(users, prs.clone()),
            stats: StatsService::new(prs),
        }
    }
}

/// Build the full router with request tracing.
pub fn build_router(state: AppState) -> Router {
    api_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Handle to a running server.
pub struct ServerHandle {
    cancel_token: CancellationToken,
    local_addr: SocketAddr,
    task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn shutdown(self) {
        log::info!("[server] Stopping server on {}", self.local_addr);
        self.cancel_token.cancel();
        if let Err(e) = self.task.await {
            log::error!("[server] Server task failed: {}", e);
        }
    }
}

/// Bind `addr` and serve `state` in a background task.
///
/// Binding to port 0 picks a free port; see [`ServerHandle::local_addr`].
pub async fn start_server(addr: SocketAddr, state: AppState) -> std::io::Result<ServerHandle> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    let cancel_token = CancellationToken::new();
    let cancel_clone = cancel_token.clone();
    let app = build_router(state);

    log::info!("[server] Listening on http://{}", local_addr);

    let task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            cancel_clone.cancelled().await;
        });

        if let Err(e) = server.await {
            log::error!("[server] Server error: {}", e);
        }

        log::info!("[server] Server stopped");
    });

    Ok(ServerHandle {
        cancel_token,
        local_addr,
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::{
        InMemoryPullRequestStore, InMemoryTeamDirectory, InMemoryUserDirectory,
    };
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_server_serves_health_and_shuts_down() {
        let state = AppState::new(
            Arc::new(InMemoryUserDirectory::new()),
            Arc::new(InMemoryTeamDirectory::new()),
            Arc::new(InMemoryPullRequestStore::new()),
        );
        let handle = start_server(SocketAddr::from(([127, 0, 0, 1], 0)), state)
            .await
            .unwrap();

        let mut stream = tokio::net::TcpStream::connect(handle.local_addr())
            .await
            .unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with("OK"));

        handle.shutdown().await;
    }
}
