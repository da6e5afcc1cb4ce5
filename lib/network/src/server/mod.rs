pub mod http;

use anyhow::{Context, Result};
use common::DbConfig;
use driver::Driver;
use execution::Database;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, instrument, warn};
use typed_builder::TypedBuilder;

pub use http::{router, ApiError, QueryRequest};

/// Serves one database over HTTP until Ctrl+C.
#[derive(Debug, TypedBuilder)]
pub struct DbServer {
    server_address: SocketAddr,
    database: Database,
}

impl DbServer {
    pub async fn run(self) -> Result<()> {
        let server = axum::Server::try_bind(&self.server_address)
            .with_context(|| format!("Failed to bind {}", self.server_address))?;
        info!(address = %self.server_address, "Listening for queries on POST /query");

        server
            .serve(router(self.database.clone()).into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.database.disconnect().await?;
        info!("Server stopped");
        Ok(())
    }
}

#[instrument(skip(config), fields(database = %config.database()))]
pub async fn start_server(config: &DbConfig) -> Result<()> {
    let address = config.http_address();
    let server_address: SocketAddr = address
        .parse()
        .with_context(|| format!("Invalid server address '{}'", address))?;
    let driver = Driver::connect(config).await?;

    DbServer::builder()
        .server_address(server_address)
        .database(driver.database().clone())
        .build()
        .run()
        .await
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
