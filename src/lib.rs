//! HTTP CRUD service over a single soft-deletable `products` table.

pub mod api;
pub mod config;
pub mod entities;
pub mod middleware;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::{future::Future, sync::Arc};
use tokio::net::TcpListener;

use crate::api::create_api_router;
use crate::config::Config;
use crate::entities::setup_schema;

/// Opens the shared connection pool, bounded by `pool_size`.
pub async fn connect(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options.max_connections(config.pool_size);

    let db = Database::connect(options).await?;
    if config.setup_schema {
        setup_schema(&db).await?;
    }

    Ok(db)
}

/// Serves the API on `listener` until `shutdown` resolves and in-flight requests drain.
///
/// The pool is not closed here; callers own its teardown.
pub async fn serve<F>(listener: TcpListener, db: DatabaseConnection, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_api_router(Arc::new(db));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
