//! Process wiring: backend selection, listener, and graceful shutdown.

// std
use std::{future::IntoFuture, net::SocketAddr, time::Duration as StdDuration};
// crates.io
use axum::Router;
use tokio::{net::TcpListener, signal, sync::oneshot};
// self
use crate::{
	_prelude::*,
	api::{self, AppState},
	config::{AppConfig, DatabaseConfig, StorageBackend},
	oauth::OAuthExchange,
	service::PetService,
	store::{MemoryStore, PetStore, PostgresStore},
};

/// Opens the configured store, builds the router, and serves until SIGINT/SIGTERM.
pub async fn run(config: AppConfig) -> Result<()> {
	let store = open_store(&config.database).await?;
	let oauth = if config.google_oauth.enabled {
		Some(Arc::new(OAuthExchange::new(&config.google_oauth)?))
	} else {
		tracing::info!("google oauth disabled; /auth/google routes not mounted");

		None
	};
	let app = api::router(
		AppState::new(PetService::new(store), oauth)
			.with_request_timeout(config.server.request_timeout()),
	);
	let addr = config.server.listen_addr()?;
	let listener = TcpListener::bind(addr)
		.await
		.map_err(|e| Error::internal(format!("failed to bind {addr}"), e))?;

	serve(listener, app, shutdown_signal(), config.server.shutdown_grace()).await
}

/// Opens the store selected by `database.backend`.
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn PetStore>> {
	match config.backend {
		StorageBackend::Memory => {
			tracing::info!("using in-memory store");

			Ok(Arc::new(MemoryStore::default()))
		},
		StorageBackend::Postgres => {
			let store = PostgresStore::connect(&config.store_config())
				.await
				.map_err(|e| Error::internal("failed to open postgres store", e))?;

			tracing::info!(max_connections = config.max_connections, "connected to postgres");

			Ok(Arc::new(store))
		},
	}
}

/// Serves `app` on `listener` until `shutdown` resolves, then gives in-flight requests `grace`
/// to finish before returning.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F, grace: StdDuration) -> Result<()>
where
	F: 'static + Send + Future<Output = ()>,
{
	let local_addr: Option<SocketAddr> = listener.local_addr().ok();
	let (stopping_tx, stopping_rx) = oneshot::channel::<()>();
	let signal = async move {
		shutdown.await;

		let _ = stopping_tx.send(());
	};
	let server = axum::serve(listener, app).with_graceful_shutdown(signal).into_future();

	tokio::pin!(server);

	tracing::info!(addr = ?local_addr, "listening");

	tokio::select! {
		result = &mut server => return result.map_err(|e| Error::internal("server failed", e)),
		_ = stopping_rx => {},
	}

	tracing::info!(grace = ?grace, "draining in-flight requests");

	match tokio::time::timeout(grace, server).await {
		Ok(result) => result.map_err(|e| Error::internal("server failed", e)),
		Err(_) => {
			tracing::warn!("shutdown grace period elapsed; abandoning in-flight requests");

			Ok(())
		},
	}
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			tracing::error!(error = %e, "failed to install Ctrl+C handler");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			},
			Err(e) => {
				tracing::error!(error = %e, "failed to install SIGTERM handler");
				std::future::pending::<()>().await;
			},
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
		_ = terminate => tracing::info!("received SIGTERM, shutting down"),
	}
}
