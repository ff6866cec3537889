//! Metrics server module
//!
//! This module provides an HTTP server to expose Prometheus metrics for scraping.

use actix_web::middleware::{Compress, DefaultHeaders, NormalizePath};
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use std::sync::Arc;
use tracing::{error, info};

use crate::{
	repositories::AccountRepositoryTrait,
	services::{balance::BalanceSource, indexer::WalletIndexerService},
	utils::metrics::{gather_metrics, set_watched_accounts},
};

/// Indexer handle shared with the request handlers
pub type IndexerData<R, B> = web::Data<Arc<WalletIndexerService<R, B>>>;

/// Metrics endpoint handler
async fn metrics_handler<R, B>(indexer: IndexerData<R, B>) -> impl Responder
where
	R: AccountRepositoryTrait + 'static,
	B: BalanceSource + 'static,
{
	// Account count is read from the store so the gauge survives lagged events
	match indexer.get_all_accounts().await {
		Ok(accounts) => set_watched_accounts(accounts.len()),
		Err(e) => error!("Error reading watched accounts: {}", e),
	}

	match gather_metrics() {
		Ok(buffer) => HttpResponse::Ok()
			.content_type("text/plain; version=0.0.4; charset=utf-8")
			.body(buffer),
		Err(e) => {
			error!("Error gathering metrics: {}", e);
			HttpResponse::InternalServerError().finish()
		}
	}
}

/// Resolves the address to bind, listening on all interfaces inside a container.
fn resolve_bind_address(bind_address: &str) -> String {
	if std::env::var("IN_DOCKER").unwrap_or_default() == "true" {
		match bind_address.rsplit_once(':') {
			Some((_, port)) => format!("0.0.0.0:{}", port),
			None => "0.0.0.0:8081".to_string(),
		}
	} else {
		bind_address.to_string()
	}
}

// Create metrics server
pub fn create_metrics_server<R, B>(
	bind_address: String,
	indexer: Arc<WalletIndexerService<R, B>>,
) -> std::io::Result<actix_web::dev::Server>
where
	R: AccountRepositoryTrait + 'static,
	B: BalanceSource + 'static,
{
	let actual_bind_address = resolve_bind_address(&bind_address);

	info!(
		"Starting metrics server on {} (actual bind: {})",
		bind_address, actual_bind_address
	);

	Ok(HttpServer::new(move || {
		App::new()
			.wrap(Compress::default())
			.wrap(NormalizePath::trim())
			.wrap(DefaultHeaders::new())
			.app_data(web::Data::new(indexer.clone()))
			.route("/metrics", web::get().to(metrics_handler::<R, B>))
	})
	.workers(2)
	.bind(actual_bind_address)?
	.shutdown_timeout(5)
	.run())
}
