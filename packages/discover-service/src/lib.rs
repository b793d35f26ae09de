pub mod detail;
pub mod diagnostics;
pub mod filters;
pub mod orchestrator;
pub mod search;

mod error;

pub use diagnostics::{DiagnosticsSink, MemorySink, TracingSink, Transition};
pub use error::{Error, Result};
pub use orchestrator::{SearchOrchestrator, SearchState};
pub use search::SearchResults;

use std::{collections::BTreeMap, future::Future, pin::Pin, sync::Arc, time::Duration};

use serde_json::{Map, Value};

use discover_config::{Catalog, Config};
use discover_providers::{SearchPage, aggregate, lookup, search as remote_search};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait CatalogProvider
where
	Self: Send + Sync,
{
	fn fetch_aggregate_filters<'a>(
		&'a self,
		cfg: &'a Catalog,
	) -> BoxFuture<'a, Result<Map<String, Value>>>;

	fn fetch_search_results<'a>(
		&'a self,
		cfg: &'a Catalog,
		query: &'a str,
		filters: &'a BTreeMap<String, Vec<String>>,
		page: u32,
		page_size: u32,
	) -> BoxFuture<'a, Result<SearchPage>>;

	fn fetch_result_by_uuid<'a>(
		&'a self,
		cfg: &'a Catalog,
		uuid: &'a str,
	) -> BoxFuture<'a, Result<Value>>;
}

pub struct DiscoverService {
	pub cfg: Config,
	pub catalog: Arc<dyn CatalogProvider>,
}
impl DiscoverService {
	pub fn new(cfg: Config) -> Self {
		Self { cfg, catalog: Arc::new(HttpCatalog) }
	}

	pub fn with_catalog(cfg: Config, catalog: Arc<dyn CatalogProvider>) -> Self {
		Self { cfg, catalog }
	}

	pub(crate) async fn race<T, F>(&self, operation: &'static str, call: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		let timeout_ms = self.cfg.catalog.timeout_ms;

		match tokio::time::timeout(Duration::from_millis(timeout_ms), call).await {
			Ok(result) => result,
			Err(_) => {
				tracing::warn!(operation, timeout_ms, "Remote call timed out.");

				Err(Error::RemoteUnavailable {
					message: format!("{operation} timed out after {timeout_ms} ms."),
				})
			},
		}
	}
}

pub struct HttpCatalog;
impl CatalogProvider for HttpCatalog {
	fn fetch_aggregate_filters<'a>(
		&'a self,
		cfg: &'a Catalog,
	) -> BoxFuture<'a, Result<Map<String, Value>>> {
		Box::pin(async move { Ok(aggregate::fetch_aggregate_filters(cfg).await?) })
	}

	fn fetch_search_results<'a>(
		&'a self,
		cfg: &'a Catalog,
		query: &'a str,
		filters: &'a BTreeMap<String, Vec<String>>,
		page: u32,
		page_size: u32,
	) -> BoxFuture<'a, Result<SearchPage>> {
		Box::pin(async move {
			Ok(remote_search::fetch_search_results(cfg, query, filters, page, page_size).await?)
		})
	}

	fn fetch_result_by_uuid<'a>(
		&'a self,
		cfg: &'a Catalog,
		uuid: &'a str,
	) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async move { Ok(lookup::fetch_result_by_uuid(cfg, uuid).await?) })
	}
}
