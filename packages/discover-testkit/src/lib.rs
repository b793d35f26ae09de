mod error;

pub mod fixtures;

pub use error::{Error, Result};

use std::{
	collections::HashMap,
	future::IntoFuture,
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use axum::{
	Json, Router,
	extract::{Path, State},
	http::StatusCode,
	response::IntoResponse,
	routing,
};
use serde_json::Value;
use tokio::{
	net::TcpListener,
	sync::{oneshot, oneshot::Sender},
};

pub const SEARCH_PATH: &str = "/discover/search";
pub const AGGREGATE_PATH: &str = "/discover/aggregate";
pub const RESULT_PATH: &str = "/discover/get_by_uuid/{uuid}";

#[derive(Debug, Clone, Default)]
pub struct CatalogData {
	pub aggregations: Value,
	pub search: Value,
	pub records: HashMap<String, Value>,
}

#[derive(Default)]
struct CatalogState {
	data: CatalogData,
	search_requests: Mutex<Vec<Value>>,
	lookups: AtomicUsize,
}

pub struct MockCatalog {
	api_base: String,
	state: Arc<CatalogState>,
	shutdown: Option<Sender<()>>,
}
impl MockCatalog {
	pub async fn start(data: CatalogData) -> Result<Self> {
		let state = Arc::new(CatalogState { data, ..Default::default() });
		let app = Router::new()
			.route(AGGREGATE_PATH, routing::get(aggregate_handler))
			.route(SEARCH_PATH, routing::post(search_handler))
			.route(RESULT_PATH, routing::get(result_handler))
			.with_state(state.clone());
		let listener = TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let (tx, rx) = oneshot::channel();
		let server = axum::serve(listener, app).with_graceful_shutdown(async move {
			let _ = rx.await;
		});

		tokio::spawn(async move {
			let _ = server.into_future().await;
		});

		Ok(Self { api_base: format!("http://{addr}"), state, shutdown: Some(tx) })
	}

	pub fn api_base(&self) -> &str {
		&self.api_base
	}

	pub fn search_requests(&self) -> Vec<Value> {
		self.state.search_requests.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn lookups(&self) -> usize {
		self.state.lookups.load(Ordering::SeqCst)
	}

	pub fn shutdown(mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
	}
}
impl Drop for MockCatalog {
	fn drop(&mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
	}
}

async fn aggregate_handler(State(state): State<Arc<CatalogState>>) -> impl IntoResponse {
	Json(state.data.aggregations.clone())
}

async fn search_handler(
	State(state): State<Arc<CatalogState>>,
	Json(payload): Json<Value>,
) -> impl IntoResponse {
	state.search_requests.lock().unwrap_or_else(|err| err.into_inner()).push(payload);

	Json(state.data.search.clone())
}

async fn result_handler(
	State(state): State<Arc<CatalogState>>,
	Path(uuid): Path<String>,
) -> impl IntoResponse {
	state.lookups.fetch_add(1, Ordering::SeqCst);

	match state.data.records.get(&uuid) {
		Some(record) => (StatusCode::OK, Json(record.clone())).into_response(),
		None => StatusCode::NOT_FOUND.into_response(),
	}
}
