use std::{
	collections::BTreeMap,
	sync::{Arc, Mutex, MutexGuard},
	time::Duration,
};

use serde::Serialize;

use discover_domain::{FilterDescriptor, RawSearchResult, StudyDetail};

use crate::{DiagnosticsSink, DiscoverService, Error, Result, TracingSink, Transition};

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchState {
	pub filters: Vec<FilterDescriptor>,
	pub filters_loaded: bool,
	pub query: String,
	pub selected_filters: BTreeMap<String, Vec<String>>,
	pub page: u32,
	pub page_size: u32,
	#[serde(skip)]
	pub results: Vec<RawSearchResult>,
	pub num_hits: u64,
	pub selected: Option<usize>,
	pub display: Option<StudyDetail>,
	pub offline: bool,
}
impl SearchState {
	pub fn total_pages(&self) -> u64 {
		if self.page_size == 0 {
			return 0;
		}

		self.num_hits.div_ceil(u64::from(self.page_size))
	}
}

#[derive(Debug, Default)]
struct Generations {
	query: u64,
	search: u64,
	selection: u64,
}

#[derive(Debug, Default)]
struct Inner {
	state: SearchState,
	generations: Generations,
}

pub struct SearchOrchestrator {
	service: Arc<DiscoverService>,
	diagnostics: Arc<dyn DiagnosticsSink>,
	inner: Mutex<Inner>,
}
impl SearchOrchestrator {
	pub fn new(service: Arc<DiscoverService>) -> Self {
		Self::with_diagnostics(service, Arc::new(TracingSink))
	}

	pub fn with_diagnostics(
		service: Arc<DiscoverService>,
		diagnostics: Arc<dyn DiagnosticsSink>,
	) -> Self {
		let page_size = service.cfg.search.page_size;
		let inner = Inner {
			state: SearchState { page: 1, page_size, ..Default::default() },
			generations: Generations::default(),
		};

		Self { service, diagnostics, inner: Mutex::new(inner) }
	}

	pub async fn initialize(&self) -> Result<()> {
		if self.lock().state.filters_loaded {
			return Ok(());
		}

		let filters = match self.service.load_filters().await {
			Ok(filters) => filters,
			Err(err) => return Err(self.fail(err)),
		};
		let count = {
			let mut inner = self.lock();

			if inner.state.filters_loaded {
				return Ok(());
			}

			inner.state.filters = filters;
			inner.state.filters_loaded = true;

			inner.state.filters.len()
		};

		self.emit(Transition::FiltersLoaded { count });

		Ok(())
	}

	pub async fn set_query(&self, query: impl Into<String>) -> Result<bool> {
		let query = query.into();
		let generation = {
			let mut inner = self.lock();

			inner.generations.query += 1;
			inner.state.query = query.clone();
			inner.state.page = 1;

			inner.generations.query
		};

		self.emit(Transition::QueryChanged { query, generation });

		let debounce_ms = self.service.cfg.search.debounce_ms;

		if debounce_ms > 0 {
			tokio::time::sleep(Duration::from_millis(debounce_ms)).await;
		}
		if self.lock().generations.query != generation {
			self.emit(Transition::QuerySuperseded { generation });

			return Ok(false);
		}

		self.search().await?;

		Ok(true)
	}

	pub async fn set_filter(&self, id: &str, values: Vec<String>) -> Result<()> {
		let active = {
			let mut inner = self.lock();

			if inner.state.filters_loaded
				&& !inner.state.filters.iter().any(|filter| filter.id == id)
			{
				return Err(Error::InvalidRequest { message: format!("Unknown filter {id}.") });
			}

			if values.is_empty() {
				inner.state.selected_filters.remove(id);
			} else {
				inner.state.selected_filters.insert(id.to_string(), values);
			}

			inner.state.page = 1;

			inner.state.selected_filters.len()
		};

		self.emit(Transition::FiltersChanged { active });

		self.search().await
	}

	pub fn stage(
		&self,
		query: impl Into<String>,
		filters: BTreeMap<String, Vec<String>>,
		page: u32,
	) -> Result<()> {
		if page == 0 {
			return Err(Error::InvalidRequest { message: "page must be 1 or greater.".to_string() });
		}

		let mut inner = self.lock();

		if inner.state.filters_loaded
			&& let Some(id) = filters
				.keys()
				.find(|id| !inner.state.filters.iter().any(|filter| &filter.id == *id))
		{
			return Err(Error::InvalidRequest { message: format!("Unknown filter {id}.") });
		}

		inner.generations.query += 1;
		inner.state.query = query.into();
		inner.state.selected_filters =
			filters.into_iter().filter(|(_, values)| !values.is_empty()).collect();
		inner.state.page = page;

		Ok(())
	}

	pub async fn clear_filters(&self) -> Result<()> {
		{
			let mut inner = self.lock();

			inner.state.selected_filters.clear();
			inner.state.page = 1;
		}

		self.emit(Transition::FiltersChanged { active: 0 });

		self.search().await
	}

	pub async fn set_page(&self, page: u32) -> Result<()> {
		{
			let mut inner = self.lock();
			let total_pages = inner.state.total_pages();

			if page == 0 || (total_pages > 0 && u64::from(page) > total_pages) {
				return Err(Error::InvalidRequest {
					message: format!("page must be between 1 and {}.", total_pages.max(1)),
				});
			}

			inner.state.page = page;
		}

		self.search().await
	}

	pub async fn search(&self) -> Result<()> {
		if self.is_offline() {
			return Err(Error::Offline);
		}
		if !self.lock().state.filters_loaded {
			self.initialize().await?;
		}

		let (query, filters, page, page_size, generation) = {
			let mut inner = self.lock();

			if inner.state.offline {
				return Err(Error::Offline);
			}

			inner.generations.search += 1;

			(
				inner.state.query.clone(),
				inner.state.selected_filters.clone(),
				inner.state.page,
				inner.state.page_size,
				inner.generations.search,
			)
		};

		self.emit(Transition::SearchStarted { page });

		let results = match self.service.search(&query, &filters, page, page_size).await {
			Ok(results) => results,
			Err(err) => {
				let superseded = self.lock().generations.search != generation;

				if superseded && err.is_remote() {
					tracing::debug!(error = %err, "Superseded search failed. Ignoring.");
					self.emit(Transition::StaleSearchDiscarded);

					return Ok(());
				}

				return Err(self.fail(err));
			},
		};
		let returned = results.results.len();
		{
			let mut inner = self.lock();

			if inner.generations.search != generation {
				drop(inner);
				self.emit(Transition::StaleSearchDiscarded);

				return Ok(());
			}

			inner.state.results = results.results;
			inner.state.num_hits = results.num_hits;
			inner.state.selected = None;
			inner.state.display = None;
			inner.generations.selection += 1;
		}

		self.emit(Transition::SearchCompleted { num_hits: results.num_hits, returned });

		if returned == 0 {
			self.emit(Transition::SelectionCleared);

			return Ok(());
		}

		self.select(0).await.map(|_| ())
	}

	pub async fn select(&self, index: usize) -> Result<bool> {
		let (hit, generation) = {
			let mut inner = self.lock();
			let Some(hit) = inner.state.results.get(index).cloned() else {
				return Err(Error::InvalidRequest {
					message: format!("No result at index {index}."),
				});
			};

			inner.generations.selection += 1;
			inner.state.selected = Some(index);
			inner.state.display = None;

			(hit, inner.generations.selection)
		};

		self.emit(Transition::SelectionChanged { index, generation });

		let detail = self.service.study_detail(&hit).await;
		let mut inner = self.lock();
		let current = inner.generations.selection;

		if current != generation {
			drop(inner);
			self.emit(Transition::StaleDisplayDiscarded { generation, current });

			return match detail {
				Ok(_) => Ok(false),
				Err(err) if err.is_remote() => Ok(false),
				Err(err) => Err(err),
			};
		}

		match detail {
			Ok(detail) => {
				inner.state.display = Some(detail);
				drop(inner);
				self.emit(Transition::DisplayApplied { generation });

				Ok(true)
			},
			Err(err) => {
				drop(inner);

				Err(self.fail(err))
			},
		}
	}

	pub async fn retry(&self) -> Result<()> {
		let filters_loaded = {
			let mut inner = self.lock();

			inner.state.offline = false;

			inner.state.filters_loaded
		};

		self.emit(Transition::Retrying);

		if !filters_loaded {
			self.initialize().await?;
		}

		self.search().await
	}

	pub fn snapshot(&self) -> SearchState {
		self.lock().state.clone()
	}

	pub fn filters(&self) -> Vec<FilterDescriptor> {
		self.lock().state.filters.clone()
	}

	pub fn results(&self) -> Vec<RawSearchResult> {
		self.lock().state.results.clone()
	}

	pub fn num_hits(&self) -> u64 {
		self.lock().state.num_hits
	}

	pub fn page(&self) -> u32 {
		self.lock().state.page
	}

	pub fn total_pages(&self) -> u64 {
		self.lock().state.total_pages()
	}

	pub fn selected(&self) -> Option<usize> {
		self.lock().state.selected
	}

	pub fn display(&self) -> Option<StudyDetail> {
		self.lock().state.display.clone()
	}

	pub fn is_offline(&self) -> bool {
		self.lock().state.offline
	}

	fn fail(&self, err: Error) -> Error {
		if err.is_remote() {
			self.lock().state.offline = true;

			tracing::warn!(error = %err, "Catalog unreachable. Search is offline.");

			self.emit(Transition::WentOffline { reason: err.to_string() });
		}

		err
	}

	fn emit(&self, transition: Transition) {
		self.diagnostics.record(&transition);
	}

	fn lock(&self) -> MutexGuard<'_, Inner> {
		self.inner.lock().unwrap_or_else(|err| err.into_inner())
	}
}
