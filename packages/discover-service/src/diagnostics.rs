use std::sync::Mutex;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
	FiltersLoaded { count: usize },
	QueryChanged { query: String, generation: u64 },
	QuerySuperseded { generation: u64 },
	FiltersChanged { active: usize },
	SearchStarted { page: u32 },
	SearchCompleted { num_hits: u64, returned: usize },
	StaleSearchDiscarded,
	SelectionChanged { index: usize, generation: u64 },
	SelectionCleared,
	DisplayApplied { generation: u64 },
	StaleDisplayDiscarded { generation: u64, current: u64 },
	WentOffline { reason: String },
	Retrying,
}

pub trait DiagnosticsSink
where
	Self: Send + Sync,
{
	fn record(&self, transition: &Transition);
}

#[derive(Debug, Default)]
pub struct TracingSink;
impl DiagnosticsSink for TracingSink {
	fn record(&self, transition: &Transition) {
		tracing::debug!(?transition, "Search state transition.");
	}
}

#[derive(Debug, Default)]
pub struct MemorySink {
	transitions: Mutex<Vec<Transition>>,
}
impl MemorySink {
	pub fn transitions(&self) -> Vec<Transition> {
		self.transitions.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl DiagnosticsSink for MemorySink {
	fn record(&self, transition: &Transition) {
		self.transitions.lock().unwrap_or_else(|err| err.into_inner()).push(transition.clone());
	}
}
