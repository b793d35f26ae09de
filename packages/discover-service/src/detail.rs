use discover_domain::{RawSearchResult, Resolution, StudyDetail, resolve, study};

use crate::{DiscoverService, Result};

impl DiscoverService {
	pub async fn fetch_record(&self, uuid: &str) -> Result<RawSearchResult> {
		let fetch = self.catalog.fetch_result_by_uuid(&self.cfg.catalog, uuid);
		let record = self.race("fetch_result_by_uuid", fetch).await?;

		Ok(RawSearchResult::new(record))
	}

	pub async fn study_detail(&self, hit: &RawSearchResult) -> Result<StudyDetail> {
		let record = match resolve::plan(hit) {
			Resolution::Ready(record) => record,
			Resolution::NeedsFetch { uuid, matched_variable } => {
				tracing::debug!(uuid = %uuid, "Record is a stub. Fetching full record.");

				let mut fetched = self.fetch_record(&uuid).await?;

				if let Some(variable) = matched_variable {
					resolve::attach_matched_variable(&mut fetched, variable);
				}

				let settled = resolve::settle(fetched);

				if resolve::is_under_populated(&settled) {
					tracing::debug!(
						uuid = %uuid,
						"Fetched record is still a stub. Displaying as-is."
					);
				}

				settled
			},
		};

		Ok(study::extract(&record))
	}
}
