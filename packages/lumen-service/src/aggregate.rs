//! Concurrent store reads for one user-day, each bounded by a timeout and a few retries.

use std::time::Duration;

use ::time::OffsetDateTime;
use tokio::time;
use uuid::Uuid;

use lumen_config::Insights;
use lumen_domain::{
	day::DayWindow,
	insight,
	records::{LabReport, NutritionLog, SymptomLog, UserProfile},
};

use crate::{BoxFuture, Error, LumenService, Result};

const INITIAL_BACKOFF: Duration = Duration::from_millis(50);
const MAX_BACKOFF: Duration = Duration::from_millis(800);

/// Timeout and attempt limit applied to every store call.
#[derive(Clone, Copy, Debug)]
pub struct StorePolicy {
	pub timeout: Duration,
	pub attempts: u32,
}
impl StorePolicy {
	pub fn from_config(cfg: &Insights) -> Self {
		Self {
			timeout: Duration::from_millis(cfg.store_timeout_ms),
			attempts: cfg.store_read_attempts.max(1),
		}
	}

	/// Runs `call` until it succeeds, fails with a non-retryable error, or the attempts run out.
	pub async fn run<'a, T, F>(&self, operation: &'static str, mut call: F) -> Result<T>
	where
		F: FnMut() -> BoxFuture<'a, Result<T>>,
	{
		let mut backoff = INITIAL_BACKOFF;
		let mut attempt = 1;

		loop {
			let outcome = match time::timeout(self.timeout, call()).await {
				Ok(result) => result,
				Err(_) => Err(Error::Timeout {
					operation: operation.to_string(),
					timeout_ms: self.timeout.as_millis() as u64,
				}),
			};

			match outcome {
				Ok(value) => return Ok(value),
				Err(err) if err.is_retryable() && attempt < self.attempts => {
					tracing::warn!(operation, attempt, error = %err, "Store call failed. Retrying.");

					time::sleep(backoff).await;

					backoff = backoff.saturating_mul(2).min(MAX_BACKOFF);
					attempt += 1;
				},
				Err(err) => return Err(err),
			}
		}
	}
}

/// Everything read from the stores for one user-day.
#[derive(Clone, Debug)]
pub struct DayInputs {
	pub profile: UserProfile,
	pub log: Option<NutritionLog>,
	pub symptoms: Vec<SymptomLog>,
	pub labs: Vec<LabReport>,
	/// Freshest `updated_at` across the whole symptom window, not only the capped snapshot.
	pub symptoms_updated_at: Option<OffsetDateTime>,
	pub labs_updated_at: Option<OffsetDateTime>,
}
impl DayInputs {
	pub fn inputs_updated_at(&self) -> Option<OffsetDateTime> {
		insight::latest([
			self.log.as_ref().map(|log| log.updated_at),
			self.symptoms_updated_at,
			self.labs_updated_at,
			self.symptoms.iter().map(|symptom| symptom.updated_at).max(),
			self.labs.iter().map(|lab| lab.updated_at).max(),
		])
	}
}

impl LumenService {
	pub(crate) fn store_policy(&self) -> StorePolicy {
		StorePolicy::from_config(&self.cfg.insights)
	}

	/// Reads profile, log, symptoms, labs, and the window freshness probes concurrently. A missing
	/// profile is fatal; empty symptom and lab windows are not.
	pub async fn aggregate_day(&self, user_id: Uuid, window: &DayWindow) -> Result<DayInputs> {
		let policy = self.store_policy();
		let stores = &self.stores;
		let limits = &self.cfg.insights;
		let (profile, log, symptoms, labs, symptoms_updated_at, labs_updated_at) = tokio::try_join!(
			policy.run("get_profile", || stores.profiles.get_profile(user_id)),
			policy.run("find_log", || stores.nutrition.find_log(user_id, window.day)),
			policy.run("list_symptoms", || {
				stores.symptoms.list_symptoms(user_id, window.symptoms, limits.symptom_limit)
			}),
			policy.run("list_labs", || stores.labs.list_labs(user_id, window.labs, limits.lab_limit)),
			policy.run("latest_symptom_update", || {
				stores.symptoms.latest_symptom_update(user_id, window.symptoms)
			}),
			policy.run("latest_lab_update", || stores.labs.latest_lab_update(user_id, window.labs)),
		)?;
		let profile = profile.ok_or(Error::UserNotFound { user_id })?;

		Ok(DayInputs { profile, log, symptoms, labs, symptoms_updated_at, labs_updated_at })
	}

	/// Freshest `updated_at` across the day's log and the given windows.
	pub(crate) async fn newest_source_update(
		&self,
		user_id: Uuid,
		window: &DayWindow,
	) -> Result<Option<OffsetDateTime>> {
		let policy = self.store_policy();
		let stores = &self.stores;
		let (log, symptoms, labs) = tokio::try_join!(
			policy.run("latest_log_update", || {
				stores.nutrition.latest_log_update(user_id, window.day)
			}),
			policy.run("latest_symptom_update", || {
				stores.symptoms.latest_symptom_update(user_id, window.symptoms)
			}),
			policy.run("latest_lab_update", || stores.labs.latest_lab_update(user_id, window.labs)),
		)?;

		Ok(insight::latest([log, symptoms, labs]))
	}
}
