use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use lumen_domain::{
	day::{self, DayWindow},
	insight::{self, DailyInsight, INSIGHT_SCHEMA_VERSION, InsightDraft},
};

use crate::{Error, LumenService, Result};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DailyInsightRequest {
	/// Any accepted date form; missing means today.
	pub date: Option<String>,
	/// Skip the staleness check and recompute.
	pub refresh: bool,
	pub include_narrative: bool,
	pub force_narrative: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecomputeRequest {
	pub date: Option<String>,
	pub include_narrative: bool,
	pub force_narrative: bool,
}

impl LumenService {
	pub async fn get_daily_insight(
		&self,
		user_id: Uuid,
		req: DailyInsightRequest,
	) -> Result<DailyInsight> {
		let window = self.resolve_window(req.date.as_deref())?;
		let doc = self.upsert_for_day(user_id, &window, req.refresh).await?;

		if !req.include_narrative {
			return Ok(doc);
		}

		Ok(self.ensure_narrative(doc, req.force_narrative).await)
	}

	/// Always recomputes the numeric insight. The narrative is only touched when requested.
	pub async fn recompute_daily_insight(
		&self,
		user_id: Uuid,
		req: RecomputeRequest,
	) -> Result<DailyInsight> {
		let window = self.resolve_window(req.date.as_deref())?;
		let doc = self.upsert_for_day(user_id, &window, true).await?;

		if !req.include_narrative {
			return Ok(doc);
		}

		Ok(self.ensure_narrative(doc, req.force_narrative).await)
	}

	pub fn resolve_window(&self, date: Option<&str>) -> Result<DayWindow> {
		let insights = &self.cfg.insights;

		Ok(day::resolve_day(
			date,
			self.utc_offset(),
			OffsetDateTime::now_utc(),
			insights.symptom_window_days,
			insights.lab_window_days,
		)?)
	}

	/// Computes the insight for `window` from the current sources without persisting it.
	pub async fn compute_daily_insight(
		&self,
		user_id: Uuid,
		window: &DayWindow,
	) -> Result<DailyInsight> {
		let inputs = self.aggregate_day(user_id, window).await?;
		let inputs_updated_at = inputs.inputs_updated_at();
		let meals = inputs.log.as_ref().map(|log| log.meals.as_slice()).unwrap_or_default();
		let fan_out = self.analyze_foods(meals, &inputs.profile).await;

		Ok(insight::build_insight(InsightDraft {
			user_id,
			window,
			profile: &inputs.profile,
			log: inputs.log,
			symptoms: inputs.symptoms,
			labs: inputs.labs,
			inputs_updated_at,
			unique_foods: fan_out.unique_foods,
			analyses: fan_out.analyses,
			errors: fan_out.errors,
			max_food_snapshots: self.cfg.insights.max_food_snapshots as usize,
			computed_at: OffsetDateTime::now_utc(),
		}))
	}

	async fn upsert_for_day(
		&self,
		user_id: Uuid,
		window: &DayWindow,
		force: bool,
	) -> Result<DailyInsight> {
		let day = window.start();
		let cached = if force { None } else { self.fresh_cached(user_id, window).await? };

		if let Some(cached) = cached {
			tracing::info!(%user_id, %day, cache_hit = true, "Serving cached daily insight.");

			return Ok(cached);
		}

		let doc = self.compute_daily_insight(user_id, window).await?;
		let stored = self
			.store_policy()
			.run("upsert_insight", || self.stores.insights.upsert_insight(&doc))
			.await?;

		tracing::info!(
			%user_id,
			%day,
			cache_hit = false,
			forced = force,
			status = stored.status.as_str(),
			errors = stored.errors.len(),
			"Daily insight recomputed."
		);

		Ok(stored)
	}

	/// The cached document when nothing it was computed from has changed since. Windows recorded
	/// in the document decide what "its sources" are. An unreadable row counts as a miss and is
	/// overwritten by the recompute.
	async fn fresh_cached(
		&self,
		user_id: Uuid,
		window: &DayWindow,
	) -> Result<Option<DailyInsight>> {
		let day = window.start();
		let policy = self.store_policy();
		let lookup =
			policy.run("find_insight", || self.stores.insights.find_insight(user_id, day)).await;
		let cached = match lookup {
			Ok(cached) => cached,
			Err(Error::MalformedRecord { message }) => {
				tracing::warn!(%user_id, %day, error = %message, "Cached insight is unreadable.");

				None
			},
			Err(err) => return Err(err),
		};
		let Some(cached) = cached else {
			return Ok(None);
		};

		if cached.version != INSIGHT_SCHEMA_VERSION {
			tracing::debug!(%user_id, %day, version = cached.version, "Cached insight is outdated.");

			return Ok(None);
		}

		let probe_window =
			window.with_windows(cached.symptoms.window_days, cached.labs.window_days)?;
		let newest = self.newest_source_update(user_id, &probe_window).await?;

		Ok(cached.is_fresh(newest).then_some(cached))
	}
}
