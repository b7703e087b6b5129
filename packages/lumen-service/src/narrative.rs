use std::time::Duration;

use ::time::OffsetDateTime;
use tokio::time;

use lumen_domain::{
	insight::{DailyInsight, InsightStatus, Narrative},
	narrative::{self, NarrativeContext, PreviewLimits},
};

use crate::{Error, LumenService, Result};

impl LumenService {
	pub fn preview_limits(&self) -> PreviewLimits {
		let cfg = &self.cfg.narrative;

		PreviewLimits {
			symptoms: cfg.symptom_preview as usize,
			labs: cfg.lab_preview as usize,
			disease: cfg.disease_preview as usize,
		}
	}

	/// Returns `doc` with an up-to-date narrative when one could be produced. Every failure leaves
	/// the document, and any narrative it already carries, unchanged.
	pub async fn ensure_narrative(&self, doc: DailyInsight, force: bool) -> DailyInsight {
		if !self.cfg.narrative.enabled || doc.status == InsightStatus::NoData {
			return doc;
		}

		match self.refresh_narrative(&doc, force).await {
			Ok(Some(updated)) => updated,
			Ok(None) => doc,
			Err(err) => {
				tracing::warn!(
					user_id = %doc.user_id,
					day = %doc.day,
					error = %err,
					"Narrative generation failed. Keeping the previous narrative."
				);

				doc
			},
		}
	}

	async fn refresh_narrative(
		&self,
		doc: &DailyInsight,
		force: bool,
	) -> Result<Option<DailyInsight>> {
		let context = NarrativeContext::from_insight(doc, self.utc_offset(), self.preview_limits());
		let context_json = context.canonical_json()?;
		let hash = narrative::sha256_hex(context_json.as_bytes());

		if !force && doc.narrative.as_ref().is_some_and(|current| current.hash == hash) {
			tracing::debug!(user_id = %doc.user_id, day = %doc.day, "Narrative is up to date.");

			return Ok(None);
		}

		let cfg = &self.cfg.providers.narrative;
		let messages = narrative::narrative_messages(&context_json, &[]);
		let call = self.providers.narrative.generate(cfg, &messages);
		let reply = time::timeout(Duration::from_millis(cfg.timeout_ms), call).await.map_err(
			|_| Error::Timeout {
				operation: "Narrative generation".to_string(),
				timeout_ms: cfg.timeout_ms,
			},
		)??;
		let Some(text) = reply.as_deref().and_then(narrative::clean_reply) else {
			tracing::info!(user_id = %doc.user_id, day = %doc.day, "Narrative reply was empty.");

			return Ok(None);
		};
		let narrative =
			Narrative { text, hash, model: cfg.model.clone(), updated_at: OffsetDateTime::now_utc() };
		let updated = self
			.store_policy()
			.run("set_narrative", || {
				self.stores.insights.set_narrative(doc.user_id, doc.day, &narrative)
			})
			.await?;

		tracing::info!(user_id = %doc.user_id, day = %doc.day, forced = force, "Narrative updated.");

		Ok(updated)
	}
}
