use uuid::Uuid;

use lumen_domain::{
	insight::InsightStatus,
	narrative::{ChatRole, NarrativeContext, SYSTEM_PROMPT},
};
use lumen_service::{DailyInsightRequest, RecomputeRequest};

use super::{DATE, at_hour, harness, profile, seeded, symptom, test_config};

const REPLY: &str = "Steady day overall.\n- Fiber looks fine.";

fn with_narrative() -> DailyInsightRequest {
	DailyInsightRequest {
		date: Some(DATE.to_string()),
		include_narrative: true,
		..Default::default()
	}
}

fn forced() -> DailyInsightRequest {
	DailyInsightRequest { force_narrative: true, ..with_narrative() }
}

#[tokio::test]
async fn disabled_narrative_never_calls_the_generator() {
	let h = harness(test_config(false));
	let user_id = seeded(&h, &["Oats"]);
	let doc = h.service.get_daily_insight(user_id, with_narrative()).await.expect("Read failed.");

	assert!(doc.narrative.is_none());
	assert_eq!(h.narrator.count(), 0);
	assert_eq!(h.store.narrative_writes(), 0);
}

#[tokio::test]
async fn unchanged_context_reuses_the_stored_narrative() {
	let h = harness(test_config(true));
	let user_id = seeded(&h, &["Oats", "Banana"]);
	let first = h.service.get_daily_insight(user_id, with_narrative()).await.expect("Read failed.");
	let second =
		h.service.get_daily_insight(user_id, with_narrative()).await.expect("Read failed.");
	let narrative = first.narrative.clone().expect("Narrative should be generated.");
	let expected_hash =
		NarrativeContext::from_insight(&first, h.service.utc_offset(), h.service.preview_limits())
			.content_hash()
			.expect("Context should encode.");

	assert_eq!(h.narrator.count(), 1);
	assert_eq!(h.store.narrative_writes(), 1);
	assert_eq!(narrative.text, REPLY);
	assert_eq!(narrative.model, "spy-model");
	assert_eq!(narrative.hash, expected_hash);
	assert_eq!(second.narrative, first.narrative);
}

#[tokio::test]
async fn prompt_carries_the_system_rules_and_signals() {
	let h = harness(test_config(true));
	let user_id = seeded(&h, &["Oats"]);
	let doc = h.service.get_daily_insight(user_id, with_narrative()).await.expect("Read failed.");
	let messages = h.narrator.last_messages();
	let context =
		NarrativeContext::from_insight(&doc, h.service.utc_offset(), h.service.preview_limits())
			.canonical_json()
			.expect("Context should encode.");

	assert_eq!(messages.len(), 2);
	assert_eq!(messages[0].role, ChatRole::System);
	assert_eq!(messages[0].content, SYSTEM_PROMPT);
	assert_eq!(messages[1].role, ChatRole::User);
	assert!(messages[1].content.ends_with(&format!("SIGNALS_JSON:\n{context}")));
	assert!(context.contains("\"date\":\"2026-03-10\""));
}

#[tokio::test]
async fn force_regenerates_even_when_unchanged() {
	let h = harness(test_config(true));
	let user_id = seeded(&h, &["Oats"]);

	h.service.get_daily_insight(user_id, with_narrative()).await.expect("Read failed.");
	h.narrator.set_reply(Some("Second take."));

	let doc = h.service.get_daily_insight(user_id, forced()).await.expect("Forced read failed.");

	assert_eq!(h.narrator.count(), 2);
	assert_eq!(doc.narrative.map(|n| n.text), Some("Second take.".to_string()));
}

#[tokio::test]
async fn empty_reply_keeps_the_previous_narrative() {
	let h = harness(test_config(true));
	let user_id = seeded(&h, &["Oats"]);
	let first = h.service.get_daily_insight(user_id, with_narrative()).await.expect("Read failed.");

	h.narrator.set_reply(Some("  \n\t\n"));

	let regenerated =
		h.service.get_daily_insight(user_id, forced()).await.expect("Forced read failed.");

	assert_eq!(h.narrator.count(), 2);
	assert_eq!(h.store.narrative_writes(), 1);
	assert_eq!(regenerated.narrative, first.narrative);

	h.narrator.set_reply(None);

	let missing =
		h.service.get_daily_insight(user_id, forced()).await.expect("Forced read failed.");

	assert_eq!(missing.narrative, first.narrative);
}

#[tokio::test]
async fn generator_failure_keeps_the_numeric_insight() {
	let h = harness(test_config(true));
	let user_id = seeded(&h, &["Oats"]);
	let first = h.service.get_daily_insight(user_id, with_narrative()).await.expect("Read failed.");

	h.narrator.set_failing(true);

	let regenerated = h
		.service
		.get_daily_insight(user_id, forced())
		.await
		.expect("Provider failure must not fail the read.");

	assert_eq!(regenerated.status, InsightStatus::Ok);
	assert_eq!(regenerated.narrative, first.narrative);
	assert_eq!(regenerated.nutrition, first.nutrition);
}

#[tokio::test]
async fn no_data_day_gets_no_narrative() {
	let h = harness(test_config(true));
	let user_id = Uuid::new_v4();

	h.store.put_profile(profile(user_id));

	let doc = h.service.get_daily_insight(user_id, with_narrative()).await.expect("Read failed.");

	assert_eq!(doc.status, InsightStatus::NoData);
	assert!(doc.narrative.is_none());
	assert_eq!(h.narrator.count(), 0);
}

#[tokio::test]
async fn recompute_preserves_the_narrative() {
	let h = harness(test_config(true));
	let user_id = seeded(&h, &["Oats"]);
	let first = h.service.get_daily_insight(user_id, with_narrative()).await.expect("Read failed.");
	let recomputed = h
		.service
		.recompute_daily_insight(
			user_id,
			RecomputeRequest { date: Some(DATE.to_string()), ..Default::default() },
		)
		.await
		.expect("Recompute failed.");

	assert_eq!(recomputed.narrative, first.narrative);

	h.service.get_daily_insight(user_id, with_narrative()).await.expect("Read failed.");

	assert_eq!(h.narrator.count(), 1);
}

#[tokio::test]
async fn changed_context_regenerates_once() {
	let h = harness(test_config(true));
	let user_id = seeded(&h, &["Oats"]);
	let first = h.service.get_daily_insight(user_id, with_narrative()).await.expect("Read failed.");

	h.store.put_symptom(symptom(user_id, at_hour(14), at_hour(15)));
	h.narrator.set_reply(Some("Bloating noted around midday."));

	let second =
		h.service.get_daily_insight(user_id, with_narrative()).await.expect("Read failed.");
	let third = h.service.get_daily_insight(user_id, with_narrative()).await.expect("Read failed.");
	let first_hash = first.narrative.map(|n| n.hash);
	let second_hash = second.narrative.as_ref().map(|n| n.hash.clone());

	assert_eq!(h.narrator.count(), 2);
	assert_ne!(first_hash, second_hash);
	assert_eq!(second.narrative.map(|n| n.text), Some("Bloating noted around midday.".to_string()));
	assert_eq!(third.narrative.map(|n| n.hash), second_hash);
}
