use uuid::Uuid;

use lumen_domain::{
	bullets::NO_MEALS_BULLET,
	insight::{INSIGHT_SCHEMA_VERSION, InsightStatus},
};
use lumen_service::{DailyInsightRequest, Error, RecomputeRequest};

use super::{
	DATE, DAY, at_hour, harness, meal, nutrition_log, profile, seeded, symptom, test_config,
};

fn request() -> DailyInsightRequest {
	DailyInsightRequest { date: Some(DATE.to_string()), ..Default::default() }
}

#[tokio::test]
async fn second_read_serves_the_cached_document() {
	let h = harness(test_config(false));
	let user_id = seeded(&h, &["Oats", "Banana"]);
	let first = h.service.get_daily_insight(user_id, request()).await.expect("First read failed.");
	let second =
		h.service.get_daily_insight(user_id, request()).await.expect("Second read failed.");

	assert_eq!(first, second);
	assert_eq!(first.day, DAY);
	assert_eq!(first.status, InsightStatus::Ok);
	assert_eq!(first.version, INSIGHT_SCHEMA_VERSION);
	assert_eq!(first.inputs_updated_at, Some(at_hour(9)));
	assert_eq!(h.store.upserts(), 1);
	assert_eq!(h.analyzer.count(), 2);
}

#[tokio::test]
async fn newer_source_triggers_recompute() {
	let h = harness(test_config(false));
	let user_id = seeded(&h, &["Oats"]);
	let first = h.service.get_daily_insight(user_id, request()).await.expect("First read failed.");
	let late = symptom(user_id, at_hour(12), at_hour(13));

	h.store.put_symptom(late.clone());

	let second =
		h.service.get_daily_insight(user_id, request()).await.expect("Second read failed.");

	assert_eq!(h.store.upserts(), 2);
	assert!(first.symptoms.items.is_empty());
	assert_eq!(second.symptoms.items, vec![late]);
	assert_eq!(second.inputs_updated_at, Some(at_hour(13)));
}

#[tokio::test]
async fn edits_to_older_rows_are_noticed() {
	let h = harness(test_config(false));
	let user_id = seeded(&h, &["Oats"]);
	let old = symptom(user_id, DAY - time::Duration::days(1), DAY - time::Duration::days(1));

	h.store.put_symptom(old.clone());

	h.service.get_daily_insight(user_id, request()).await.expect("First read failed.");
	h.store.touch_symptom(old.symptom_id, at_hour(20));

	let refreshed =
		h.service.get_daily_insight(user_id, request()).await.expect("Second read failed.");

	assert_eq!(h.store.upserts(), 2);
	assert_eq!(refreshed.inputs_updated_at, Some(at_hour(20)));
}

#[tokio::test]
async fn refresh_skips_the_staleness_check() {
	let h = harness(test_config(false));
	let user_id = seeded(&h, &["Oats"]);

	h.service.get_daily_insight(user_id, request()).await.expect("First read failed.");
	h.service
		.get_daily_insight(user_id, DailyInsightRequest { refresh: true, ..request() })
		.await
		.expect("Refresh failed.");

	assert_eq!(h.store.upserts(), 2);
	assert_eq!(h.analyzer.count(), 2);
}

#[tokio::test]
async fn forced_recomputes_are_deterministic() {
	let h = harness(test_config(false));
	let user_id = seeded(&h, &["Oats", "Banana", "Coffee"]);
	let req = || RecomputeRequest { date: Some(DATE.to_string()), ..Default::default() };
	let first = h.service.recompute_daily_insight(user_id, req()).await.expect("Recompute failed.");
	let second =
		h.service.recompute_daily_insight(user_id, req()).await.expect("Recompute failed.");

	assert_eq!(first.nutrition.bullets, second.nutrition.bullets);
	assert_eq!(first.nutrition.aggregate, second.nutrition.aggregate);
	assert_eq!(first.nutrition.foods, second.nutrition.foods);
	assert_eq!(first.inputs_updated_at, second.inputs_updated_at);
	assert_eq!(h.store.upserts(), 2);
}

#[tokio::test]
async fn empty_day_is_cached_as_no_data_until_something_arrives() {
	let h = harness(test_config(false));
	let user_id = Uuid::new_v4();

	h.store.put_profile(profile(user_id));

	let empty = h.service.get_daily_insight(user_id, request()).await.expect("First read failed.");

	assert_eq!(empty.status, InsightStatus::NoData);
	assert_eq!(empty.inputs_updated_at, None);
	assert_eq!(empty.nutrition.bullets, vec![NO_MEALS_BULLET.to_string()]);

	h.service.get_daily_insight(user_id, request()).await.expect("Second read failed.");

	assert_eq!(h.store.upserts(), 1);

	h.store.put_log(nutrition_log(user_id, vec![meal(&["Rice"])], at_hour(18)));

	let filled = h.service.get_daily_insight(user_id, request()).await.expect("Third read failed.");

	assert_eq!(filled.status, InsightStatus::Ok);
	assert_eq!(filled.inputs_updated_at, Some(at_hour(18)));
	assert_eq!(h.store.upserts(), 2);
}

#[tokio::test]
async fn outdated_schema_version_is_recomputed() {
	let h = harness(test_config(false));
	let user_id = seeded(&h, &["Oats"]);
	let mut doc =
		h.service.get_daily_insight(user_id, request()).await.expect("First read failed.");

	doc.version = INSIGHT_SCHEMA_VERSION - 1;

	h.store.put_insight(doc);

	let refreshed =
		h.service.get_daily_insight(user_id, request()).await.expect("Second read failed.");

	assert_eq!(refreshed.version, INSIGHT_SCHEMA_VERSION);
	assert_eq!(h.store.upserts(), 2);
}

#[tokio::test]
async fn unreadable_cached_insight_is_recomputed() {
	let h = harness(test_config(false));
	let user_id = seeded(&h, &["Oats"]);

	h.service.get_daily_insight(user_id, request()).await.expect("First read failed.");
	h.store.corrupt_insight();

	let recomputed =
		h.service.get_daily_insight(user_id, request()).await.expect("Second read failed.");

	assert_eq!(recomputed.status, InsightStatus::Ok);
	assert_eq!(h.store.upserts(), 2);
	// One lookup per read; a malformed row is not retried.
	assert_eq!(h.store.insight_reads(), 2);

	h.service.get_daily_insight(user_id, request()).await.expect("Third read failed.");

	assert_eq!(h.store.upserts(), 2);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
	let h = harness(test_config(false));
	let user_id = Uuid::new_v4();
	let err =
		h.service.get_daily_insight(user_id, request()).await.expect_err("Expected an error.");

	assert!(matches!(err, Error::UserNotFound { user_id: missing } if missing == user_id));
	assert_eq!(h.store.upserts(), 0);
	assert!(h.store.stored(user_id).is_none());
}

#[tokio::test]
async fn malformed_date_is_rejected() {
	let h = harness(test_config(false));
	let user_id = seeded(&h, &["Oats"]);
	let req = DailyInsightRequest { date: Some("10/03/2026".to_string()), ..Default::default() };
	let err = h.service.get_daily_insight(user_id, req).await.expect_err("Expected an error.");

	assert!(matches!(err, Error::InvalidDate { ref input } if input == "10/03/2026"));
	assert_eq!(h.analyzer.count(), 0);
}

#[tokio::test]
async fn transient_store_failures_are_retried() {
	let h = harness(test_config(false));
	let user_id = seeded(&h, &["Oats"]);

	h.store.fail_profile_reads(1);

	let doc = h.service.get_daily_insight(user_id, request()).await.expect("Retry should recover.");

	assert_eq!(doc.status, InsightStatus::Ok);
}

#[tokio::test]
async fn persistent_store_failures_surface() {
	let h = harness(test_config(false));
	let user_id = seeded(&h, &["Oats"]);

	h.store.fail_profile_reads(10);

	let err =
		h.service.get_daily_insight(user_id, request()).await.expect_err("Expected an error.");

	assert!(matches!(err, Error::Storage { .. }));
	assert_eq!(h.store.upserts(), 0);
}
