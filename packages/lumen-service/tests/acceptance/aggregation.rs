use time::{Duration, macros::datetime};
use uuid::Uuid;

use lumen_domain::insight::InsightStatus;
use lumen_service::{DailyInsightRequest, Error};

use super::{
	DATE, DAY, at_hour, harness, lab, meal, nutrition_log, profile, seeded, symptom, test_config,
};

fn request() -> DailyInsightRequest {
	DailyInsightRequest { date: Some(DATE.to_string()), ..Default::default() }
}

#[tokio::test]
async fn windows_select_sources_newest_first() {
	let h = harness(test_config(false));
	let user_id = seeded(&h, &["Oats"]);
	let recent = symptom(user_id, at_hour(10), at_hour(10));
	let earlier = symptom(user_id, DAY - Duration::days(1), DAY - Duration::days(1));
	let too_old = symptom(user_id, DAY - Duration::days(3), DAY - Duration::days(3));
	let fresh_lab = lab(user_id, DAY - Duration::days(10));
	let stale_lab = lab(user_id, DAY - Duration::days(20));

	for item in [earlier.clone(), too_old, recent.clone()] {
		h.store.put_symptom(item);
	}
	for item in [stale_lab, fresh_lab.clone()] {
		h.store.put_lab(item);
	}

	let window = h.service.resolve_window(Some(DATE)).expect("Window should resolve.");
	let inputs = h.service.aggregate_day(user_id, &window).await.expect("Aggregation failed.");

	assert_eq!(inputs.symptoms, vec![recent, earlier]);
	assert_eq!(inputs.labs, vec![fresh_lab]);
	assert_eq!(inputs.log.as_ref().map(|log| log.updated_at), Some(at_hour(9)));
	assert_eq!(inputs.inputs_updated_at(), Some(at_hour(10)));
}

#[tokio::test]
async fn freshness_covers_rows_beyond_the_snapshot_limit() {
	let mut cfg = test_config(false);

	cfg.insights.symptom_limit = 1;

	let h = harness(cfg);
	let user_id = seeded(&h, &["Oats"]);
	let shown = symptom(user_id, at_hour(10), at_hour(10));
	let hidden = symptom(user_id, DAY - Duration::days(1), at_hour(22));

	h.store.put_symptom(shown.clone());
	h.store.put_symptom(hidden);

	let first = h.service.get_daily_insight(user_id, request()).await.expect("Read failed.");

	h.service.get_daily_insight(user_id, request()).await.expect("Read failed.");

	assert_eq!(first.symptoms.items, vec![shown]);
	assert_eq!(first.symptoms.window_days, 2);
	assert_eq!(first.labs.window_days, 14);
	assert_eq!(first.inputs_updated_at, Some(at_hour(22)));
	assert_eq!(h.store.upserts(), 1);
}

#[tokio::test]
async fn missing_profile_fails_aggregation() {
	let h = harness(test_config(false));
	let user_id = Uuid::new_v4();
	let window = h.service.resolve_window(Some(DATE)).expect("Window should resolve.");

	h.store.put_log(nutrition_log(user_id, vec![meal(&["Oats"])], at_hour(9)));

	let err = h.service.aggregate_day(user_id, &window).await.expect_err("Expected an error.");

	assert!(matches!(err, Error::UserNotFound { .. }));
}

#[tokio::test]
async fn configured_offset_defines_the_calendar_day() {
	let mut cfg = test_config(false);

	cfg.service.utc_offset = "-05:00".to_string();

	let h = harness(cfg);
	let user_id = Uuid::new_v4();
	// 02:00Z is still March 9th at -05:00.
	let mut log = nutrition_log(user_id, vec![meal(&["Oats"])], at_hour(2));

	log.logged_at = at_hour(2);

	h.store.put_profile(profile(user_id));
	h.store.put_log(log);

	let doc = h.service.get_daily_insight(user_id, request()).await.expect("Read failed.");

	assert_eq!(doc.day, datetime!(2026-03-10 0:00 -5));
	assert_eq!(doc.status, InsightStatus::NoData);
	assert_eq!(h.analyzer.count(), 0);
}
