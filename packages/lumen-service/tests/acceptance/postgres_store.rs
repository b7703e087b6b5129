use std::sync::Arc;

use uuid::Uuid;

use lumen_domain::insight::InsightStatus;
use lumen_service::{DailyInsightRequest, LumenService, Providers, Stores};
use lumen_storage::{db::Db, queries};
use lumen_testkit::TestDatabase;

use super::{DATE, SpyAnalyzer, SpyNarrator, at_hour, meal, nutrition_log, profile, test_config};

#[tokio::test]
#[ignore = "Requires external Postgres. Set LUMEN_PG_DSN to run."]
async fn postgres_round_trip_serves_from_cache() {
	let Some(base_dsn) = lumen_testkit::env_dsn() else {
		eprintln!("Skipping postgres_round_trip_serves_from_cache; set LUMEN_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let mut cfg = test_config(true);

	cfg.storage.postgres.dsn = test_db.dsn().to_string();

	let db = Db::connect(&cfg.storage.postgres).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let user_id = Uuid::new_v4();

	queries::upsert_profile(&db, &profile(user_id), at_hour(1))
		.await
		.expect("Failed to insert profile.");
	queries::insert_nutrition_log(&db, &nutrition_log(user_id, vec![meal(&["Oats"])], at_hour(9)))
		.await
		.expect("Failed to insert log.");

	let analyzer = Arc::new(SpyAnalyzer::default());
	let narrator = Arc::new(SpyNarrator::replying("Oats carried the morning."));
	let service = LumenService::with_parts(
		cfg,
		Stores::postgres(db),
		Providers::new(analyzer.clone(), narrator.clone()),
	)
	.expect("Failed to build service.");
	let req = DailyInsightRequest {
		date: Some(DATE.to_string()),
		include_narrative: true,
		..Default::default()
	};
	let first = service.get_daily_insight(user_id, req.clone()).await.expect("First read failed.");
	let second = service.get_daily_insight(user_id, req).await.expect("Second read failed.");

	assert_eq!(first.status, InsightStatus::Ok);
	assert_eq!(first.inputs_updated_at, Some(at_hour(9)));
	assert_eq!(
		first.narrative.as_ref().map(|n| n.text.as_str()),
		Some("Oats carried the morning.")
	);
	assert_eq!(second.narrative, first.narrative);
	assert_eq!(second.nutrition, first.nutrition);
	assert_eq!(analyzer.count(), 1);
	assert_eq!(narrator.count(), 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
