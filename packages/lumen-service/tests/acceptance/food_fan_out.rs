use uuid::Uuid;

use lumen_domain::{
	bullets::{MAX_BULLETS, SINGLE_MEAL_BULLET},
	insight::InsightStatus,
	records::{Meal, UserProfile},
	summary::MAX_TOP_INTERACTIONS,
};
use lumen_service::{DailyInsightRequest, Error, food};

use super::{
	DATE, Harness, at_hour, harness, meal, nutrition_log, profile, risky_analysis, test_config,
};

fn request() -> DailyInsightRequest {
	DailyInsightRequest { date: Some(DATE.to_string()), ..Default::default() }
}

fn seed_meals(h: &Harness, meals: Vec<Meal>) -> Uuid {
	let user_id = Uuid::new_v4();

	h.store.put_profile(profile(user_id));
	h.store.put_log(nutrition_log(user_id, meals, at_hour(9)));

	user_id
}

#[tokio::test]
async fn repeated_food_is_analyzed_once() {
	let h = harness(test_config(false));
	let user_id = seed_meals(&h, vec![meal(&["Banana", "oats"]), meal(&["banana ", "Coffee"])]);
	let doc = h.service.get_daily_insight(user_id, request()).await.expect("Read failed.");
	let banana: Vec<_> =
		doc.nutrition.foods.iter().filter(|food| food.canonical_id == "food:banana").collect();

	assert_eq!(h.analyzer.count(), 3);
	assert_eq!(h.analyzer.names(), vec!["Banana", "oats", "Coffee"]);
	assert_eq!(banana.len(), 1);
	assert_eq!(banana[0].name, "Banana");
	assert_eq!(banana[0].occurrences, 2);
	assert_eq!(doc.nutrition.foods_count, 4);
	assert_eq!(doc.nutrition.meals_count, 2);
}

#[tokio::test]
async fn analyzer_failure_is_recorded_and_skipped() {
	let h = harness(test_config(false));
	let user_id = seed_meals(&h, vec![meal(&["Kale", "Rice"])]);

	h.analyzer.fail("kale");

	let doc = h.service.get_daily_insight(user_id, request()).await.expect("Read failed.");
	let reason = Error::Provider { message: "analyzer unavailable".to_string() };

	assert_eq!(doc.status, InsightStatus::Ok);
	assert_eq!(doc.errors, vec![food::failure_message("Kale", &reason)]);
	assert_eq!(doc.nutrition.foods.len(), 1);
	assert_eq!(doc.nutrition.foods[0].name, "Rice");
}

#[tokio::test]
async fn slow_analysis_times_out_without_failing_the_day() {
	let h = harness(test_config(false));
	let user_id = seed_meals(&h, vec![meal(&["Lentils", "Rice"])]);

	h.analyzer.stall("lentils");

	let doc = h.service.get_daily_insight(user_id, request()).await.expect("Read failed.");

	assert_eq!(doc.status, InsightStatus::Ok);
	assert_eq!(doc.errors.len(), 1);
	assert_eq!(
		doc.errors[0],
		"Food analysis failed for \"Lentils\": Food analysis timed out after 300 ms."
	);
	assert_eq!(doc.nutrition.foods.len(), 1);
}

#[tokio::test]
async fn snapshots_are_capped_but_summaries_see_every_food() {
	let h = harness(test_config(false));
	let names: Vec<String> = (0..30).map(|i| format!("Food {i:02}")).collect();
	let refs: Vec<&str> = names.iter().map(String::as_str).collect();
	let user_id = seed_meals(&h, vec![meal(&refs)]);
	let doc = h.service.get_daily_insight(user_id, request()).await.expect("Read failed.");
	let kept: Vec<&str> = doc.nutrition.foods.iter().map(|food| food.name.as_str()).collect();
	let uncertainty =
		doc.nutrition.aggregate.uncertainty.expect("Uncertainty should be summarized.");

	assert_eq!(h.analyzer.count(), 30);
	assert_eq!(kept, refs[..25].to_vec());
	assert_eq!(uncertainty.foods_count, 30);
	assert_eq!(uncertainty.nutrient_accuracy_avg, 0.8);
}

#[tokio::test]
async fn top_interactions_are_capped_and_ranked() {
	let h = harness(test_config(false));
	let names: Vec<String> = (1..=10).map(|i| format!("Item {i}")).collect();

	for (i, name) in names.iter().enumerate() {
		let key = name.to_lowercase();

		h.analyzer.respond(name, risky_analysis(&key, (i + 1) as f64 / 10.0, "high"));
	}

	let refs: Vec<&str> = names.iter().map(String::as_str).collect();
	let user_id = seed_meals(&h, vec![meal(&refs[..5]), meal(&refs[5..])]);
	let doc = h.service.get_daily_insight(user_id, request()).await.expect("Read failed.");
	let summary = &doc.nutrition.aggregate.interactions;
	let strengths: Vec<f64> = summary.top.iter().map(|item| item.strength_or_zero()).collect();

	assert_eq!(summary.risk_counts.high, 10);
	assert_eq!(summary.top.len(), MAX_TOP_INTERACTIONS);
	assert_eq!(summary.top[0].food, "Item 10");
	assert!(strengths.windows(2).all(|pair| pair[0] >= pair[1]));

	// Every food reports the same disease, so the highest score wins.
	let disease = &doc.nutrition.aggregate.disease;

	assert_eq!(disease.len(), 1);
	assert_eq!(disease[0].risk_contribution_score01, Some(1.0));
	assert_eq!(disease[0].safe_headline.as_deref(), Some("item 10 may raise glucose"));
	assert!(
		doc.nutrition
			.bullets
			.iter()
			.any(|line| line == "Condition-aware note: item 10 may raise glucose.")
	);
}

#[tokio::test]
async fn calorie_goal_bullet_reports_the_deviation() {
	let h = harness(test_config(false));
	let user_id = Uuid::new_v4();
	let mut log = nutrition_log(user_id, vec![meal(&["Pasta"])], at_hour(9));

	log.daily_totals.calories = 2_200.0;

	h.store.put_profile(UserProfile { daily_calorie_target: Some(2_000.0), ..profile(user_id) });
	h.store.put_log(log);

	let doc = h.service.get_daily_insight(user_id, request()).await.expect("Read failed.");
	let bullets = &doc.nutrition.bullets;

	assert_eq!(bullets[0], SINGLE_MEAL_BULLET);
	assert_eq!(bullets[1], "Calories: 2200 / 2000 kcal — slightly high (+200 kcal (10%)).");
	assert!(bullets.len() <= MAX_BULLETS);
}
