use std::time::Duration;

use futures::{StreamExt, stream};
use tokio::time;

use lumen_domain::{
	analysis::{self, FoodAnalysisSnapshot},
	records::{Meal, UserProfile},
};

use crate::{Error, LumenService};

/// Result of analyzing every unique food of a day.
#[derive(Clone, Debug, Default)]
pub struct FoodFanOut {
	pub unique_foods: usize,
	/// Successful analyses in discovery order.
	pub analyses: Vec<FoodAnalysisSnapshot>,
	pub errors: Vec<String>,
}

pub fn failure_message(name: &str, reason: &Error) -> String {
	format!("Food analysis failed for \"{name}\": {reason}")
}

impl LumenService {
	/// Calls the analyzer once per unique food name with bounded concurrency. Failures and
	/// timeouts drop the food and record a message; they never fail the day.
	pub async fn analyze_foods(&self, meals: &[Meal], profile: &UserProfile) -> FoodFanOut {
		let foods = analysis::unique_foods(meals);
		let cfg = &self.cfg.providers.food_analyzer;
		let analyzer = &self.providers.food_analyzer;
		let timeout = Duration::from_millis(cfg.timeout_ms);
		let concurrency = (self.cfg.insights.analyzer_concurrency as usize).max(1);
		let foods_ref = &foods;
		let outcomes: Vec<_> = stream::iter(0..foods.len())
			.map(|index| async move {
				let food = &foods_ref[index];
				let call = analyzer.analyze(cfg, &food.name, profile);
				let result = match time::timeout(timeout, call).await {
					Ok(result) => result,
					Err(_) => Err(Error::Timeout {
						operation: "Food analysis".to_string(),
						timeout_ms: cfg.timeout_ms,
					}),
				};

				(food, result)
			})
			.buffered(concurrency)
			.collect()
			.await;
		let mut fan_out = FoodFanOut { unique_foods: foods.len(), ..Default::default() };

		for (food, result) in outcomes {
			match result {
				Ok(analysis) => fan_out.analyses.push(FoodAnalysisSnapshot::new(food, analysis)),
				Err(err) => {
					tracing::warn!(food = %food.name, error = %err, "Food analysis failed.");

					fan_out.errors.push(failure_message(&food.name, &err));
				},
			}
		}

		fan_out
	}
}
