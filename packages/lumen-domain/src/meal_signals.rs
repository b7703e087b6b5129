use serde::{Deserialize, Serialize};

use crate::records::Meal;

/// Shown next to the counts so users can see how "high glycemic" was decided.
pub const GLYCEMIC_PROXY_NOTE: &str =
	"High-glycemic proxy is computed as carbs/(fiber+protein+1) from logged meal macros.";
pub const HIGH_GLYCEMIC_PROXY_THRESHOLD: f64 = 10.0;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealSignals {
	pub meals_count: usize,
	pub high_glycemic_proxy_meals: usize,
	pub meals_with_macros: usize,
	pub proxy_note: String,
}
impl Default for MealSignals {
	fn default() -> Self {
		Self {
			meals_count: 0,
			high_glycemic_proxy_meals: 0,
			meals_with_macros: 0,
			proxy_note: GLYCEMIC_PROXY_NOTE.to_string(),
		}
	}
}

pub fn glycemic_proxy(meal: &Meal) -> f64 {
	meal.total_carbs / (meal.total_fiber() + meal.total_protein + 1.0)
}

pub fn compute_meal_signals(meals: &[Meal]) -> MealSignals {
	let mut signals = MealSignals { meals_count: meals.len(), ..Default::default() };

	for meal in meals {
		let fiber = meal.total_fiber();

		if meal.total_carbs != 0.0 || meal.total_protein != 0.0 || fiber != 0.0 {
			signals.meals_with_macros += 1;
		}
		if glycemic_proxy(meal) > HIGH_GLYCEMIC_PROXY_THRESHOLD {
			signals.high_glycemic_proxy_meals += 1;
		}
	}

	signals
}
