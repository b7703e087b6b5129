use crate::{
	meal_signals::MealSignals,
	records::DailyTotals,
	summary::{DiseaseSummaryEntry, InteractionSummary, UncertaintySummary},
};

pub const MAX_BULLETS: usize = 8;
pub const NO_MEALS_BULLET: &str = "No meals logged — insights are limited.";
pub const SINGLE_MEAL_BULLET: &str = "Only 1 meal logged — patterns may be noisy.";
pub const LOW_CONFIDENCE_BULLET: &str =
	"Insight confidence is limited (food matching uncertainty). Logging more specific foods helps.";

const CALORIE_TOLERANCE: f64 = 0.07;
const PROTEIN_TOLERANCE: f64 = 0.10;
const LOW_FIBER_G: f64 = 20.0;
const HIGH_SODIUM_MG: f64 = 2_300.0;
const HIGH_SUGAR_G: f64 = 60.0;
const LOW_WATER_ML: f64 = 1_500.0;
const LOW_ACCURACY: f64 = 0.55;

pub struct BulletInputs<'a> {
	pub totals: &'a DailyTotals,
	pub water_ml: f64,
	pub calorie_target: Option<f64>,
	pub protein_target: Option<f64>,
	pub meal_signals: &'a MealSignals,
	pub interactions: &'a InteractionSummary,
	pub disease: &'a [DiseaseSummaryEntry],
	pub uncertainty: Option<&'a UncertaintySummary>,
}

/// Rules run in a fixed order and the first `MAX_BULLETS` lines win; nothing is re-ranked.
pub fn build_bullets(inputs: &BulletInputs<'_>) -> Vec<String> {
	let totals = inputs.totals;
	let calories = positive(totals.calories);
	let protein = positive(totals.protein);
	let carbs = positive(totals.carbs);
	let fat = positive(totals.fat);
	let fiber = positive(totals.fiber);
	let sugar = positive(totals.sugar);
	let sodium = positive(totals.sodium);
	let water = positive(inputs.water_ml);
	let meals = inputs.meal_signals.meals_count;

	if meals == 0 && calories == 0.0 {
		return vec![NO_MEALS_BULLET.to_string()];
	}

	let mut bullets = Vec::new();

	if meals == 1 {
		bullets.push(SINGLE_MEAL_BULLET.to_string());
	}

	if let Some(line) = goal_line("Calories", " kcal", calories, inputs.calorie_target, CALORIE_TOLERANCE)
	{
		bullets.push(line);
	} else if calories > 0.0 {
		bullets.push(format!("Calories logged: {} kcal.", whole(calories)));
	}

	if let Some(line) = goal_line("Protein", "g", protein, inputs.protein_target, PROTEIN_TOLERANCE) {
		bullets.push(line);
	} else if protein > 0.0 {
		bullets.push(format!("Protein logged: {}g.", whole(protein)));
	}

	if let Some(line) = macro_split(protein, carbs, fat) {
		bullets.push(line);
	}

	if fiber > 0.0 && fiber < LOW_FIBER_G {
		bullets.push(format!(
			"Fiber is low ({}g). Aim for ~25–30g via legumes/veg/berries/whole grains.",
			whole(fiber)
		));
	}
	if sodium > HIGH_SODIUM_MG {
		bullets.push(format!(
			"Sodium is high ({} mg). Consider reducing packaged/salty foods.",
			whole(sodium)
		));
	}
	if sugar > HIGH_SUGAR_G {
		bullets.push(format!(
			"Sugar is high ({}g). Consider swapping in lower-sugar options.",
			whole(sugar)
		));
	}
	if water > 0.0 && water < LOW_WATER_ML {
		bullets.push(format!("Hydration looks low ({} ml logged).", whole(water)));
	}

	let mut snapshot = Vec::new();

	if fiber > 0.0 {
		snapshot.push(format!("fiber {}g", whole(fiber)));
	}
	if sugar > 0.0 {
		snapshot.push(format!("sugar {}g", whole(sugar)));
	}
	if sodium > 0.0 {
		snapshot.push(format!("sodium {}mg", whole(sodium)));
	}
	if water > 0.0 {
		snapshot.push(format!("water {}ml", whole(water)));
	}
	if !snapshot.is_empty() {
		bullets.push(format!("Quality snapshot: {}.", snapshot.join(" • ")));
	}

	let high_glycemic = inputs.meal_signals.high_glycemic_proxy_meals;

	if high_glycemic > 0 {
		bullets.push(format!(
			"{high_glycemic} meal(s) look high-glycemic (macro proxy). Add fiber/protein to smooth the spike."
		));
	}

	let counts = &inputs.interactions.risk_counts;

	if counts.high > 0 {
		bullets.push(format!(
			"Interactions flagged: {} high-risk ({} moderate). Review details before making changes.",
			counts.high, counts.moderate
		));
	} else if counts.moderate > 0 {
		bullets.push(format!(
			"Interactions flagged: {} moderate-risk. Review details if relevant.",
			counts.moderate
		));
	}

	if let Some(headline) = inputs.disease.first().and_then(|top| top.safe_headline.as_deref()) {
		bullets.push(format!("Condition-aware note: {headline}."));
	}

	let low_confidence = inputs.uncertainty.is_some_and(|summary| {
		summary.nutrient_accuracy_avg.is_finite() && summary.nutrient_accuracy_avg < LOW_ACCURACY
	});

	if low_confidence {
		bullets.push(LOW_CONFIDENCE_BULLET.to_string());
	}

	bullets.truncate(MAX_BULLETS);

	bullets
}

fn goal_line(
	label: &str,
	unit: &str,
	actual: f64,
	target: Option<f64>,
	tolerance: f64,
) -> Option<String> {
	let target = target.filter(|target| *target > 0.0)?;

	if actual <= 0.0 {
		return None;
	}

	let status = goal_status(actual, target, tolerance);
	let delta = format_delta(actual, target, unit);
	// Calories read "2200 / 2000 kcal", protein reads "130 / 120g".
	let target_text = format!("{}{}", whole(target), unit);

	Some(format!("{label}: {} / {target_text} — {status} ({delta}).", whole(actual)))
}

fn goal_status(actual: f64, target: f64, tolerance: f64) -> &'static str {
	let deviation = (actual - target).abs() / target;

	if deviation <= tolerance {
		"on track"
	} else if deviation <= tolerance * 2.0 {
		if actual > target { "slightly high" } else { "slightly low" }
	} else if actual > target {
		"high"
	} else {
		"low"
	}
}

fn format_delta(actual: f64, target: f64, unit: &str) -> String {
	let delta = actual - target;
	let sign = if delta >= 0.0 { '+' } else { '-' };
	let pct = whole(delta.abs() / target * 100.0);
	let mut out = format!("{sign}{}{unit}", whole(delta.abs()));

	if pct != 0 {
		out.push_str(&format!(" ({pct}%)"));
	}

	out
}

fn macro_split(protein: f64, carbs: f64, fat: f64) -> Option<String> {
	let protein_kcal = protein * 4.0;
	let carbs_kcal = carbs * 4.0;
	let fat_kcal = fat * 9.0;
	let total = protein_kcal + carbs_kcal + fat_kcal;

	if total <= 0.0 {
		return None;
	}

	Some(format!(
		"Macro split: P{}% / C{}% / F{}%.",
		whole(protein_kcal / total * 100.0),
		whole(carbs_kcal / total * 100.0),
		whole(fat_kcal / total * 100.0)
	))
}

fn positive(value: f64) -> f64 {
	if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

fn whole(value: f64) -> i64 {
	value.round() as i64
}
