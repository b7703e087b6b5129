use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	analysis::FoodAnalysisSnapshot,
	bullets::{self, BulletInputs},
	day::DayWindow,
	meal_signals::{self, MealSignals},
	records::{DailyTotals, LabReport, NutritionLog, SymptomLog, UserProfile},
	summary::{self, DiseaseSummaryEntry, InteractionSummary, UncertaintySummary},
};

pub const INSIGHT_SCHEMA_VERSION: i32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightStatus {
	Ok,
	NoData,
	/// Reserved. Fatal conditions return errors and never persist a document.
	Error,
}
impl InsightStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Ok => "ok",
			Self::NoData => "no_data",
			Self::Error => "error",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"ok" => Some(Self::Ok),
			"no_data" => Some(Self::NoData),
			"error" => Some(Self::Error),
			_ => None,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyInsight {
	pub user_id: Uuid,
	/// Local midnight that starts the day.
	#[serde(with = "time::serde::rfc3339")]
	pub day: OffsetDateTime,
	pub status: InsightStatus,
	#[serde(with = "time::serde::rfc3339::option")]
	pub inputs_updated_at: Option<OffsetDateTime>,
	#[serde(with = "time::serde::rfc3339")]
	pub computed_at: OffsetDateTime,
	pub version: i32,
	pub nutrition: NutritionBlock,
	pub symptoms: WindowBlock<SymptomLog>,
	pub labs: WindowBlock<LabReport>,
	pub narrative: Option<Narrative>,
	pub errors: Vec<String>,
}
impl DailyInsight {
	/// Whether the cached document still reflects its sources, given the freshest `updated_at`
	/// currently visible across them.
	pub fn is_fresh(&self, newest_source: Option<OffsetDateTime>) -> bool {
		match (self.inputs_updated_at, newest_source) {
			(Some(recorded), Some(newest)) => newest <= recorded,
			// Computed from nothing and still nothing to read.
			(None, None) => true,
			_ => false,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NutritionBlock {
	pub log_id: Option<Uuid>,
	pub meals_count: usize,
	pub foods_count: usize,
	pub water_intake_ml: f64,
	pub daily_totals: DailyTotals,
	pub meal_signals: MealSignals,
	pub foods: Vec<FoodAnalysisSnapshot>,
	pub aggregate: NutritionAggregate,
	pub bullets: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NutritionAggregate {
	pub meal_signals: MealSignals,
	pub interactions: InteractionSummary,
	pub uncertainty: Option<UncertaintySummary>,
	pub disease: Vec<DiseaseSummaryEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowBlock<T> {
	pub window_days: u32,
	pub items: Vec<T>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
	pub text: String,
	pub hash: String,
	pub model: String,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}

/// Everything a recompute gathered, ready to be reduced into a document.
pub struct InsightDraft<'a> {
	pub user_id: Uuid,
	pub window: &'a DayWindow,
	pub profile: &'a UserProfile,
	pub log: Option<NutritionLog>,
	pub symptoms: Vec<SymptomLog>,
	pub labs: Vec<LabReport>,
	pub inputs_updated_at: Option<OffsetDateTime>,
	pub unique_foods: usize,
	/// Successful analyses in discovery order.
	pub analyses: Vec<FoodAnalysisSnapshot>,
	pub errors: Vec<String>,
	pub max_food_snapshots: usize,
	pub computed_at: OffsetDateTime,
}

pub fn build_insight(draft: InsightDraft<'_>) -> DailyInsight {
	let InsightDraft {
		user_id,
		window,
		profile,
		log,
		symptoms,
		labs,
		inputs_updated_at,
		unique_foods,
		mut analyses,
		errors,
		max_food_snapshots,
		computed_at,
	} = draft;
	let meals = log.as_ref().map(|log| log.meals.as_slice()).unwrap_or_default();
	let meal_signals = meal_signals::compute_meal_signals(meals);
	let interactions = summary::summarize_interactions(&analyses);
	let disease = summary::summarize_disease(&analyses);
	let uncertainty = summary::summarize_uncertainty(&analyses);
	let daily_totals = log.as_ref().map(|log| log.daily_totals.clone()).unwrap_or_default();
	let water_intake_ml = log.as_ref().map(|log| log.water_intake_ml).unwrap_or(0.0);
	let bullets = bullets::build_bullets(&BulletInputs {
		totals: &daily_totals,
		water_ml: water_intake_ml,
		calorie_target: profile.calorie_target(),
		protein_target: profile.protein_target(),
		meal_signals: &meal_signals,
		interactions: &interactions,
		disease: &disease,
		uncertainty: uncertainty.as_ref(),
	});
	let status =
		if log.is_some() || unique_foods > 0 { InsightStatus::Ok } else { InsightStatus::NoData };

	analyses.truncate(max_food_snapshots);

	DailyInsight {
		user_id,
		day: window.start(),
		status,
		inputs_updated_at,
		computed_at,
		version: INSIGHT_SCHEMA_VERSION,
		nutrition: NutritionBlock {
			log_id: log.as_ref().map(|log| log.log_id),
			meals_count: meals.len(),
			foods_count: log.as_ref().map(NutritionLog::foods_count).unwrap_or(0),
			water_intake_ml,
			daily_totals,
			meal_signals: meal_signals.clone(),
			foods: analyses,
			aggregate: NutritionAggregate { meal_signals, interactions, uncertainty, disease },
			bullets,
		},
		symptoms: WindowBlock { window_days: window.symptom_window_days, items: symptoms },
		labs: WindowBlock { window_days: window.lab_window_days, items: labs },
		narrative: None,
		errors,
	}
}

/// The latest of the given timestamps, if any.
pub fn latest<I>(values: I) -> Option<OffsetDateTime>
where
	I: IntoIterator<Item = Option<OffsetDateTime>>,
{
	values.into_iter().flatten().max()
}
