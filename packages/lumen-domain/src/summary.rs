use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::FoodAnalysisSnapshot;

pub const MAX_TOP_INTERACTIONS: usize = 8;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCounts {
	pub high: usize,
	pub moderate: usize,
	pub low: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedInteraction {
	pub food: String,
	pub canonical_id: String,
	pub target_kind: Option<String>,
	pub target_key: Option<String>,
	pub interaction_type: Option<String>,
	pub risk_level: String,
	pub strength: Option<f64>,
	pub uncertainty: Option<Value>,
	pub meta: Option<Value>,
}
impl RankedInteraction {
	pub fn strength_or_zero(&self) -> f64 {
		self.strength.filter(|value| value.is_finite()).unwrap_or(0.0)
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionSummary {
	pub risk_counts: RiskCounts,
	pub top: Vec<RankedInteraction>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiseaseSummaryEntry {
	pub disease_id: String,
	pub name: Option<String>,
	pub category: Option<String>,
	pub risk_contribution_score01: Option<f64>,
	pub highest_trigger: Option<Value>,
	pub safe_headline: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UncertaintySummary {
	pub nutrient_accuracy_avg: f64,
	pub foods_count: usize,
}

pub fn summarize_interactions(foods: &[FoodAnalysisSnapshot]) -> InteractionSummary {
	let mut ranked: Vec<RankedInteraction> = foods
		.iter()
		.flat_map(|food| {
			food.interactions.iter().filter_map(move |interaction| {
				let risk_level = interaction.flagged_risk()?;

				Some(RankedInteraction {
					food: food.name.clone(),
					canonical_id: food.canonical_id.clone(),
					target_kind: interaction.target_kind.clone(),
					target_key: interaction.target_key.clone(),
					interaction_type: interaction.interaction_type.clone(),
					risk_level: risk_level.to_string(),
					strength: interaction.strength,
					uncertainty: interaction.uncertainty.clone(),
					meta: interaction.meta.clone(),
				})
			})
		})
		.collect();

	// Stable, so equal strengths keep food/interaction order.
	ranked.sort_by(|a, b| b.strength_or_zero().total_cmp(&a.strength_or_zero()));

	let mut risk_counts = RiskCounts::default();

	for interaction in &ranked {
		match interaction.risk_level.as_str() {
			"high" => risk_counts.high += 1,
			"moderate" => risk_counts.moderate += 1,
			"low" => risk_counts.low += 1,
			_ => {},
		}
	}

	ranked.truncate(MAX_TOP_INTERACTIONS);

	InteractionSummary { risk_counts, top: ranked }
}

/// One entry per disease id holding its highest-scoring observation, highest first.
pub fn summarize_disease(foods: &[FoodAnalysisSnapshot]) -> Vec<DiseaseSummaryEntry> {
	let mut entries: Vec<(Option<f64>, DiseaseSummaryEntry)> = Vec::new();
	let mut index: HashMap<String, usize> = HashMap::new();

	for analysis in foods.iter().flat_map(|food| food.disease_analysis.iter()) {
		let Some(key) = analysis.disease_key() else {
			continue;
		};
		let score = analysis.score();
		let disease = analysis.disease.as_ref();
		let entry = DiseaseSummaryEntry {
			disease_id: key.clone(),
			name: disease.and_then(|d| d.name.clone()),
			category: disease.and_then(|d| d.category.clone()),
			risk_contribution_score01: score.map(round3),
			highest_trigger: analysis.computed.as_ref().and_then(|c| c.highest_trigger.clone()),
			safe_headline: analysis
				.safe_output
				.as_ref()
				.and_then(|s| s.headline.clone())
				.filter(|headline| !headline.trim().is_empty()),
		};

		match index.get(&key) {
			None => {
				index.insert(key, entries.len());
				entries.push((score, entry));
			},
			Some(&slot) => {
				let best = entries[slot].0;
				let replaces = match (score, best) {
					(Some(candidate), Some(best)) => candidate > best,
					(Some(_), None) => true,
					(None, _) => false,
				};

				if replaces {
					entries[slot] = (score, entry);
				}
			},
		}
	}

	let mut summary: Vec<DiseaseSummaryEntry> =
		entries.into_iter().map(|(_, entry)| entry).collect();

	summary.sort_by(|a, b| {
		let a = a.risk_contribution_score01.unwrap_or(0.0);
		let b = b.risk_contribution_score01.unwrap_or(0.0);

		b.total_cmp(&a)
	});

	summary
}

pub fn summarize_uncertainty(foods: &[FoodAnalysisSnapshot]) -> Option<UncertaintySummary> {
	let values: Vec<f64> = foods
		.iter()
		.filter_map(|food| food.uncertainty.as_ref()?.nutrient_accuracy)
		.filter(|value| value.is_finite())
		.collect();

	if values.is_empty() {
		return None;
	}

	let avg = values.iter().sum::<f64>() / values.len() as f64;

	Some(UncertaintySummary { nutrient_accuracy_avg: round3(avg), foods_count: values.len() })
}

fn round3(value: f64) -> f64 {
	(value * 1_000.0).round() / 1_000.0
}
