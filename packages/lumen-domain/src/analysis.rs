use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::records::Meal;

/// Output of the external food analyzer. Unknown keys are carried through untouched so the stored
/// snapshot stays a faithful copy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodAnalysis {
	pub canonical_id: String,
	pub derived_metrics: Option<Value>,
	pub interactions: Vec<Interaction>,
	pub uncertainty: Option<Uncertainty>,
	pub scoring: Option<Value>,
	pub disease_analysis: Vec<DiseaseAnalysis>,
}

/// The analyzer's interaction engine emits camelCase keys; both spellings decode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
	#[serde(default, alias = "targetKind", skip_serializing_if = "Option::is_none")]
	pub target_kind: Option<String>,
	#[serde(default, alias = "targetKey", skip_serializing_if = "Option::is_none")]
	pub target_key: Option<String>,
	#[serde(default, alias = "interactionType", skip_serializing_if = "Option::is_none")]
	pub interaction_type: Option<String>,
	#[serde(default, alias = "riskLevel", skip_serializing_if = "Option::is_none")]
	pub risk_level: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub strength: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub uncertainty: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub meta: Option<Value>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl Interaction {
	/// Risk level when it is present and not "none".
	pub fn flagged_risk(&self) -> Option<&str> {
		self.risk_level.as_deref().map(str::trim).filter(|level| !level.is_empty() && *level != "none")
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Uncertainty {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nutrient_accuracy: Option<f64>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiseaseAnalysis {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub disease: Option<DiseaseRef>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub computed: Option<DiseaseComputed>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub safe_output: Option<SafeOutput>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl DiseaseAnalysis {
	/// Stable string key for the disease, whether the analyzer sent a string or a number.
	pub fn disease_key(&self) -> Option<String> {
		let id = self.disease.as_ref()?.disease_id.as_ref()?;
		let key = match id {
			Value::String(raw) => raw.trim().to_string(),
			Value::Number(number) => number.to_string(),
			_ => return None,
		};

		(!key.is_empty()).then_some(key)
	}

	pub fn score(&self) -> Option<f64> {
		self.computed.as_ref()?.risk_contribution_score01.filter(|score| score.is_finite())
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRef {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub disease_id: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiseaseComputed {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub risk_contribution_score01: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub highest_trigger: Option<Value>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SafeOutput {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub headline: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// A food name as it appeared in the day's meals, collapsed case-insensitively.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniqueFood {
	pub key: String,
	pub name: String,
	pub occurrences: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodAnalysisSnapshot {
	pub name: String,
	pub canonical_id: String,
	pub occurrences: u32,
	pub derived_metrics: Option<Value>,
	pub interactions: Vec<Interaction>,
	pub uncertainty: Option<Uncertainty>,
	pub scoring: Option<Value>,
	pub disease_analysis: Vec<DiseaseAnalysis>,
}
impl FoodAnalysisSnapshot {
	pub fn new(food: &UniqueFood, analysis: FoodAnalysis) -> Self {
		Self {
			name: food.name.clone(),
			canonical_id: analysis.canonical_id,
			occurrences: food.occurrences,
			derived_metrics: analysis.derived_metrics,
			interactions: analysis.interactions,
			uncertainty: analysis.uncertainty,
			scoring: analysis.scoring,
			disease_analysis: analysis.disease_analysis,
		}
	}
}

pub fn food_key(name: &str) -> String {
	name.trim().to_lowercase()
}

/// Unique foods across all meals in discovery order. Blank names are skipped; the first spelling
/// seen is kept as the display name.
pub fn unique_foods(meals: &[Meal]) -> Vec<UniqueFood> {
	let mut foods: Vec<UniqueFood> = Vec::new();
	let mut index: HashMap<String, usize> = HashMap::new();

	for food in meals.iter().flat_map(|meal| meal.foods.iter()) {
		let key = food_key(&food.name);

		if key.is_empty() {
			continue;
		}

		match index.get(&key) {
			Some(&slot) => foods[slot].occurrences += 1,
			None => {
				index.insert(key.clone(), foods.len());
				foods.push(UniqueFood { key, name: food.name.trim().to_string(), occurrences: 1 });
			},
		}
	}

	foods
}
