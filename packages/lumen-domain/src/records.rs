//! Source records the engine reads. Each nested shape owns its `Default` and deserializes
//! field-by-field, so partially filled documents never need structural merging.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
	pub user_id: Uuid,
	pub display_name: String,
	pub daily_calorie_target: Option<f64>,
	pub daily_protein_target: Option<f64>,
	pub diet_type: String,
	pub conditions: Vec<String>,
	pub allergies: Vec<String>,
	pub medications: Vec<Medication>,
	pub supplements: Vec<String>,
	pub lab_markers: LabMarkers,
	pub body_composition: BodyComposition,
	#[serde(with = "time::serde::rfc3339::option")]
	pub updated_at: Option<OffsetDateTime>,
}
impl UserProfile {
	/// Targets of zero or less are treated as unset.
	pub fn calorie_target(&self) -> Option<f64> {
		self.daily_calorie_target.filter(|target| *target > 0.0)
	}

	pub fn protein_target(&self) -> Option<f64> {
		self.daily_protein_target.filter(|target| *target > 0.0)
	}
}
impl Default for UserProfile {
	fn default() -> Self {
		Self {
			user_id: Uuid::nil(),
			display_name: String::new(),
			daily_calorie_target: None,
			daily_protein_target: None,
			diet_type: "omnivore".to_string(),
			conditions: Vec::new(),
			allergies: Vec::new(),
			medications: Vec::new(),
			supplements: Vec::new(),
			lab_markers: LabMarkers::default(),
			body_composition: BodyComposition::default(),
			updated_at: None,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Medication {
	pub name: String,
	pub dosage: Option<String>,
	pub schedule: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementSource {
	#[default]
	Manual,
	Ocr,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabValue {
	pub value: Option<f64>,
	pub unit: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lipids {
	pub total_cholesterol: Option<LabValue>,
	pub ldl: Option<LabValue>,
	pub hdl: Option<LabValue>,
	pub triglycerides: Option<LabValue>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabMarkers {
	pub hemoglobin: Option<LabValue>,
	pub ferritin: Option<LabValue>,
	pub iron: Option<LabValue>,
	pub vitamin_b12: Option<LabValue>,
	pub vitamin_d: Option<LabValue>,
	pub tsh: Option<LabValue>,
	pub crp: Option<LabValue>,
	pub fasting_glucose: Option<LabValue>,
	pub hba1c: Option<LabValue>,
	pub lipids: Lipids,
	#[serde(with = "time::serde::rfc3339::option")]
	pub updated_at: Option<OffsetDateTime>,
	pub source: MeasurementSource,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentalSide {
	pub right_arm: Option<f64>,
	pub left_arm: Option<f64>,
	pub trunk: Option<f64>,
	pub right_leg: Option<f64>,
	pub left_leg: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyComposition {
	pub bmi: Option<f64>,
	pub body_fat_percent: Option<f64>,
	pub fat_mass_kg: Option<f64>,
	pub smm_kg: Option<f64>,
	pub bmr_kcal: Option<f64>,
	pub metabolic_age: Option<f64>,
	pub visceral_fat_level: Option<f64>,
	pub segmental_fat_kg: Option<SegmentalSide>,
	pub segmental_fat_percent: Option<SegmentalSide>,
	pub segmental_muscle_kg: Option<SegmentalSide>,
	#[serde(with = "time::serde::rfc3339::option")]
	pub updated_at: Option<OffsetDateTime>,
	pub source: MeasurementSource,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NutritionLog {
	pub log_id: Uuid,
	pub user_id: Uuid,
	#[serde(with = "time::serde::rfc3339")]
	pub logged_at: OffsetDateTime,
	#[serde(default)]
	pub meals: Vec<Meal>,
	#[serde(default)]
	pub water_intake_ml: f64,
	#[serde(default)]
	pub daily_totals: DailyTotals,
	#[serde(default)]
	pub notes: Option<String>,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl NutritionLog {
	pub fn foods_count(&self) -> usize {
		self.meals.iter().map(|meal| meal.foods.len()).sum()
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MealType {
	Breakfast,
	Lunch,
	Dinner,
	#[default]
	Snack,
	PreWorkout,
	PostWorkout,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meal {
	pub name: Option<String>,
	pub meal_type: MealType,
	pub time: Option<String>,
	pub foods: Vec<LoggedFood>,
	pub total_calories: f64,
	pub total_protein: f64,
	pub total_carbs: f64,
	pub total_fat: f64,
	pub notes: Option<String>,
}
impl Meal {
	pub fn total_fiber(&self) -> f64 {
		self.foods.iter().map(|food| food.fiber).sum()
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggedFood {
	pub name: String,
	pub quantity: Option<f64>,
	pub unit: String,
	pub calories: f64,
	pub protein: f64,
	pub carbs: f64,
	pub fat: f64,
	pub fiber: f64,
	pub sugar: f64,
	pub sodium: f64,
	pub potassium: f64,
	pub iron: f64,
	pub calcium: f64,
	pub magnesium: f64,
	pub zinc: f64,
	pub vitamin_c: f64,
	pub omega3: f64,
}
impl Default for LoggedFood {
	fn default() -> Self {
		Self {
			name: String::new(),
			quantity: None,
			unit: "g".to_string(),
			calories: 0.0,
			protein: 0.0,
			carbs: 0.0,
			fat: 0.0,
			fiber: 0.0,
			sugar: 0.0,
			sodium: 0.0,
			potassium: 0.0,
			iron: 0.0,
			calcium: 0.0,
			magnesium: 0.0,
			zinc: 0.0,
			vitamin_c: 0.0,
			omega3: 0.0,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyTotals {
	pub calories: f64,
	pub protein: f64,
	pub carbs: f64,
	pub fat: f64,
	pub fiber: f64,
	pub sugar: f64,
	pub sodium: f64,
	pub potassium: f64,
	pub iron: f64,
	pub calcium: f64,
	pub magnesium: f64,
	pub zinc: f64,
	pub vitamin_c: f64,
	pub omega3: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymptomLog {
	pub symptom_id: Uuid,
	pub user_id: Uuid,
	#[serde(with = "time::serde::rfc3339")]
	pub logged_at: OffsetDateTime,
	pub symptom_name: String,
	/// 0-10 when reported.
	#[serde(default)]
	pub severity: Option<f32>,
	#[serde(default)]
	pub notes: String,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabFlag {
	Low,
	High,
	Normal,
	#[default]
	Unknown,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabResult {
	pub name: String,
	/// Numeric or textual, as printed on the report.
	pub value: Value,
	pub unit: String,
	pub ref_range_low: Option<f64>,
	pub ref_range_high: Option<f64>,
	pub flag: LabFlag,
	pub notes: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabReport {
	pub report_id: Uuid,
	pub user_id: Uuid,
	#[serde(with = "time::serde::rfc3339")]
	pub reported_at: OffsetDateTime,
	pub panel_name: String,
	#[serde(default)]
	pub results: Vec<LabResult>,
	#[serde(default = "default_lab_source")]
	pub source: String,
	#[serde(default)]
	pub notes: String,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}

fn default_lab_source() -> String {
	"manual".to_string()
}
