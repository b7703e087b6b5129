use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use lumen_domain::{
	insight::{DailyInsight, InsightStatus},
	records::{LabReport, NutritionLog, SymptomLog, UserProfile},
};

use crate::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
pub struct UserProfileRow {
	pub user_id: Uuid,
	pub profile: Value,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
impl UserProfileRow {
	pub fn into_domain(self) -> Result<UserProfile> {
		let mut profile: UserProfile = serde_json::from_value(self.profile)?;

		profile.user_id = self.user_id;
		profile.updated_at = Some(self.updated_at);

		Ok(profile)
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct NutritionLogRow {
	pub log_id: Uuid,
	pub user_id: Uuid,
	pub logged_at: OffsetDateTime,
	pub meals: Value,
	pub water_intake_ml: f64,
	pub daily_totals: Value,
	pub notes: Option<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
impl NutritionLogRow {
	pub fn into_domain(self) -> Result<NutritionLog> {
		Ok(NutritionLog {
			log_id: self.log_id,
			user_id: self.user_id,
			logged_at: self.logged_at,
			meals: serde_json::from_value(self.meals)?,
			water_intake_ml: self.water_intake_ml,
			daily_totals: serde_json::from_value(self.daily_totals)?,
			notes: self.notes,
			created_at: self.created_at,
			updated_at: self.updated_at,
		})
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct SymptomLogRow {
	pub symptom_id: Uuid,
	pub user_id: Uuid,
	pub logged_at: OffsetDateTime,
	pub symptom_name: String,
	pub severity: Option<f32>,
	pub notes: String,
	pub tags: Vec<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
impl From<SymptomLogRow> for SymptomLog {
	fn from(row: SymptomLogRow) -> Self {
		Self {
			symptom_id: row.symptom_id,
			user_id: row.user_id,
			logged_at: row.logged_at,
			symptom_name: row.symptom_name,
			severity: row.severity,
			notes: row.notes,
			tags: row.tags,
			created_at: row.created_at,
			updated_at: row.updated_at,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct LabReportRow {
	pub report_id: Uuid,
	pub user_id: Uuid,
	pub reported_at: OffsetDateTime,
	pub panel_name: String,
	pub results: Value,
	pub source: String,
	pub notes: String,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
impl LabReportRow {
	pub fn into_domain(self) -> Result<LabReport> {
		Ok(LabReport {
			report_id: self.report_id,
			user_id: self.user_id,
			reported_at: self.reported_at,
			panel_name: self.panel_name,
			results: serde_json::from_value(self.results)?,
			source: self.source,
			notes: self.notes,
			created_at: self.created_at,
			updated_at: self.updated_at,
		})
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct DailyInsightRow {
	pub user_id: Uuid,
	pub day_start: OffsetDateTime,
	pub status: String,
	pub inputs_updated_at: Option<OffsetDateTime>,
	pub computed_at: OffsetDateTime,
	pub version: i32,
	pub nutrition: Value,
	pub symptoms: Value,
	pub labs: Value,
	pub errors: Value,
	pub narrative: Option<Value>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
impl DailyInsightRow {
	pub fn into_domain(self) -> Result<DailyInsight> {
		let status = InsightStatus::parse(&self.status)
			.ok_or_else(|| Error::InvalidRow(format!("Unknown insight status {:?}.", self.status)))?;
		let narrative = match self.narrative {
			Some(Value::Null) | None => None,
			Some(value) => Some(serde_json::from_value(value)?),
		};

		Ok(DailyInsight {
			user_id: self.user_id,
			day: self.day_start,
			status,
			inputs_updated_at: self.inputs_updated_at,
			computed_at: self.computed_at,
			version: self.version,
			nutrition: serde_json::from_value(self.nutrition)?,
			symptoms: serde_json::from_value(self.symptoms)?,
			labs: serde_json::from_value(self.labs)?,
			narrative,
			errors: serde_json::from_value(self.errors)?,
		})
	}
}
