use time::OffsetDateTime;
use uuid::Uuid;

use lumen_domain::{
	day::TimeRange,
	insight::{DailyInsight, Narrative},
	records::{LabReport, NutritionLog, SymptomLog, UserProfile},
};

use crate::{
	Result,
	db::Db,
	models::{DailyInsightRow, LabReportRow, NutritionLogRow, SymptomLogRow, UserProfileRow},
};

const INSIGHT_COLUMNS: &str = "\
user_id,
	day_start,
	status,
	inputs_updated_at,
	computed_at,
	version,
	nutrition,
	symptoms,
	labs,
	errors,
	narrative,
	created_at,
	updated_at";

pub async fn get_profile(db: &Db, user_id: Uuid) -> Result<Option<UserProfile>> {
	let row: Option<UserProfileRow> = sqlx::query_as(
		"\
SELECT user_id, profile, created_at, updated_at
FROM user_profiles
WHERE user_id = $1",
	)
	.bind(user_id)
	.fetch_optional(&db.pool)
	.await?;

	row.map(UserProfileRow::into_domain).transpose()
}

pub async fn upsert_profile(db: &Db, profile: &UserProfile, now: OffsetDateTime) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO user_profiles (user_id, profile, created_at, updated_at)
VALUES ($1, $2, $3, $3)
ON CONFLICT (user_id) DO UPDATE
SET
	profile = EXCLUDED.profile,
	updated_at = EXCLUDED.updated_at",
	)
	.bind(profile.user_id)
	.bind(serde_json::to_value(profile)?)
	.bind(now)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// The most recently edited log in `range`, if any.
pub async fn find_nutrition_log(
	db: &Db,
	user_id: Uuid,
	range: TimeRange,
) -> Result<Option<NutritionLog>> {
	let row: Option<NutritionLogRow> = sqlx::query_as(
		"\
SELECT
	log_id,
	user_id,
	logged_at,
	meals,
	water_intake_ml,
	daily_totals,
	notes,
	created_at,
	updated_at
FROM nutrition_logs
WHERE user_id = $1 AND logged_at >= $2 AND logged_at < $3
ORDER BY updated_at DESC, log_id ASC
LIMIT 1",
	)
	.bind(user_id)
	.bind(range.start)
	.bind(range.end)
	.fetch_optional(&db.pool)
	.await?;

	row.map(NutritionLogRow::into_domain).transpose()
}

pub async fn latest_nutrition_update(
	db: &Db,
	user_id: Uuid,
	range: TimeRange,
) -> Result<Option<OffsetDateTime>> {
	let latest: Option<OffsetDateTime> = sqlx::query_scalar(
		"\
SELECT max(updated_at)
FROM nutrition_logs
WHERE user_id = $1 AND logged_at >= $2 AND logged_at < $3",
	)
	.bind(user_id)
	.bind(range.start)
	.bind(range.end)
	.fetch_one(&db.pool)
	.await?;

	Ok(latest)
}

pub async fn insert_nutrition_log(db: &Db, log: &NutritionLog) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO nutrition_logs (
	log_id,
	user_id,
	logged_at,
	meals,
	water_intake_ml,
	daily_totals,
	notes,
	created_at,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
	)
	.bind(log.log_id)
	.bind(log.user_id)
	.bind(log.logged_at)
	.bind(serde_json::to_value(&log.meals)?)
	.bind(log.water_intake_ml)
	.bind(serde_json::to_value(&log.daily_totals)?)
	.bind(log.notes.as_deref())
	.bind(log.created_at)
	.bind(log.updated_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Newest first by `logged_at`.
pub async fn list_symptoms(
	db: &Db,
	user_id: Uuid,
	range: TimeRange,
	limit: i64,
) -> Result<Vec<SymptomLog>> {
	let rows: Vec<SymptomLogRow> = sqlx::query_as(
		"\
SELECT
	symptom_id,
	user_id,
	logged_at,
	symptom_name,
	severity,
	notes,
	tags,
	created_at,
	updated_at
FROM symptom_logs
WHERE user_id = $1 AND logged_at >= $2 AND logged_at < $3
ORDER BY logged_at DESC, symptom_id ASC
LIMIT $4",
	)
	.bind(user_id)
	.bind(range.start)
	.bind(range.end)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows.into_iter().map(SymptomLog::from).collect())
}

pub async fn latest_symptom_update(
	db: &Db,
	user_id: Uuid,
	range: TimeRange,
) -> Result<Option<OffsetDateTime>> {
	let latest: Option<OffsetDateTime> = sqlx::query_scalar(
		"\
SELECT max(updated_at)
FROM symptom_logs
WHERE user_id = $1 AND logged_at >= $2 AND logged_at < $3",
	)
	.bind(user_id)
	.bind(range.start)
	.bind(range.end)
	.fetch_one(&db.pool)
	.await?;

	Ok(latest)
}

pub async fn insert_symptom(db: &Db, symptom: &SymptomLog) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO symptom_logs (
	symptom_id,
	user_id,
	logged_at,
	symptom_name,
	severity,
	notes,
	tags,
	created_at,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
	)
	.bind(symptom.symptom_id)
	.bind(symptom.user_id)
	.bind(symptom.logged_at)
	.bind(symptom.symptom_name.as_str())
	.bind(symptom.severity)
	.bind(symptom.notes.as_str())
	.bind(&symptom.tags)
	.bind(symptom.created_at)
	.bind(symptom.updated_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Newest first by `reported_at`.
pub async fn list_labs(
	db: &Db,
	user_id: Uuid,
	range: TimeRange,
	limit: i64,
) -> Result<Vec<LabReport>> {
	let rows: Vec<LabReportRow> = sqlx::query_as(
		"\
SELECT
	report_id,
	user_id,
	reported_at,
	panel_name,
	results,
	source,
	notes,
	created_at,
	updated_at
FROM lab_reports
WHERE user_id = $1 AND reported_at >= $2 AND reported_at < $3
ORDER BY reported_at DESC, report_id ASC
LIMIT $4",
	)
	.bind(user_id)
	.bind(range.start)
	.bind(range.end)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	rows.into_iter().map(LabReportRow::into_domain).collect()
}

pub async fn latest_lab_update(
	db: &Db,
	user_id: Uuid,
	range: TimeRange,
) -> Result<Option<OffsetDateTime>> {
	let latest: Option<OffsetDateTime> = sqlx::query_scalar(
		"\
SELECT max(updated_at)
FROM lab_reports
WHERE user_id = $1 AND reported_at >= $2 AND reported_at < $3",
	)
	.bind(user_id)
	.bind(range.start)
	.bind(range.end)
	.fetch_one(&db.pool)
	.await?;

	Ok(latest)
}

pub async fn insert_lab(db: &Db, report: &LabReport) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO lab_reports (
	report_id,
	user_id,
	reported_at,
	panel_name,
	results,
	source,
	notes,
	created_at,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
	)
	.bind(report.report_id)
	.bind(report.user_id)
	.bind(report.reported_at)
	.bind(report.panel_name.as_str())
	.bind(serde_json::to_value(&report.results)?)
	.bind(report.source.as_str())
	.bind(report.notes.as_str())
	.bind(report.created_at)
	.bind(report.updated_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn find_insight(
	db: &Db,
	user_id: Uuid,
	day_start: OffsetDateTime,
) -> Result<Option<DailyInsight>> {
	let sql = format!(
		"\
SELECT
	{INSIGHT_COLUMNS}
FROM daily_insights
WHERE user_id = $1 AND day_start = $2"
	);
	let row: Option<DailyInsightRow> =
		sqlx::query_as(&sql).bind(user_id).bind(day_start).fetch_optional(&db.pool).await?;

	row.map(DailyInsightRow::into_domain).transpose()
}

/// Replaces every computed column for `(user_id, day_start)`. The narrative column is left as is,
/// so a concurrent narrative write is never lost.
pub async fn upsert_insight(db: &Db, doc: &DailyInsight) -> Result<DailyInsight> {
	let sql = format!(
		"\
INSERT INTO daily_insights (
	user_id,
	day_start,
	status,
	inputs_updated_at,
	computed_at,
	version,
	nutrition,
	symptoms,
	labs,
	errors,
	created_at,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $5, $5)
ON CONFLICT (user_id, day_start) DO UPDATE
SET
	status = EXCLUDED.status,
	inputs_updated_at = EXCLUDED.inputs_updated_at,
	computed_at = EXCLUDED.computed_at,
	version = EXCLUDED.version,
	nutrition = EXCLUDED.nutrition,
	symptoms = EXCLUDED.symptoms,
	labs = EXCLUDED.labs,
	errors = EXCLUDED.errors,
	updated_at = EXCLUDED.updated_at
RETURNING
	{INSIGHT_COLUMNS}"
	);
	let row: DailyInsightRow = sqlx::query_as(&sql)
		.bind(doc.user_id)
		.bind(doc.day)
		.bind(doc.status.as_str())
		.bind(doc.inputs_updated_at)
		.bind(doc.computed_at)
		.bind(doc.version)
		.bind(serde_json::to_value(&doc.nutrition)?)
		.bind(serde_json::to_value(&doc.symptoms)?)
		.bind(serde_json::to_value(&doc.labs)?)
		.bind(serde_json::to_value(&doc.errors)?)
		.fetch_one(&db.pool)
		.await?;

	row.into_domain()
}

/// Writes only the narrative column. `None` when no document exists for the day.
pub async fn set_narrative(
	db: &Db,
	user_id: Uuid,
	day_start: OffsetDateTime,
	narrative: &Narrative,
) -> Result<Option<DailyInsight>> {
	let sql = format!(
		"\
UPDATE daily_insights
SET narrative = $3, updated_at = $4
WHERE user_id = $1 AND day_start = $2
RETURNING
	{INSIGHT_COLUMNS}"
	);
	let row: Option<DailyInsightRow> = sqlx::query_as(&sql)
		.bind(user_id)
		.bind(day_start)
		.bind(serde_json::to_value(narrative)?)
		.bind(narrative.updated_at)
		.fetch_optional(&db.pool)
		.await?;

	row.map(DailyInsightRow::into_domain).transpose()
}
