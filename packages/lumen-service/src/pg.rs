//! Postgres-backed stores.

use time::OffsetDateTime;
use uuid::Uuid;

use lumen_domain::{
	day::TimeRange,
	insight::{DailyInsight, Narrative},
	records::{LabReport, NutritionLog, SymptomLog, UserProfile},
};
use lumen_storage::{db::Db, queries};

use crate::{
	BoxFuture, InsightStore, LabReportStore, NutritionLogStore, Result, SymptomLogStore,
	UserProfileStore,
};

pub struct PgStore {
	db: Db,
}
impl PgStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}

impl UserProfileStore for PgStore {
	fn get_profile<'a>(&'a self, user_id: Uuid) -> BoxFuture<'a, Result<Option<UserProfile>>> {
		Box::pin(async move { Ok(queries::get_profile(&self.db, user_id).await?) })
	}
}

impl NutritionLogStore for PgStore {
	fn find_log<'a>(
		&'a self,
		user_id: Uuid,
		range: TimeRange,
	) -> BoxFuture<'a, Result<Option<NutritionLog>>> {
		Box::pin(async move { Ok(queries::find_nutrition_log(&self.db, user_id, range).await?) })
	}

	fn latest_log_update<'a>(
		&'a self,
		user_id: Uuid,
		range: TimeRange,
	) -> BoxFuture<'a, Result<Option<OffsetDateTime>>> {
		Box::pin(async move { Ok(queries::latest_nutrition_update(&self.db, user_id, range).await?) })
	}
}

impl SymptomLogStore for PgStore {
	fn list_symptoms<'a>(
		&'a self,
		user_id: Uuid,
		range: TimeRange,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<SymptomLog>>> {
		Box::pin(async move {
			Ok(queries::list_symptoms(&self.db, user_id, range, i64::from(limit)).await?)
		})
	}

	fn latest_symptom_update<'a>(
		&'a self,
		user_id: Uuid,
		range: TimeRange,
	) -> BoxFuture<'a, Result<Option<OffsetDateTime>>> {
		Box::pin(async move { Ok(queries::latest_symptom_update(&self.db, user_id, range).await?) })
	}
}

impl LabReportStore for PgStore {
	fn list_labs<'a>(
		&'a self,
		user_id: Uuid,
		range: TimeRange,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<LabReport>>> {
		Box::pin(async move { Ok(queries::list_labs(&self.db, user_id, range, i64::from(limit)).await?) })
	}

	fn latest_lab_update<'a>(
		&'a self,
		user_id: Uuid,
		range: TimeRange,
	) -> BoxFuture<'a, Result<Option<OffsetDateTime>>> {
		Box::pin(async move { Ok(queries::latest_lab_update(&self.db, user_id, range).await?) })
	}
}

impl InsightStore for PgStore {
	fn find_insight<'a>(
		&'a self,
		user_id: Uuid,
		day: OffsetDateTime,
	) -> BoxFuture<'a, Result<Option<DailyInsight>>> {
		Box::pin(async move { Ok(queries::find_insight(&self.db, user_id, day).await?) })
	}

	fn upsert_insight<'a>(&'a self, doc: &'a DailyInsight) -> BoxFuture<'a, Result<DailyInsight>> {
		Box::pin(async move { Ok(queries::upsert_insight(&self.db, doc).await?) })
	}

	fn set_narrative<'a>(
		&'a self,
		user_id: Uuid,
		day: OffsetDateTime,
		narrative: &'a Narrative,
	) -> BoxFuture<'a, Result<Option<DailyInsight>>> {
		Box::pin(async move { Ok(queries::set_narrative(&self.db, user_id, day, narrative).await?) })
	}
}
