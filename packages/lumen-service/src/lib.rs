pub mod aggregate;
pub mod food;
pub mod insight;
pub mod narrative;
pub mod pg;

mod error;

pub use error::{Error, Result};
pub use insight::{DailyInsightRequest, RecomputeRequest};

use std::{future::Future, pin::Pin, sync::Arc};

use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

use lumen_config::{Config, LlmProviderConfig, ProviderConfig};
use lumen_domain::{
	analysis::FoodAnalysis,
	day::TimeRange,
	insight::{DailyInsight, Narrative},
	narrative::ChatMessage,
	records::{LabReport, NutritionLog, SymptomLog, UserProfile},
};
use lumen_providers::{food_analyzer, narrative as narrative_provider};
use lumen_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait UserProfileStore
where
	Self: Send + Sync,
{
	fn get_profile<'a>(&'a self, user_id: Uuid) -> BoxFuture<'a, Result<Option<UserProfile>>>;
}

pub trait NutritionLogStore
where
	Self: Send + Sync,
{
	fn find_log<'a>(
		&'a self,
		user_id: Uuid,
		range: TimeRange,
	) -> BoxFuture<'a, Result<Option<NutritionLog>>>;

	fn latest_log_update<'a>(
		&'a self,
		user_id: Uuid,
		range: TimeRange,
	) -> BoxFuture<'a, Result<Option<OffsetDateTime>>>;
}

pub trait SymptomLogStore
where
	Self: Send + Sync,
{
	/// Newest first, at most `limit` entries.
	fn list_symptoms<'a>(
		&'a self,
		user_id: Uuid,
		range: TimeRange,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<SymptomLog>>>;

	fn latest_symptom_update<'a>(
		&'a self,
		user_id: Uuid,
		range: TimeRange,
	) -> BoxFuture<'a, Result<Option<OffsetDateTime>>>;
}

pub trait LabReportStore
where
	Self: Send + Sync,
{
	/// Newest first, at most `limit` entries.
	fn list_labs<'a>(
		&'a self,
		user_id: Uuid,
		range: TimeRange,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<LabReport>>>;

	fn latest_lab_update<'a>(
		&'a self,
		user_id: Uuid,
		range: TimeRange,
	) -> BoxFuture<'a, Result<Option<OffsetDateTime>>>;
}

pub trait InsightStore
where
	Self: Send + Sync,
{
	fn find_insight<'a>(
		&'a self,
		user_id: Uuid,
		day: OffsetDateTime,
	) -> BoxFuture<'a, Result<Option<DailyInsight>>>;

	/// Replaces the computed fields of the `(user_id, day)` document, creating it when missing. The
	/// stored narrative is never touched.
	fn upsert_insight<'a>(&'a self, doc: &'a DailyInsight) -> BoxFuture<'a, Result<DailyInsight>>;

	/// Writes only the narrative. `None` when no document exists.
	fn set_narrative<'a>(
		&'a self,
		user_id: Uuid,
		day: OffsetDateTime,
		narrative: &'a Narrative,
	) -> BoxFuture<'a, Result<Option<DailyInsight>>>;
}

pub trait FoodAnalyzer
where
	Self: Send + Sync,
{
	fn analyze<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		food_name: &'a str,
		profile: &'a UserProfile,
	) -> BoxFuture<'a, Result<FoodAnalysis>>;
}

pub trait NarrativeGenerator
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, Result<Option<String>>>;
}

#[derive(Clone)]
pub struct Stores {
	pub profiles: Arc<dyn UserProfileStore>,
	pub nutrition: Arc<dyn NutritionLogStore>,
	pub symptoms: Arc<dyn SymptomLogStore>,
	pub labs: Arc<dyn LabReportStore>,
	pub insights: Arc<dyn InsightStore>,
}
impl Stores {
	/// Every store backed by the same Postgres handle.
	pub fn postgres(db: Db) -> Self {
		let store = Arc::new(pg::PgStore::new(db));

		Self {
			profiles: store.clone(),
			nutrition: store.clone(),
			symptoms: store.clone(),
			labs: store.clone(),
			insights: store,
		}
	}
}

#[derive(Clone)]
pub struct Providers {
	pub food_analyzer: Arc<dyn FoodAnalyzer>,
	pub narrative: Arc<dyn NarrativeGenerator>,
}
impl Providers {
	pub fn new(food_analyzer: Arc<dyn FoodAnalyzer>, narrative: Arc<dyn NarrativeGenerator>) -> Self {
		Self { food_analyzer, narrative }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let providers = Arc::new(DefaultProviders);

		Self { food_analyzer: providers.clone(), narrative: providers }
	}
}

pub struct LumenService {
	pub cfg: Config,
	pub stores: Stores,
	pub providers: Providers,
	offset: UtcOffset,
}
impl LumenService {
	pub fn new(cfg: Config, db: Db) -> Result<Self> {
		Self::with_parts(cfg, Stores::postgres(db), Providers::default())
	}

	pub fn with_parts(cfg: Config, stores: Stores, providers: Providers) -> Result<Self> {
		let offset = cfg.service.utc_offset()?;

		Ok(Self { cfg, stores, providers, offset })
	}

	/// Offset that defines local midnight for every day this service resolves.
	pub fn utc_offset(&self) -> UtcOffset {
		self.offset
	}
}

struct DefaultProviders;

impl FoodAnalyzer for DefaultProviders {
	fn analyze<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		food_name: &'a str,
		profile: &'a UserProfile,
	) -> BoxFuture<'a, Result<FoodAnalysis>> {
		Box::pin(async move { Ok(food_analyzer::analyze(cfg, food_name, profile).await?) })
	}
}

impl NarrativeGenerator for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, Result<Option<String>>> {
		Box::pin(async move { Ok(narrative_provider::generate(cfg, messages).await?) })
	}
}
