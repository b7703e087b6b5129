use std::sync::Arc;

use lumen_config::Config;
use lumen_service::LumenService;
use lumen_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<LumenService>,
}
impl AppState {
	/// Connects to Postgres, applies the schema, and wires the HTTP-backed providers.
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let service = LumenService::new(config, db)?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: LumenService) -> Self {
		Self { service: Arc::new(service) }
	}
}
