use serde::Deserialize;
use serde_json::{Map, Value};
use time::{UtcOffset, macros::format_description};

use crate::{Error, Result};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub insights: Insights,
	#[serde(default)]
	pub narrative: Narrative,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Fixed offset that defines "local midnight" for day boundaries, e.g. "+00:00" or "-05:00".
	#[serde(default = "default_utc_offset")]
	pub utc_offset: String,
}
impl Service {
	pub fn utc_offset(&self) -> Result<UtcOffset> {
		parse_utc_offset(&self.utc_offset)
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Providers {
	pub food_analyzer: ProviderConfig,
	pub narrative: LlmProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	/// Kept short; the narrative is optional and must never hold up the numeric insight.
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Insights {
	#[serde(default = "default_symptom_window_days")]
	pub symptom_window_days: u32,
	#[serde(default = "default_lab_window_days")]
	pub lab_window_days: u32,
	#[serde(default = "default_symptom_limit")]
	pub symptom_limit: u32,
	#[serde(default = "default_lab_limit")]
	pub lab_limit: u32,
	#[serde(default = "default_max_food_snapshots")]
	pub max_food_snapshots: u32,
	#[serde(default = "default_analyzer_concurrency")]
	pub analyzer_concurrency: u32,
	#[serde(default = "default_store_timeout_ms")]
	pub store_timeout_ms: u64,
	/// Total attempts per store read, including the first one.
	#[serde(default = "default_store_read_attempts")]
	pub store_read_attempts: u32,
}
impl Default for Insights {
	fn default() -> Self {
		Self {
			symptom_window_days: default_symptom_window_days(),
			lab_window_days: default_lab_window_days(),
			symptom_limit: default_symptom_limit(),
			lab_limit: default_lab_limit(),
			max_food_snapshots: default_max_food_snapshots(),
			analyzer_concurrency: default_analyzer_concurrency(),
			store_timeout_ms: default_store_timeout_ms(),
			store_read_attempts: default_store_read_attempts(),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct Narrative {
	#[serde(default)]
	pub enabled: bool,
	#[serde(default = "default_symptom_preview")]
	pub symptom_preview: u32,
	#[serde(default = "default_lab_preview")]
	pub lab_preview: u32,
	#[serde(default = "default_disease_preview")]
	pub disease_preview: u32,
}
impl Default for Narrative {
	fn default() -> Self {
		Self {
			enabled: false,
			symptom_preview: default_symptom_preview(),
			lab_preview: default_lab_preview(),
			disease_preview: default_disease_preview(),
		}
	}
}

pub(crate) fn parse_utc_offset(raw: &str) -> Result<UtcOffset> {
	let format = format_description!("[offset_hour sign:mandatory]:[offset_minute]");

	UtcOffset::parse(raw.trim(), format)
		.map_err(|_| Error::InvalidUtcOffset { value: raw.to_string() })
}

fn default_utc_offset() -> String {
	"+00:00".to_string()
}

fn default_symptom_window_days() -> u32 {
	2
}

fn default_lab_window_days() -> u32 {
	14
}

fn default_symptom_limit() -> u32 {
	50
}

fn default_lab_limit() -> u32 {
	20
}

fn default_max_food_snapshots() -> u32 {
	25
}

fn default_analyzer_concurrency() -> u32 {
	4
}

fn default_store_timeout_ms() -> u64 {
	5_000
}

fn default_store_read_attempts() -> u32 {
	2
}

fn default_symptom_preview() -> u32 {
	5
}

fn default_lab_preview() -> u32 {
	5
}

fn default_disease_preview() -> u32 {
	3
}
