mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Insights, LlmProviderConfig, Narrative, Postgres, ProviderConfig, Providers, Service,
	Storage,
};

use std::{fs, path::Path};

/// The narrative call runs inside a user request, so it must stay within a few seconds.
pub const MAX_NARRATIVE_TIMEOUT_MS: u64 = 10_000;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	cfg.service.utc_offset()?;

	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	for (label, value) in [
		("insights.symptom_limit", cfg.insights.symptom_limit),
		("insights.lab_limit", cfg.insights.lab_limit),
		("insights.max_food_snapshots", cfg.insights.max_food_snapshots),
		("insights.analyzer_concurrency", cfg.insights.analyzer_concurrency),
		("insights.store_read_attempts", cfg.insights.store_read_attempts),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	for (label, value) in [
		("insights.store_timeout_ms", cfg.insights.store_timeout_ms),
		("providers.food_analyzer.timeout_ms", cfg.providers.food_analyzer.timeout_ms),
		("providers.narrative.timeout_ms", cfg.providers.narrative.timeout_ms),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if cfg.providers.narrative.timeout_ms > MAX_NARRATIVE_TIMEOUT_MS {
		return Err(Error::Validation {
			message: format!(
				"providers.narrative.timeout_ms must be at most {MAX_NARRATIVE_TIMEOUT_MS}."
			),
		});
	}

	if cfg.providers.food_analyzer.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.food_analyzer.api_base must be non-empty.".to_string(),
		});
	}

	if cfg.narrative.enabled {
		let narrative = &cfg.providers.narrative;

		for (label, value) in [
			("providers.narrative.api_base", &narrative.api_base),
			("providers.narrative.api_key", &narrative.api_key),
			("providers.narrative.model", &narrative.model),
		] {
			if value.trim().is_empty() {
				return Err(Error::Validation {
					message: format!("{label} must be non-empty when narrative.enabled is true."),
				});
			}
		}

		if !narrative.temperature.is_finite() || narrative.temperature < 0.0 {
			return Err(Error::Validation {
				message: "providers.narrative.temperature must be a finite number zero or greater."
					.to_string(),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.service.utc_offset.trim().is_empty() {
		cfg.service.utc_offset = "+00:00".to_string();
	}
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}

	cfg.providers.food_analyzer.api_base =
		cfg.providers.food_analyzer.api_base.trim_end_matches('/').to_string();
	cfg.providers.narrative.api_base =
		cfg.providers.narrative.api_base.trim_end_matches('/').to_string();
}
