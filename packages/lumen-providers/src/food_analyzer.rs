use serde_json::Value;

use lumen_config::ProviderConfig;
use lumen_domain::{analysis::FoodAnalysis, records::UserProfile};

use crate::{Error, Result};

/// Analyzes a single food name for `profile`. The analyzer's own LLM pass is always disabled here.
pub async fn analyze(
	cfg: &ProviderConfig,
	food_name: &str,
	profile: &UserProfile,
) -> Result<FoodAnalysis> {
	let client = crate::client(cfg.timeout_ms)?;
	let url = crate::endpoint(&cfg.api_base, &cfg.path);
	let body = serde_json::json!({
		"input": food_name,
		"profile": profile,
		"include_llm": false,
	});
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_analysis(json)
}

fn parse_analysis(json: Value) -> Result<FoodAnalysis> {
	let payload = match json {
		Value::Object(mut map) => match map.remove("analysis") {
			Some(inner @ Value::Object(_)) => inner,
			Some(_) | None => Value::Object(map),
		},
		_ => {
			return Err(Error::InvalidResponse {
				message: "Food analyzer response must be a JSON object.".to_string(),
			});
		},
	};

	Ok(serde_json::from_value(payload)?)
}
