use serde_json::Value;

use lumen_config::LlmProviderConfig;
use lumen_domain::narrative::ChatMessage;

use crate::Result;

const MAX_TOKENS: u32 = 350;

/// Sends an OpenAI-compatible chat completion. A reply with no usable text is `None`, not an error.
pub async fn generate(cfg: &LlmProviderConfig, messages: &[ChatMessage]) -> Result<Option<String>> {
	let client = crate::client(cfg.timeout_ms)?;
	let url = crate::endpoint(&cfg.api_base, &cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": MAX_TOKENS,
		"messages": messages,
	});
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let content = parse_chat_content(&json);

	if content.is_none() {
		tracing::debug!(provider_id = %cfg.provider_id, "Chat completion returned no content.");
	}

	Ok(content)
}

fn parse_chat_content(json: &Value) -> Option<String> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.map(str::trim)
		.filter(|text| !text.is_empty())
		.map(str::to_string)
}
