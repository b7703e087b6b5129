//! Narrative context, hashing, and prompt assembly. The context is the only thing the generator
//! ever sees, so it is also what the cache hash covers.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::{OffsetDateTime, UtcOffset};

use crate::{
	insight::DailyInsight,
	meal_signals::MealSignals,
	summary::{DiseaseSummaryEntry, InteractionSummary, UncertaintySummary},
};

pub const MAX_NARRATIVE_LINES: usize = 8;
pub const MAX_HISTORY_MESSAGES: usize = 12;
pub const SYSTEM_PROMPT: &str = concat!(
	"You are the Lumen daily insight narrator. ",
	"Use only the structured signals you are given. Do not invent facts or nutrient numbers. ",
	"Do not diagnose and do not give treatment or medication advice. ",
	"Symptoms and labs are time-adjacent context only; never imply that food caused them. ",
	"Be uncertainty-aware and hedge when confidence is limited. ",
	"Reply in plain text, concise, at most 8 lines: ",
	"one short summary sentence, then 2-4 lines starting with a hyphen."
);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
	System,
	User,
	Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
	pub role: ChatRole,
	pub content: String,
}
impl ChatMessage {
	pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
		Self { role, content: content.into() }
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreviewLimits {
	pub symptoms: usize,
	pub labs: usize,
	pub disease: usize,
}
impl Default for PreviewLimits {
	fn default() -> Self {
		Self { symptoms: 5, labs: 5, disease: 3 }
	}
}

/// Field order here is the serialized order, which keeps the hash stable.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NarrativeContext {
	pub date: String,
	pub totals: ContextTotals,
	pub meal_signals: MealSignals,
	pub bullets: Vec<String>,
	pub interaction_summary: InteractionSummary,
	pub disease_summary: Vec<DiseaseSummaryEntry>,
	pub uncertainty_summary: Option<UncertaintySummary>,
	pub evidence_windows: EvidenceWindows,
	pub top_symptoms: Vec<SymptomPreview>,
	pub top_labs: Vec<LabPreview>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContextTotals {
	pub calories: f64,
	pub protein: f64,
	pub carbs: f64,
	pub fat: f64,
	pub fiber: f64,
	pub sugar: f64,
	pub sodium: f64,
	pub water_ml: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EvidenceWindows {
	pub symptoms_window_days: u32,
	pub symptoms_count: usize,
	pub labs_window_days: u32,
	pub labs_count: usize,
}

/// Date, name, and severity only.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SymptomPreview {
	pub date: String,
	pub symptom_name: String,
	pub severity: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabPreview {
	pub date: String,
	pub panel_name: String,
}

impl NarrativeContext {
	/// `offset` turns stored instants back into the user's calendar dates.
	pub fn from_insight(doc: &DailyInsight, offset: UtcOffset, limits: PreviewLimits) -> Self {
		let nutrition = &doc.nutrition;
		let totals = &nutrition.daily_totals;
		let aggregate = &nutrition.aggregate;

		Self {
			date: calendar_date(doc.day, offset),
			totals: ContextTotals {
				calories: totals.calories,
				protein: totals.protein,
				carbs: totals.carbs,
				fat: totals.fat,
				fiber: totals.fiber,
				sugar: totals.sugar,
				sodium: totals.sodium,
				water_ml: nutrition.water_intake_ml,
			},
			meal_signals: aggregate.meal_signals.clone(),
			bullets: nutrition.bullets.iter().take(crate::bullets::MAX_BULLETS).cloned().collect(),
			interaction_summary: aggregate.interactions.clone(),
			disease_summary: aggregate.disease.iter().take(limits.disease).cloned().collect(),
			uncertainty_summary: aggregate.uncertainty.clone(),
			evidence_windows: EvidenceWindows {
				symptoms_window_days: doc.symptoms.window_days,
				symptoms_count: doc.symptoms.items.len(),
				labs_window_days: doc.labs.window_days,
				labs_count: doc.labs.items.len(),
			},
			top_symptoms: doc
				.symptoms
				.items
				.iter()
				.take(limits.symptoms)
				.map(|symptom| SymptomPreview {
					date: calendar_date(symptom.logged_at, offset),
					symptom_name: symptom.symptom_name.clone(),
					severity: symptom.severity,
				})
				.collect(),
			top_labs: doc
				.labs
				.items
				.iter()
				.take(limits.labs)
				.map(|lab| LabPreview {
					date: calendar_date(lab.reported_at, offset),
					panel_name: lab.panel_name.clone(),
				})
				.collect(),
		}
	}

	pub fn canonical_json(&self) -> serde_json::Result<String> {
		serde_json::to_string(self)
	}

	pub fn content_hash(&self) -> serde_json::Result<String> {
		Ok(sha256_hex(self.canonical_json()?.as_bytes()))
	}
}

pub fn sha256_hex(bytes: &[u8]) -> String {
	hex::encode(Sha256::digest(bytes))
}

pub fn user_message(context_json: &str) -> String {
	[
		"Write a brief daily nutrition insight based on the signals below.",
		"If you mention symptoms or labs, frame them as \"around this time\" context only (not caused by food).",
		"If data is sparse, say so and suggest what to track next (1 sentence).",
		"",
		"SIGNALS_JSON:",
		context_json,
	]
	.join("\n")
}

/// System prompt, then at most the last `MAX_HISTORY_MESSAGES` user/assistant turns, then the
/// context message.
pub fn narrative_messages(context_json: &str, history: &[ChatMessage]) -> Vec<ChatMessage> {
	let turns: Vec<&ChatMessage> =
		history.iter().filter(|message| message.role != ChatRole::System).collect();
	let skip = turns.len().saturating_sub(MAX_HISTORY_MESSAGES);
	let mut messages = Vec::with_capacity(turns.len() - skip + 2);

	messages.push(ChatMessage::new(ChatRole::System, SYSTEM_PROMPT));
	messages.extend(turns.into_iter().skip(skip).cloned());
	messages.push(ChatMessage::new(ChatRole::User, user_message(context_json)));

	messages
}

/// Trims the reply and keeps at most `MAX_NARRATIVE_LINES` non-blank lines. Blank replies yield
/// `None`.
pub fn clean_reply(reply: &str) -> Option<String> {
	let lines: Vec<&str> = reply
		.trim()
		.lines()
		.map(str::trim_end)
		.filter(|line| !line.trim().is_empty())
		.take(MAX_NARRATIVE_LINES)
		.collect();

	(!lines.is_empty()).then(|| lines.join("\n"))
}

fn calendar_date(at: OffsetDateTime, offset: UtcOffset) -> String {
	let date = at.to_offset(offset).date();

	format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}
