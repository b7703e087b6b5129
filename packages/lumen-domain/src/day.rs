use serde::{Deserialize, Serialize};
use time::{
	Date, Duration, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
	format_description::well_known::Rfc3339, macros::format_description,
};

pub type Result<T, E = DayError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum DayError {
	#[error("Invalid date {input:?}.")]
	InvalidDate { input: String },
}

/// Half-open instant range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
	#[serde(with = "time::serde::rfc3339")]
	pub start: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub end: OffsetDateTime,
}
impl TimeRange {
	pub fn contains(&self, at: OffsetDateTime) -> bool {
		at >= self.start && at < self.end
	}

	fn widen(&self, days: u32) -> Option<Self> {
		let pad = Duration::days(i64::from(days));

		Some(Self { start: self.start.checked_sub(pad)?, end: self.end.checked_add(pad)? })
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayWindow {
	pub day: TimeRange,
	pub symptom_window_days: u32,
	pub lab_window_days: u32,
	pub symptoms: TimeRange,
	pub labs: TimeRange,
}
impl DayWindow {
	pub fn start(&self) -> OffsetDateTime {
		self.day.start
	}

	/// Same calendar day with different lookaround windows.
	pub fn with_windows(&self, symptom_window_days: u32, lab_window_days: u32) -> Result<Self> {
		build_window(self.day, symptom_window_days, lab_window_days)
	}
}

pub fn resolve_day(
	input: Option<&str>,
	offset: UtcOffset,
	now: OffsetDateTime,
	symptom_window_days: u32,
	lab_window_days: u32,
) -> Result<DayWindow> {
	let instant = parse_instant(input, offset, now)?;

	day_window(instant, offset, symptom_window_days, lab_window_days)
}

/// Parses RFC 3339 timestamps, bare `YYYY-MM-DD` dates, and offset-less date-times. Values without
/// an offset are read in `offset`. Missing or blank input means `now`.
pub fn parse_instant(
	input: Option<&str>,
	offset: UtcOffset,
	now: OffsetDateTime,
) -> Result<OffsetDateTime> {
	let Some(raw) = input.map(str::trim).filter(|raw| !raw.is_empty()) else {
		return Ok(now);
	};

	if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
		return Ok(instant);
	}
	if let Ok(date) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
		return Ok(PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_offset(offset));
	}

	let local_formats = [
		format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
		format_description!("[year]-[month]-[day]T[hour]:[minute]"),
		format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
	];

	for format in local_formats {
		if let Ok(local) = PrimitiveDateTime::parse(raw, format) {
			return Ok(local.assume_offset(offset));
		}
	}

	Err(DayError::InvalidDate { input: raw.to_string() })
}

pub fn day_window(
	instant: OffsetDateTime,
	offset: UtcOffset,
	symptom_window_days: u32,
	lab_window_days: u32,
) -> Result<DayWindow> {
	let start = instant.to_offset(offset).replace_time(Time::MIDNIGHT);
	let end = start
		.checked_add(Duration::days(1))
		.ok_or_else(|| DayError::InvalidDate { input: instant.to_string() })?;

	build_window(TimeRange { start, end }, symptom_window_days, lab_window_days)
}

fn build_window(day: TimeRange, symptom_window_days: u32, lab_window_days: u32) -> Result<DayWindow> {
	let out_of_range = || DayError::InvalidDate { input: day.start.to_string() };
	let symptoms = day.widen(symptom_window_days).ok_or_else(out_of_range)?;
	let labs = day.widen(lab_window_days).ok_or_else(out_of_range)?;

	Ok(DayWindow { day, symptom_window_days, lab_window_days, symptoms, labs })
}
