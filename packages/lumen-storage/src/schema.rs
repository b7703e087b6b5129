pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_user_profiles.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_user_profiles.sql")),
				"tables/002_nutrition_logs.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_nutrition_logs.sql")),
				"tables/003_symptom_logs.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_symptom_logs.sql")),
				"tables/004_lab_reports.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_lab_reports.sql")),
				"tables/005_daily_insights.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_daily_insights.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
