use crate::domain::model::RosterEntry;
use crate::utils::error::{GsError, Result};
use std::io::Read;
use std::path::Path;

/// Turns "Last, First" into "First Last"; other names pass through trimmed.
pub fn normalize_name(raw: &str) -> String {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [last, first, ..] if !first.is_empty() => format!("{} {}", first, last),
        _ => raw.replace(',', " ").trim().to_string(),
    }
}

fn find_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim().to_lowercase();
        candidates.iter().any(|c| h == *c)
    })
}

/// Reads a roster CSV exported from Gradescope (`Name, SID, Email, Role, ...`) or
/// Piazza (`name, email, role`). Columns are located by header; only rows whose
/// role is `Student` are kept.
pub fn read_roster_csv<R: Read>(reader: R) -> Result<Vec<RosterEntry>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let name_col = find_column(&headers, &["name", "full name", "student name"]).ok_or_else(
        || GsError::parse("roster CSV", "no name column in header"),
    )?;
    let email_col = find_column(&headers, &["email", "email address"])
        .ok_or_else(|| GsError::parse("roster CSV", "no email column in header"))?;
    let role_col = find_column(&headers, &["role"]);

    let mut roster = Vec::new();
    let mut skipped = 0usize;

    for record in csv_reader.records() {
        let record = record?;

        if let Some(role_col) = role_col {
            let role = record.get(role_col).unwrap_or_default();
            if !role.eq_ignore_ascii_case("student") {
                skipped += 1;
                continue;
            }
        }

        let name = record.get(name_col).unwrap_or_default();
        let email = record.get(email_col).unwrap_or_default();
        if name.is_empty() || email.is_empty() {
            tracing::warn!("Skipping roster row without name or email: {:?}", record);
            skipped += 1;
            continue;
        }

        roster.push(RosterEntry::new(normalize_name(name), email));
    }

    tracing::debug!(
        "Read {} students from roster CSV ({} rows skipped)",
        roster.len(),
        skipped
    );
    Ok(roster)
}

pub fn read_roster_file(path: &Path) -> Result<Vec<RosterEntry>> {
    let file = std::fs::File::open(path)?;
    read_roster_csv(file)
}
