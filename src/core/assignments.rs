use crate::domain::model::Assignment;

/// Assignments picked for a run, plus the queries that matched nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentSelection {
    pub matched: Vec<Assignment>,
    pub unmatched: Vec<String>,
}

/// Assignments selected by one query.
///
/// An exact (case-insensitive) title match wins. Otherwise every assignment whose
/// title contains the query is returned, so `hw1` also picks up `hw1-makeup`.
pub fn filter_assignments<'a>(query: &str, assignments: &'a [Assignment]) -> Vec<&'a Assignment> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let exact: Vec<&Assignment> = assignments
        .iter()
        .filter(|a| a.title.trim().to_lowercase() == needle)
        .collect();
    if !exact.is_empty() {
        return exact;
    }

    titles_containing(&needle, assignments)
}

/// Every assignment whose title contains `query`, ignoring case.
pub fn titles_containing<'a>(query: &str, assignments: &'a [Assignment]) -> Vec<&'a Assignment> {
    let needle = query.trim().to_lowercase();
    assignments
        .iter()
        .filter(|a| a.title.to_lowercase().contains(&needle))
        .collect()
}

/// Runs every query and merges the matches, keeping platform order and dropping
/// assignments selected by more than one query.
pub fn select_assignments<S: AsRef<str>>(
    queries: &[S],
    assignments: &[Assignment],
) -> AssignmentSelection {
    let mut selected = vec![false; assignments.len()];
    let mut unmatched = Vec::new();

    for query in queries {
        let query = query.as_ref();
        let matches = filter_assignments(query, assignments);
        if matches.is_empty() {
            tracing::warn!("No assignment title matches '{}'", query);
            unmatched.push(query.to_string());
            continue;
        }

        tracing::debug!("'{}' matched {} assignment(s)", query, matches.len());
        for matched in matches {
            if let Some(ix) = assignments.iter().position(|a| a.id == matched.id) {
                selected[ix] = true;
            }
        }
    }

    AssignmentSelection {
        matched: assignments
            .iter()
            .zip(selected)
            .filter_map(|(a, keep)| keep.then(|| a.clone()))
            .collect(),
        unmatched,
    }
}
