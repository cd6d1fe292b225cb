use crate::domain::model::RosterEntry;

/// A query that resolved to exactly one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStudent {
    pub query: String,
    pub entry: RosterEntry,
}

/// A query whose name matched several students.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousQuery {
    pub query: String,
    pub candidates: Vec<RosterEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub resolved: Vec<ResolvedStudent>,
    pub unresolved: Vec<String>,
    pub ambiguous: Vec<AmbiguousQuery>,
}

impl Resolution {
    /// Students to extend, in query order, each at most once.
    pub fn students(&self) -> Vec<RosterEntry> {
        let mut seen = std::collections::HashSet::new();
        self.resolved
            .iter()
            .filter(|r| seen.insert(r.entry.email.to_lowercase()))
            .map(|r| r.entry.clone())
            .collect()
    }

    /// Records an operator's pick for an ambiguous query.
    pub fn choose(&mut self, query: &str, entry: RosterEntry) {
        self.ambiguous.retain(|a| a.query != query);
        self.resolved.push(ResolvedStudent {
            query: query.to_string(),
            entry: entry.addressed_as(query),
        });
    }
}

/// Outcome of matching one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match<'a> {
    Found(&'a RosterEntry),
    NotFound,
    Ambiguous(Vec<&'a RosterEntry>),
}

/// Matches queries against a cached roster.
///
/// Order of precedence for each query: exact email, exact full name, then
/// case-insensitive substring of the name. Comparisons ignore case.
pub struct RosterResolver<'a> {
    roster: &'a [RosterEntry],
}

impl<'a> RosterResolver<'a> {
    pub fn new(roster: &'a [RosterEntry]) -> Self {
        Self { roster }
    }

    pub fn match_query(&self, query: &str) -> Match<'a> {
        let query = query.trim();
        if query.is_empty() {
            return Match::NotFound;
        }

        if let Some(entry) = self
            .roster
            .iter()
            .find(|e| e.emails().any(|email| email.eq_ignore_ascii_case(query)))
        {
            return Match::Found(entry);
        }

        let needle = query.to_lowercase();

        let exact: Vec<&RosterEntry> = self
            .roster
            .iter()
            .filter(|e| e.name.trim().to_lowercase() == needle)
            .collect();
        if let [entry] = exact.as_slice() {
            return Match::Found(*entry);
        }

        let mut partial: Vec<&RosterEntry> = Vec::new();
        for entry in self.roster {
            if entry.name.to_lowercase().contains(&needle)
                && !partial.iter().any(|p| p.email.eq_ignore_ascii_case(&entry.email))
            {
                partial.push(entry);
            }
        }

        match partial.len() {
            0 => Match::NotFound,
            1 => Match::Found(partial[0]),
            _ => Match::Ambiguous(partial),
        }
    }

    pub fn resolve<S: AsRef<str>>(&self, queries: &[S]) -> Resolution {
        let mut resolution = Resolution::default();

        for query in queries {
            let query = query.as_ref();
            match self.match_query(query) {
                Match::Found(entry) => {
                    tracing::debug!("Resolved '{}' to {}", query, entry);
                    // 多個地址時只保留查到的那一個
                    resolution.resolved.push(ResolvedStudent {
                        query: query.to_string(),
                        entry: entry.addressed_as(query),
                    });
                }
                Match::NotFound => {
                    tracing::warn!("{}: could not find in the roster", query);
                    resolution.unresolved.push(query.to_string());
                }
                Match::Ambiguous(candidates) => {
                    tracing::warn!("{}: {} students match", query, candidates.len());
                    resolution.ambiguous.push(AmbiguousQuery {
                        query: query.to_string(),
                        candidates: candidates.into_iter().cloned().collect(),
                    });
                }
            }
        }

        resolution
    }
}
