use crate::core::assignments::AssignmentSelection;
use crate::core::roster::Resolution;
use crate::domain::model::{Assignment, ExtensionRequest, RosterEntry};
use crate::utils::error::GsError;
use std::fmt;

/// Something in a batch that did not go through. None of these stop the batch.
#[derive(Debug)]
pub enum BatchIssue {
    UnresolvedStudent {
        query: String,
    },
    AmbiguousStudent {
        query: String,
        candidates: Vec<RosterEntry>,
    },
    NoAssignmentMatch {
        query: String,
    },
    RemoteApplyError {
        student: RosterEntry,
        assignment: Assignment,
        error: GsError,
    },
}

impl fmt::Display for BatchIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchIssue::UnresolvedStudent { query } => {
                write!(f, "{}: could not find in the roster", query)
            }
            BatchIssue::AmbiguousStudent { query, candidates } => {
                let names: Vec<String> = candidates.iter().map(|c| c.to_string()).collect();
                write!(
                    f,
                    "{}: {} students match, skipped ({})",
                    query,
                    candidates.len(),
                    names.join("; ")
                )
            }
            BatchIssue::NoAssignmentMatch { query } => {
                write!(f, "{}: no assignment title matches", query)
            }
            BatchIssue::RemoteApplyError {
                student,
                assignment,
                error,
            } => write!(
                f,
                "{} on '{}' (assignment {}): {}",
                student, assignment.title, assignment.id, error
            ),
        }
    }
}

/// Result of one (student, assignment) pair.
#[derive(Debug)]
pub enum PairOutcome {
    Applied(ExtensionRequest),
    /// Dry run: would have been submitted.
    Planned(ExtensionRequest),
    Failed(ExtensionRequest),
}

impl PairOutcome {
    pub fn request(&self) -> &ExtensionRequest {
        match self {
            PairOutcome::Applied(r) | PairOutcome::Planned(r) | PairOutcome::Failed(r) => r,
        }
    }
}

/// Everything that happened during one `extend` run, printed once at the end.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<PairOutcome>,
    pub issues: Vec<BatchIssue>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the resolution problems of both lookups into the report.
    pub fn record_lookups(&mut self, resolution: &Resolution, selection: &AssignmentSelection) {
        for query in &resolution.unresolved {
            self.issues.push(BatchIssue::UnresolvedStudent {
                query: query.clone(),
            });
        }
        for ambiguous in &resolution.ambiguous {
            self.issues.push(BatchIssue::AmbiguousStudent {
                query: ambiguous.query.clone(),
                candidates: ambiguous.candidates.clone(),
            });
        }
        for query in &selection.unmatched {
            self.issues.push(BatchIssue::NoAssignmentMatch {
                query: query.clone(),
            });
        }
    }

    pub fn record_applied(&mut self, request: ExtensionRequest) {
        self.outcomes.push(PairOutcome::Applied(request));
    }

    pub fn record_planned(&mut self, request: ExtensionRequest) {
        self.outcomes.push(PairOutcome::Planned(request));
    }

    pub fn record_failure(&mut self, request: ExtensionRequest, error: GsError) {
        self.issues.push(BatchIssue::RemoteApplyError {
            student: request.student.clone(),
            assignment: request.assignment.clone(),
            error,
        });
        self.outcomes.push(PairOutcome::Failed(request));
    }

    pub fn applied_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PairOutcome::Applied(_)))
            .count()
    }

    pub fn planned_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PairOutcome::Planned(_)))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PairOutcome::Failed(_)))
            .count()
    }

    pub fn unresolved_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, BatchIssue::UnresolvedStudent { .. }))
            .count()
    }

    pub fn ambiguous_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, BatchIssue::AmbiguousStudent { .. }))
            .count()
    }

    pub fn unmatched_assignment_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, BatchIssue::NoAssignmentMatch { .. }))
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Multi-line summary for the terminal.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();

        for outcome in &self.outcomes {
            let request = outcome.request();
            let marker = match outcome {
                PairOutcome::Applied(_) => "✅",
                PairOutcome::Planned(_) => "📝",
                PairOutcome::Failed(_) => "❌",
            };
            lines.push(format!(
                "  {} {} -> {} ({})",
                marker, request.student, request.assignment.title, request.length
            ));
        }

        if !self.issues.is_empty() {
            lines.push(format!("{} problem(s):", self.issues.len()));
            for issue in &self.issues {
                lines.push(format!("  ⚠️  {}", issue));
            }
        }

        let mut summary = format!(
            "Applied {}, failed {}",
            self.applied_count(),
            self.failed_count()
        );
        if self.planned_count() > 0 {
            summary.push_str(&format!(", planned {} (dry run)", self.planned_count()));
        }
        summary.push_str(&format!(
            "; {} unresolved, {} ambiguous, {} unmatched assignment quer{}",
            self.unresolved_count(),
            self.ambiguous_count(),
            self.unmatched_assignment_count(),
            if self.unmatched_assignment_count() == 1 {
                "y"
            } else {
                "ies"
            }
        ));
        lines.push(summary);

        lines.join("\n")
    }
}
