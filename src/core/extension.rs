use crate::core::report::BatchReport;
use crate::domain::model::{Assignment, ExtensionLength, ExtensionRequest, RosterEntry};
use crate::domain::ports::ExtensionTarget;

/// Submits one extension per (student, assignment) pair. Each pair succeeds or
/// fails on its own; a failure is recorded and the loop moves on.
pub struct ExtensionApplier<'a, T: ExtensionTarget + ?Sized> {
    target: &'a T,
    course_id: &'a str,
    dry_run: bool,
}

impl<'a, T: ExtensionTarget + ?Sized> ExtensionApplier<'a, T> {
    pub fn new(target: &'a T, course_id: &'a str) -> Self {
        Self {
            target,
            course_id,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Every student × every assignment, in that nesting order.
    pub fn plan(
        students: &[RosterEntry],
        assignments: &[Assignment],
        length: ExtensionLength,
    ) -> Vec<ExtensionRequest> {
        students
            .iter()
            .flat_map(|student| {
                assignments.iter().map(move |assignment| ExtensionRequest {
                    student: student.clone(),
                    assignment: assignment.clone(),
                    length,
                })
            })
            .collect()
    }

    pub async fn apply(
        &self,
        students: &[RosterEntry],
        assignments: &[Assignment],
        length: ExtensionLength,
        report: &mut BatchReport,
    ) {
        for request in Self::plan(students, assignments, length) {
            if self.dry_run {
                tracing::info!(
                    "📝 Would extend {} on '{}' by {}",
                    request.student,
                    request.assignment.title,
                    request.length
                );
                report.record_planned(request);
                continue;
            }

            match self
                .target
                .apply_extension(
                    self.course_id,
                    &request.assignment,
                    &request.student.email,
                    request.length,
                )
                .await
            {
                Ok(()) => {
                    tracing::info!(
                        "✅ Extended {} on '{}' ({})",
                        request.student,
                        request.assignment.title,
                        request.length
                    );
                    report.record_applied(request);
                }
                Err(e) => {
                    tracing::error!(
                        "❌ Extension for {} on '{}' (assignment {}) failed: {}",
                        request.student,
                        request.assignment.title,
                        request.assignment.id,
                        e
                    );
                    report.record_failure(request, e);
                }
            }
        }
    }
}
