use crate::config::{CourseStore, ExtendArgs, Settings};
use crate::core::assignments::select_assignments;
use crate::core::extension::ExtensionApplier;
use crate::core::report::BatchReport;
use crate::core::roster::{Resolution, RosterResolver};
use crate::domain::model::Credentials;
use crate::domain::ports::{AuthClient, ExtensionTarget, Prompter};
use crate::utils::error::Result;

/// One `extend` invocation: resolve students, log in, pick assignments, apply.
///
/// Lookup misses and per-pair failures end up in the returned report. Only a
/// missing course, an unreadable course file, a failed login or a failed
/// assignment listing abort the run.
pub struct ExtendRun<'a> {
    settings: &'a Settings,
    courses: &'a CourseStore,
    args: &'a ExtendArgs,
}

impl<'a> ExtendRun<'a> {
    pub fn new(settings: &'a Settings, courses: &'a CourseStore, args: &'a ExtendArgs) -> Self {
        Self {
            settings,
            courses,
            args,
        }
    }

    pub async fn execute<C>(
        &self,
        client: &mut C,
        credentials: &Credentials,
        prompter: Option<&mut dyn Prompter>,
    ) -> Result<BatchReport>
    where
        C: AuthClient + ExtensionTarget,
    {
        let identifier = self.settings.course_or_default(self.args.course.as_deref())?;
        let record = self.courses.load(identifier)?;
        if let Some(meta) = self.settings.courses.get(identifier) {
            if meta.gradescope_id != record.gradescope_id {
                tracing::warn!(
                    "Course {} lists Gradescope id {} in settings but {} in its course file; using the course file",
                    identifier,
                    meta.gradescope_id,
                    record.gradescope_id
                );
            }
        }
        tracing::info!(
            "📚 Course {} (Gradescope {}), {} students on roster",
            identifier,
            record.gradescope_id,
            record.roster.len()
        );

        let mut resolution = RosterResolver::new(&record.roster).resolve(&self.args.names);
        if self.args.interactive {
            if let Some(prompter) = prompter {
                disambiguate(&mut resolution, prompter)?;
            }
        }

        let students = resolution.students();
        let mut report = BatchReport::new();

        if students.is_empty() {
            tracing::warn!("No students resolved, nothing to extend");
            report.record_lookups(&resolution, &Default::default());
            return Ok(report);
        }

        tracing::info!("🔐 Logging in to {}", client.service());
        client.authenticate(credentials).await?;

        let available = client.list_assignments(&record.gradescope_id).await?;
        tracing::debug!("{} assignments on Gradescope", available.len());
        let selection = select_assignments(&self.args.assignments, &available);
        report.record_lookups(&resolution, &selection);

        tracing::info!("Processing extensions for the following assignments:");
        for assignment in &selection.matched {
            tracing::info!("   {}", assignment.title);
        }
        tracing::info!("For the following students:");
        for student in &students {
            tracing::info!("   {}", student);
        }

        let length = self.args.length(self.settings.default_extension_days);
        ExtensionApplier::new(&*client, &record.gradescope_id)
            .dry_run(self.args.dry_run)
            .apply(&students, &selection.matched, length, &mut report)
            .await;

        Ok(report)
    }
}

/// Lets the operator pick the intended student for each ambiguous name; the last
/// option skips the name.
fn disambiguate(resolution: &mut Resolution, prompter: &mut dyn Prompter) -> Result<()> {
    let pending = resolution.ambiguous.clone();
    for ambiguous in pending {
        let mut options: Vec<String> = ambiguous.candidates.iter().map(|c| c.to_string()).collect();
        options.push("(None)".to_string());

        let message = format!(
            "{}: found the following close matches. Select the correct student (or none if none of these match)",
            ambiguous.query
        );
        let ix = prompter.select(&message, &options)?;
        match ambiguous.candidates.get(ix) {
            Some(entry) => resolution.choose(&ambiguous.query, entry.clone()),
            None => prompter.say(&format!("Skipping {}", ambiguous.query)),
        }
    }
    Ok(())
}
