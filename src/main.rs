use clap::Parser;
use gs_tools::adapters::{GradescopeClient, PiazzaClient, StdinPrompter};
use gs_tools::app::{ExtendRun, SetupFlow};
use gs_tools::config::credentials::{gradescope_from_env, piazza_from_env};
use gs_tools::config::{Cli, Command, ConfigureArgs, CourseStore, ExtendArgs, Settings, SettingsStore};
use gs_tools::utils::error::{ErrorSeverity, Result};
use gs_tools::utils::logger;
use std::path::PathBuf;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI arguments: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ gs-tools failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let store = match cli.settings {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::beside_executable()?,
    };
    let settings = store.load()?;
    tracing::debug!("Settings loaded from {}", store.path().display());

    match cli.command {
        None => {
            setup(&store, settings, None).await?;
            Ok(())
        }
        Some(Command::Configure(ConfigureArgs { roster })) => {
            setup(&store, settings, roster).await?;
            Ok(())
        }
        Some(Command::Extend(args)) => {
            let settings = if settings.courses.is_empty() {
                println!("No courses configured, running setup first");
                setup(&store, settings, None).await?
            } else {
                settings
            };
            extend(&store, &settings, &args).await
        }
    }
}

async fn setup(store: &SettingsStore, settings: Settings, roster: Option<PathBuf>) -> Result<Settings> {
    let grading_credentials = gradescope_from_env()?;
    let mut grading = GradescopeClient::new()?;
    let mut prompter = StdinPrompter::new();

    let mut discussion = match piazza_from_env() {
        Some(credentials) => Some((PiazzaClient::new()?, credentials)),
        None => None,
    };

    let mut flow = SetupFlow::new(store, settings, &mut grading, grading_credentials, &mut prompter)
        .with_roster_csv(roster);
    if let Some((client, credentials)) = discussion.as_mut() {
        flow = flow.with_discussion(client, credentials.clone());
    }

    let summary = flow.run().await?;
    tracing::info!(
        "✅ Configured course {} ({}, {} students)",
        summary.identifier,
        summary.course.name,
        summary.students
    );
    Ok(summary.settings)
}

async fn extend(store: &SettingsStore, settings: &Settings, args: &ExtendArgs) -> Result<()> {
    if args.names.is_empty() {
        println!("No names supplied, exiting..");
        return Ok(());
    }

    let credentials = gradescope_from_env()?;
    let courses = CourseStore::new(store.course_dir(settings));
    let mut client = GradescopeClient::new()?;
    let mut prompter = StdinPrompter::new();

    let report = ExtendRun::new(settings, &courses, args)
        .execute(&mut client, &credentials, Some(&mut prompter))
        .await?;

    println!("{}", report.render());
    if !report.is_clean() {
        tracing::warn!("Some extensions were not applied, see the summary above");
    }
    Ok(())
}
