pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{GradescopeClient, PiazzaClient, StdinPrompter};
pub use app::{ExtendRun, SetupFlow};
pub use config::{Cli, Command, CourseStore, Settings, SettingsStore};
pub use utils::error::{GsError, Result};
