pub mod cli;
pub mod course;
pub mod credentials;
pub mod settings;
pub mod storage;

pub use cli::{Cli, Command, ConfigureArgs, ExtendArgs};
pub use course::{CourseRecord, CourseStore};
pub use settings::{CourseMeta, Settings, SettingsStore};
