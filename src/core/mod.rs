pub mod assignments;
pub mod extension;
pub mod report;
pub mod roster;
pub mod roster_import;

pub use crate::domain::model::{Assignment, Course, ExtensionLength, ExtensionRequest, RosterEntry};
pub use crate::domain::ports::{AuthClient, CourseCatalog, ExtensionTarget, Prompter, RosterSource};
pub use crate::utils::error::Result;
