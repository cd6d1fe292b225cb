pub mod extend;
pub mod setup;

pub use extend::ExtendRun;
pub use setup::{RosterChoice, SetupFlow, SetupStep, SetupSummary};
