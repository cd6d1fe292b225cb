// 外部系統實作：Gradescope、Piazza、終端互動
pub mod gradescope;
pub mod html;
pub mod piazza;
pub mod terminal;

pub use gradescope::GradescopeClient;
pub use piazza::PiazzaClient;
pub use terminal::StdinPrompter;
