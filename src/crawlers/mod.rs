pub mod docs;
pub mod expander;

pub use docs::{DocsCrawler, RunState, harvest};
pub use expander::{NavigationExpander, SectionOutcome};
