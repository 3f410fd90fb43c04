//! Engine session: sources, console commands and run statistics.

mod console;
mod orchestrator;
mod sources;
mod stats;

pub use console::ConsoleCommand;
pub use orchestrator::{Session, SessionConfig};
pub use sources::{build_permission, build_platform, SessionPermission, SessionPlatform, SourceConfig};
pub use stats::SessionStats;
