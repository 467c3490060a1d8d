//! External tools run as child processes.

mod diagnostics;
pub mod hinter;
pub mod patcher;

pub use diagnostics::DiagnosticGuard;
pub use patcher::parse_patcher_output;
