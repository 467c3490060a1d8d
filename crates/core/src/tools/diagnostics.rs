use std::process::Stdio;

use log::LevelFilter;

/// Silences library warnings and child-process stderr while alive.
///
/// The previous `log` max level is restored on drop.
#[derive(Debug)]
pub struct DiagnosticGuard {
    previous: LevelFilter,
    suppress: bool,
}

impl DiagnosticGuard {
    pub fn new(suppress: bool) -> Self {
        let previous = log::max_level();
        if suppress {
            log::set_max_level(previous.min(LevelFilter::Error));
        }
        Self { previous, suppress }
    }

    pub fn is_suppressing(&self) -> bool {
        self.suppress
    }

    /// Stderr for a child process spawned under this guard.
    pub fn stderr(&self) -> Stdio {
        if self.suppress { Stdio::null() } else { Stdio::inherit() }
    }
}

impl Drop for DiagnosticGuard {
    fn drop(&mut self) {
        log::set_max_level(self.previous);
    }
}
