//! Script job types.

use std::path::PathBuf;

/// Lifecycle phase a script belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Runs once the runtime is ready.
    Start,
    /// Runs after the runtime has signalled it is quitting.
    Stop,
}

impl Phase {
    /// Lowercase name used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Start => "start",
            Phase::Stop => "stop",
        }
    }
}

/// One discovered script, about to be launched.
///
/// Ephemeral: created during discovery, handed to the spawner, dropped. The
/// agent keeps no process handle afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptJob {
    /// Absolute path of the script file.
    pub path: PathBuf,
    /// Which phase launched it.
    pub phase: Phase,
}
