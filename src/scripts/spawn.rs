//! # The process-spawning seam.
//!
//! [`Spawn`] is the narrow interface between the launcher and the OS.
//! Production code uses [`ShellSpawner`], which starts the script through
//! the platform command interpreter as a detached, windowless child; tests
//! substitute a recorder.

use std::io;
use std::process::{Command, Stdio};

use super::job::ScriptJob;

/// Starts a script as an independent process.
///
/// Implementations must not wait on the child: a successful return means
/// "the process began", nothing more.
pub trait Spawn: Send + Sync {
    /// Launches `job` and returns once the child process has started.
    fn spawn(&self, job: &ScriptJob) -> io::Result<()>;
}

/// Launches scripts through the platform command interpreter with no
/// visible window and no captured stdio.
///
/// The child handle is dropped immediately; the script may outlive the
/// agent and may run concurrently with anything else.
pub struct ShellSpawner;

#[cfg(windows)]
impl Spawn for ShellSpawner {
    fn spawn(&self, job: &ScriptJob) -> io::Result<()> {
        use std::os::windows::process::CommandExt;

        const CREATE_NO_WINDOW: u32 = 0x0800_0000;

        Command::new("cmd")
            .arg("/C")
            .arg(&job.path)
            .creation_flags(CREATE_NO_WINDOW)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }
}

#[cfg(not(windows))]
impl Spawn for ShellSpawner {
    fn spawn(&self, job: &ScriptJob) -> io::Result<()> {
        Command::new("sh")
            .arg(&job.path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }
}
