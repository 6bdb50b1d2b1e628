//! # Script launcher: discovery plus fire-and-forget execution.
//!
//! For each phase the launcher lists the phase directory (creating it if
//! absent; a missing hook folder is never an error), filters file names
//! against the configured glob, logs the count, and launches every match as
//! a detached process.
//!
//! ## Rules
//! - Discovery is non-recursive; only plain files directly in the directory
//!   are considered.
//! - Any error during discovery or a single launch is logged and the rest of
//!   the phase continues.
//! - No ordering guarantee between launched scripts; they run concurrently
//!   with each other and with the rest of the lifecycle.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob::Pattern;

use crate::logging::LogBuffer;

use super::job::{Phase, ScriptJob};
use super::spawn::Spawn;

/// Discovers and launches hook scripts for one phase at a time.
pub struct Launcher {
    log: LogBuffer,
    spawner: Arc<dyn Spawn>,
    pattern: Pattern,
}

impl Launcher {
    /// Creates a launcher that matches file names against `pattern`.
    pub fn new(log: LogBuffer, spawner: Arc<dyn Spawn>, pattern: Pattern) -> Self {
        Self {
            log,
            spawner,
            pattern,
        }
    }

    /// Runs one phase: discovers matching scripts in `dir` and launches each.
    ///
    /// Per-file failures are logged and do not stop the remaining launches.
    pub fn run(&self, dir: &Path, phase: Phase) {
        let files = match self.discover(dir) {
            Ok(files) => files,
            Err(e) => {
                self.log
                    .error(format!("Error loading {} scripts: {e}", phase.as_str()));
                return;
            }
        };

        self.log.plain(format!(
            "Found {} {} file(s)",
            files.len(),
            phase.as_str()
        ));

        for path in files {
            let path = match absolute(&path) {
                Ok(p) => p,
                Err(e) => {
                    self.log
                        .error(format!("Error resolving {}: {e}", path.display()));
                    continue;
                }
            };
            self.log.info(format!("Running {}", path.display()));
            let job = ScriptJob { path, phase };
            if let Err(e) = self.spawner.spawn(&job) {
                self.log
                    .error(format!("Error running {}: {e}", job.path.display()));
            }
        }
    }

    /// Whether `dir` holds at least one matching script.
    ///
    /// Creates the directory if absent. Never raises: a discovery failure is
    /// logged and reported as "no scripts".
    pub fn has_scripts(&self, dir: &Path) -> bool {
        match self.discover(dir) {
            Ok(files) => !files.is_empty(),
            Err(e) => {
                self.log
                    .error(format!("Error listing {}: {e}", dir.display()));
                false
            }
        }
    }

    /// Lists matching plain files directly under `dir`, sorted by name.
    fn discover(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            if self.pattern.matches(&name.to_string_lossy()) {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Best-effort absolute form of `path` for the interpreter's command line.
fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_owned())
    } else {
        path.canonicalize()
    }
}
