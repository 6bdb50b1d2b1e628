//! Hook script discovery and fire-and-forget launching.
//!
//! Scripts are external files the agent discovers by filename pattern in the
//! start/stop directories and hands to the platform command interpreter.
//! The agent never interprets script content, never waits for a script, and
//! never collects exit codes. Launching is the whole contract.
//!
//! The OS boundary is the [`Spawn`] trait so tests can record "would have
//! launched X" without touching a real process table.

mod job;
mod launcher;
mod spawn;

pub use job::{Phase, ScriptJob};
pub use launcher::Launcher;
pub use spawn::{ShellSpawner, Spawn};
