//! Diagnostics sink: in-memory log with capped persistence.
//!
//! Every component writes into a shared [`LogBuffer`] instead of a live
//! sink; the buffer is flushed to a size-capped file exactly once, when the
//! lifecycle ends. Each append is also echoed to the console in the color of
//! its [`LogLevel`].
//!
//! The existence of the persisted file doubles as the first-run signal, see
//! [`persisted_log_exists`].

mod buffer;
mod level;

pub use buffer::{persisted_log_exists, LogBuffer, LogEntry};
pub use level::LogLevel;
