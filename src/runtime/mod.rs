//! The VR runtime boundary and the two components that drive it.
//!
//! The runtime itself is an external collaborator reached through the
//! [`RuntimeClient`] trait; the agent only calls it and interprets result
//! codes. On top of that boundary sit:
//!
//! - [`Connector`] — the connect/retry loop plus one-time registration;
//! - [`ShutdownWatcher`] — the event-poll loop that waits for the runtime's
//!   quit signal.

mod client;
mod connector;
mod watcher;

#[cfg(feature = "openvr")]
mod openvr;

pub use client::{ConnectionState, RuntimeClient, RuntimeEvent, RuntimeEventKind};
pub use connector::Connector;
pub use watcher::ShutdownWatcher;

#[cfg(feature = "openvr")]
pub use openvr::OpenVrClient;
