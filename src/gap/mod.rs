//! Persistent GAP session management.
//!
//! GAP is a line-oriented REPL with no machine protocol: output arrives on
//! two free-running streams with nothing marking where one command's
//! response ends. This module turns that into a synchronous call/response
//! API by appending a sentinel print after every command and draining both
//! streams through per-generation reader tasks.
//!
//! Submodules:
//! - `locate`: executable discovery (override, env var, PATH, known locations).
//! - `filter`: outbound deny-list and inbound error signatures.
//! - `reader`: per-pipe reader tasks feeding tagged line queues.
//! - `runner`: the session manager — lifecycle, handshake, timeouts, restart.
//! - `shared`: lazily-constructed process-wide runner handle.

pub mod filter;
pub mod locate;
pub mod reader;
pub mod runner;
pub mod shared;

pub use runner::{CommandResult, GapRunner, SessionTimeouts};
pub use shared::SharedRunner;
