#![forbid(unsafe_code)]

//! Persistent GAP session management behind an MCP tool surface.

pub mod config;
pub mod errors;
pub mod gap;
pub mod mcp;

pub use config::ServerConfig;
pub use errors::{AppError, Result};
