//! hourbook-core library.
//!
//! Reporting queries and hour-accumulation writes over an
//! employee/department/project database.
//!
//! # Conventions
//!
//! - **Errors**: core operations return [`error::HourbookError`]; config
//!   plumbing uses `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod access;
pub mod config;
pub mod db;
pub mod error;
pub mod export;

pub use access::AccessContext;
pub use error::{ErrorCode, HourbookError};
