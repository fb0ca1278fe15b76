//! cot-core: Shared types and trait seams for the CoT push server
//!
//! This crate provides the marker configuration value object, the server
//! configuration surface, the error taxonomy, and the collaborator traits
//! (message composer, data-package builder, outbound transport) that the
//! orchestrator in `cot-server` is generic over.

pub mod config;
pub mod cot;
pub mod error;
pub mod traits;

pub use config::ServerConfig;
pub use cot::CotConfig;
pub use error::{BoxError, ConfigError, PushError, ServerError, TransportError};
