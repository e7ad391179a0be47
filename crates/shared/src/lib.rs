//! Shared error types and configuration for irbankmock.
//!
//! This crate provides the pieces every other crate agrees on:
//! - The tagged application error (`AppError` + `ErrorKind`)
//! - Configuration management

pub mod config;
pub mod error;

pub use config::{AppConfig, DatabaseConfig, GatewayConfig, ServerConfig};
pub use error::{AppError, ErrorKind};
