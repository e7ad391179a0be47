//! Core business logic for irbankmock.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and lifecycle decisions live here.
//!
//! # Modules
//!
//! - `validation` - Input validation shared by every bank adapter
//! - `sep` - Saman (SEP) gateway rules: error codes, card handling, lifecycle

pub mod sep;
pub mod validation;
