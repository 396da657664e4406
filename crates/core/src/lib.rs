//! Sparksonic Core - Shared domain types.
//!
//! This crate provides common types used across the Sparksonic components:
//! - `api` - Public JSON API behind the marketing site
//! - `cli` - Command-line tools for store bootstrap and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Validated emails, prefixed public identifiers, and lifecycle statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
