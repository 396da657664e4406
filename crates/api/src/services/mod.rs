//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Password accounts and bearer tokens
//! - `email` - Transactional email over SMTP
//! - `reviews` - Google Places rating proxy and review fixtures

pub mod auth;
pub mod email;
pub mod reviews;
