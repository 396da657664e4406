//! Domain models for the Sparksonic API.
//!
//! Stored records serialize to the documents kept by [`crate::db`]; request
//! payloads live next to the route that accepts them.

pub mod contact;
pub mod project;
pub mod quote;
pub mod review;
pub mod service;
pub mod ticket;
pub mod user;

pub use contact::Contact;
pub use project::Project;
pub use quote::Quote;
pub use review::{Review, ReviewSummary};
pub use service::{SERVICES, Service};
pub use ticket::{Ticket, TicketUpdate};
pub use user::{User, UserProfile};
