//! Domain layer for the gitable sync bot
//!
//! Core models, the error taxonomy and the port traits the services are
//! written against.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
