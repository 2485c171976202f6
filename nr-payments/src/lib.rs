//! Payments attached to Name Requests, and the request-state and email
//! follow-ups that payment writes trigger.

pub mod error;
pub mod handlers;
pub mod hooks;
pub mod memory;
pub mod models;
pub mod publisher;
pub mod repository;
pub mod schema;
pub mod service;
pub mod store;

pub use error::{PaymentError, Result};
