//! Endpoint handlers, one module per resource.

pub mod appointments;
pub mod consultations;
pub mod doctors;
pub mod health;
pub mod messages;
pub mod patients;
pub mod profile;
