//! API middleware stack.
//!
//! A single layer: the session validator, which resolves the bearer
//! token through the identity gateway and injects [`CallerContext`]
//! for downstream handlers.
//!
//! [`CallerContext`]: crate::api::types::CallerContext

pub mod auth;
