//! Shared types for the API layer.

use std::sync::Arc;

use crate::identity::{IdentityGateway, UserAccount};
use crate::store::RecordStore;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn RecordStore>,
    pub identity: Arc<dyn IdentityGateway>,
}

impl ApiContext {
    pub fn new(store: Arc<dyn RecordStore>, identity: Arc<dyn IdentityGateway>) -> Self {
        Self { store, identity }
    }
}

/// Authenticated caller, injected into request extensions by the auth
/// middleware after session resolution.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub user: UserAccount,
}
