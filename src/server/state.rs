//! Server application state

use crate::handler::ChatHandler;
use std::sync::Arc;

/// Shared application state for all route handlers
pub struct AppState {
    pub handler: ChatHandler,
}

impl AppState {
    pub fn new(handler: ChatHandler) -> Arc<Self> {
        Arc::new(Self { handler })
    }
}
