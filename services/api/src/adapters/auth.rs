//! services/api/src/adapters/auth.rs
//!
//! This module contains the no-op implementation of the `AuthService` port.
//! Authentication is a pluggable capability; the current deployment runs
//! open, and swapping in a real implementation is a wiring change in
//! `bin/api.rs` rather than a code path through the handlers.

use async_trait::async_trait;
use sermon_study_core::ports::{AuthService, PortResult};

/// An `AuthService` that accepts every caller and establishes no subject.
#[derive(Clone, Default)]
pub struct NoopAuthAdapter;

impl NoopAuthAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuthService for NoopAuthAdapter {
    async fn authenticate(&self, _token: Option<&str>) -> PortResult<Option<String>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_auth_accepts_with_and_without_a_token() {
        let auth = NoopAuthAdapter::new();
        assert_eq!(auth.authenticate(None).await.unwrap(), None);
        assert_eq!(auth.authenticate(Some("anything")).await.unwrap(), None);
    }
}
