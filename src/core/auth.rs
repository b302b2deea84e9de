//! Caller identity for server-context fetching
//!
//! The adapter never verifies credentials. A [`SessionProvider`] is an
//! explicit capability answering "who is calling", handed to the
//! server-context fetcher either at construction or per call:
//! - [`NoSession`]: nobody is signed in
//! - [`StaticSession`]: a fixed caller (jobs, tests)
//! - [`HeaderSession`]: identity forwarded by an authenticating gateway

use anyhow::Result;
use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header an authenticating gateway uses to forward the caller id
pub const DEFAULT_USER_HEADER: &str = "x-user-id";

/// Header carrying the caller email, when the gateway forwards it
pub const DEFAULT_EMAIL_HEADER: &str = "x-user-email";

/// The resolved caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl CallerIdentity {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Trait for identity sources
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Resolve the current caller, `None` when nobody is signed in
    async fn current_user(&self) -> Result<Option<CallerIdentity>>;
}

/// Session source with nobody signed in
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSession;

#[async_trait]
impl SessionProvider for NoSession {
    async fn current_user(&self) -> Result<Option<CallerIdentity>> {
        Ok(None)
    }
}

/// Session source that always answers with the same caller
#[derive(Debug, Clone)]
pub struct StaticSession {
    identity: CallerIdentity,
}

impl StaticSession {
    pub fn new(identity: CallerIdentity) -> Self {
        Self { identity }
    }

    pub fn user(user_id: Uuid) -> Self {
        Self::new(CallerIdentity::new(user_id))
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_user(&self) -> Result<Option<CallerIdentity>> {
        Ok(Some(self.identity.clone()))
    }
}

/// Identity read from request headers set by an upstream gateway
///
/// A missing or non-UUID user header resolves to no caller.
#[derive(Debug, Clone, Default)]
pub struct HeaderSession {
    identity: Option<CallerIdentity>,
}

impl HeaderSession {
    /// Read the caller from `user_header` (and [`DEFAULT_EMAIL_HEADER`])
    pub fn from_headers(headers: &HeaderMap, user_header: &str) -> Self {
        let identity = headers
            .get(user_header)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(|user_id| {
                let email = headers
                    .get(DEFAULT_EMAIL_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                CallerIdentity { user_id, email }
            });

        Self { identity }
    }

    pub fn identity(&self) -> Option<&CallerIdentity> {
        self.identity.as_ref()
    }
}

#[async_trait]
impl SessionProvider for HeaderSession {
    async fn current_user(&self) -> Result<Option<CallerIdentity>> {
        Ok(self.identity.clone())
    }
}
