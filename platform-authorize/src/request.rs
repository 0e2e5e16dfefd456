//! Request-scoped inputs to the dispatcher
//!
//! The host request layer owns "who is asking" and "what are they doing".
//! Instead of reading ambient globals, the dispatcher takes both from an
//! explicit [`CurrentRequest`] handed to [`crate::Authorizer::for_request`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contract the host request layer fulfils.
pub trait CurrentRequest<U> {
    /// The acting user, used when no actor override is given.
    fn current_actor(&self) -> &U;

    /// The current action identifier (e.g. `index`, `show`).
    ///
    /// Consulted by `authorize` and `authorized_scope` when no action
    /// override is given. `authorization_scope` never reads it.
    fn action_name(&self) -> &str;

    /// Correlation ID attached to log events, if the host has one.
    fn request_id(&self) -> Option<Uuid> {
        None
    }
}

/// A ready-made request context for hosts without their own type.
///
/// # Examples
///
/// ```
/// use platform_authorize::{CurrentRequest, RequestContext};
///
/// let request = RequestContext::new("alice".to_string(), "index");
/// assert_eq!(request.current_actor(), "alice");
/// assert_eq!(request.action_name(), "index");
/// assert!(request.request_id().is_some());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext<U> {
    /// The acting user
    pub actor: U,

    /// Current action identifier
    pub action: String,

    /// Correlation ID for log events
    pub request_id: Uuid,

    /// When the request was received
    pub received_at: DateTime<Utc>,
}

impl<U> RequestContext<U> {
    /// Creates a context for a freshly received request.
    pub fn new(actor: U, action: impl Into<String>) -> Self {
        Self {
            actor,
            action: action.into(),
            request_id: Uuid::now_v7(),
            received_at: Utc::now(),
        }
    }

    /// Use a correlation ID supplied upstream instead of a generated one.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Switch the current action (e.g. when one handler serves several).
    pub fn set_action(&mut self, action: impl Into<String>) {
        self.action = action.into();
    }
}

impl<U> CurrentRequest<U> for RequestContext<U> {
    fn current_actor(&self) -> &U {
        &self.actor
    }

    fn action_name(&self) -> &str {
        &self.action
    }

    fn request_id(&self) -> Option<Uuid> {
        Some(self.request_id)
    }
}
