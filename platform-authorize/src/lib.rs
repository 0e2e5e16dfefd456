//! # Platform Authorize
//!
//! This crate provides policy resolution and dispatch for request handlers
//! across the Relay platform.
//!
//! ## Overview
//!
//! The platform-authorize crate handles:
//! - **Resolution**: Finding the policy responsible for a target (`Post` → `PostAuthorization`)
//! - **Dispatch**: Evaluating the rule for the current action (`show` → `show?`)
//! - **Scopes**: Returning the collection view an actor may see, with or without a check
//!
//! Role and permission storage, caching and query building are left to the
//! application; policies are plain Rust types registered at startup.
//!
//! ## Architecture
//!
//! ```text
//! handler ─▶ RequestAuthorizer::authorize(target)
//!               │
//!               ├─▶ Resolver::resolve(target) ─▶ PolicyRegistry["<Target>Authorization"]
//!               │                                   └─▶ policy(actor, target, context)
//!               ├─▶ policy.check("<action>?") ─┬─▶ true  ─▶ Ok(target)
//!               │                              └─▶ false ─▶ Err(NotAuthorized)
//!               └─▶ policy.scope()             (authorization_scope / authorized_scope)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use platform_authorize::{AuthorizeOptions, Authorizer, PolicyRegistry, RequestContext, Resource};
//!
//! struct Post;
//! impl Resource for Post {}
//!
//! // At startup: register policies and freeze the registry
//! let registry = PolicyRegistry::<String>::new();
//! let authorizer = Authorizer::new(registry);
//!
//! // Per request: bind the current actor and action
//! let request = RequestContext::new("alice".to_string(), "show");
//! let post = authorizer
//!     .for_request(&request)
//!     .authorize(Arc::new(Post), AuthorizeOptions::new());
//! ```
//!
//! ## Failure Semantics
//!
//! The layer is fail-closed. A missing policy, a missing rule, a failing
//! rule and a denial all surface as distinct [`AuthorizeError`] variants;
//! only [`AuthorizeError::NotAuthorized`] is a regular "forbidden" outcome.
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support (enabled by default)

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod options;
pub mod policy;
pub mod registry;
pub mod request;
pub mod resolver;
pub mod target;

// Re-export main types for convenience
pub use config::{AuthorizeConfig, ConfigError};
pub use context::Context;
pub use dispatcher::{Authorizer, RequestAuthorizer};
pub use error::{AuthorizeError, AuthorizeResult};
pub use options::{AuthorizeOptions, PolicySource, ResolveOptions};
pub use policy::{Binding, Policy, PolicyError, PolicyResult, PolicyType, Scope};
pub use registry::{factory_for, PolicyFactory, PolicyRegistry};
pub use request::{CurrentRequest, RequestContext};
pub use resolver::Resolver;
pub use target::{simple_type_name, Resource, Target};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
