//! Error types for policy resolution and dispatch
//!
//! Every failure path of the dispatcher surfaces here. The layer is
//! fail-closed: anything short of an explicit "allow" from a policy rule
//! ends up as one of these variants, never as an implicit permit.

use std::fmt;

use thiserror::Error;

use crate::policy::{Policy, PolicyError};

/// Authorization dispatch error types.
///
/// Only [`AuthorizeError::NotAuthorized`] is an expected business outcome.
/// The remaining variants indicate a missing or broken policy and should be
/// treated as configuration bugs by the host layer.
#[derive(Error)]
pub enum AuthorizeError<U> {
    /// No policy is registered under the name derived for the target
    #[error("No policy `{policy}` registered for target `{target}`")]
    PolicyNotFound {
        /// Type name of the target that was resolved.
        target: String,
        /// Policy name that was looked up.
        policy: String,
    },

    /// The resolved policy does not declare the requested rule
    #[error("Policy `{policy}` does not declare rule `{rule}`")]
    MissingRule {
        /// Name of the resolved policy.
        policy: String,
        /// Rule that was requested.
        rule: String,
    },

    /// The resolved policy has no scope method
    #[error("Policy `{policy}` does not define a scope")]
    MissingScope {
        /// Name of the resolved policy.
        policy: String,
    },

    /// The rule ran and returned false
    #[error("Not authorized to `{rule}` with policy `{}`", .policy.name())]
    NotAuthorized {
        /// The policy instance that denied the request.
        policy: Box<dyn Policy<U>>,
        /// Rule that was evaluated.
        rule: String,
    },

    /// A fallible rule or scope raised instead of answering
    #[error("Policy `{policy}` failed while evaluating `{rule}`: {source}")]
    PolicyFailed {
        /// Name of the resolved policy.
        policy: String,
        /// Rule (or `scope`) that failed.
        rule: String,
        /// Underlying failure.
        #[source]
        source: PolicyError,
    },

    /// The scope value is not of the type the caller asked for
    #[error("Policy `{policy}` produced a `{found}` scope, expected `{expected}`")]
    ScopeMismatch {
        /// Name of the resolved policy.
        policy: String,
        /// Type the caller requested.
        expected: &'static str,
        /// Type the policy produced.
        found: &'static str,
    },
}

/// Result type for dispatch operations.
pub type AuthorizeResult<T, U> = Result<T, AuthorizeError<U>>;

impl<U> AuthorizeError<U> {
    /// Check if this error is an access denial.
    ///
    /// Denials are the only variant a host should translate into a
    /// user-facing "forbidden" response.
    pub fn is_denial(&self) -> bool {
        matches!(self, AuthorizeError::NotAuthorized { .. })
    }

    /// Check if this error points at a missing or incomplete policy.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            AuthorizeError::PolicyNotFound { .. }
                | AuthorizeError::MissingRule { .. }
                | AuthorizeError::MissingScope { .. }
                | AuthorizeError::ScopeMismatch { .. }
        )
    }

    /// Get the name of the policy involved, if one was resolved or looked up.
    pub fn policy_name(&self) -> &str {
        match self {
            AuthorizeError::PolicyNotFound { policy, .. }
            | AuthorizeError::MissingRule { policy, .. }
            | AuthorizeError::MissingScope { policy }
            | AuthorizeError::PolicyFailed { policy, .. }
            | AuthorizeError::ScopeMismatch { policy, .. } => policy.as_str(),
            AuthorizeError::NotAuthorized { policy, .. } => policy.name(),
        }
    }

    /// Get the rule that was evaluated, for variants that carry one.
    pub fn rule(&self) -> Option<&str> {
        match self {
            AuthorizeError::MissingRule { rule, .. }
            | AuthorizeError::NotAuthorized { rule, .. }
            | AuthorizeError::PolicyFailed { rule, .. } => Some(rule.as_str()),
            _ => None,
        }
    }

    /// Take the denying policy out of a [`AuthorizeError::NotAuthorized`].
    pub fn into_policy(self) -> Option<Box<dyn Policy<U>>> {
        match self {
            AuthorizeError::NotAuthorized { policy, .. } => Some(policy),
            _ => None,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthorizeError::PolicyNotFound { .. } => "POLICY_NOT_FOUND",
            AuthorizeError::MissingRule { .. } => "MISSING_RULE",
            AuthorizeError::MissingScope { .. } => "MISSING_SCOPE",
            AuthorizeError::NotAuthorized { .. } => "NOT_AUTHORIZED",
            AuthorizeError::PolicyFailed { .. } => "POLICY_FAILED",
            AuthorizeError::ScopeMismatch { .. } => "SCOPE_MISMATCH",
        }
    }
}

// Written by hand so that `U` needs no `Debug` bound; the actor is left out.
impl<U> fmt::Debug for AuthorizeError<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorizeError::PolicyNotFound { target, policy } => f
                .debug_struct("PolicyNotFound")
                .field("target", target)
                .field("policy", policy)
                .finish(),
            AuthorizeError::MissingRule { policy, rule } => f
                .debug_struct("MissingRule")
                .field("policy", policy)
                .field("rule", rule)
                .finish(),
            AuthorizeError::MissingScope { policy } => f
                .debug_struct("MissingScope")
                .field("policy", policy)
                .finish(),
            AuthorizeError::NotAuthorized { policy, rule } => f
                .debug_struct("NotAuthorized")
                .field("policy", policy)
                .field("rule", rule)
                .finish(),
            AuthorizeError::PolicyFailed {
                policy,
                rule,
                source,
            } => f
                .debug_struct("PolicyFailed")
                .field("policy", policy)
                .field("rule", rule)
                .field("source", source)
                .finish(),
            AuthorizeError::ScopeMismatch {
                policy,
                expected,
                found,
            } => f
                .debug_struct("ScopeMismatch")
                .field("policy", policy)
                .field("expected", expected)
                .field("found", found)
                .finish(),
        }
    }
}
