//! Per-call overrides for resolution and dispatch.
//!
//! Every field is optional and defaults independently: the actor comes from
//! the request, the policy from the naming convention, the context is empty
//! and the rule is derived from the request's current action.

use std::fmt;

use crate::context::Context;
use crate::policy::{Policy, PolicyType};
use crate::registry::{factory_for, PolicyFactory};

/// Where the resolver gets its policy from when the convention is bypassed.
pub enum PolicySource<U> {
    /// Look up a registered policy by name.
    Named(String),

    /// Construct a specific policy type.
    Factory {
        /// Policy name, for logs and errors.
        name: String,
        /// Constructor.
        factory: PolicyFactory<U>,
    },

    /// Use an already constructed policy as-is.
    Instance(Box<dyn Policy<U>>),
}

impl<U: 'static> PolicySource<U> {
    /// Construct `P` regardless of the target's type.
    pub fn of<P: PolicyType<U>>() -> Self {
        PolicySource::Factory {
            name: P::policy_name().to_string(),
            factory: factory_for::<U, P>(),
        }
    }

    /// Look up the policy registered under `name`.
    pub fn named(name: impl Into<String>) -> Self {
        PolicySource::Named(name.into())
    }

    /// Skip resolution and use this policy.
    pub fn instance<P: Policy<U> + 'static>(policy: P) -> Self {
        PolicySource::Instance(Box::new(policy))
    }
}

impl<U> fmt::Debug for PolicySource<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicySource::Named(name) => f.debug_tuple("Named").field(name).finish(),
            PolicySource::Factory { name, .. } => {
                f.debug_struct("Factory").field("name", name).finish()
            }
            PolicySource::Instance(policy) => {
                f.debug_tuple("Instance").field(&policy.name()).finish()
            }
        }
    }
}

/// Overrides consumed by the resolver.
pub struct ResolveOptions<U> {
    /// Acting user; defaults to the request's current actor.
    pub actor: Option<U>,

    /// Policy override; defaults to the naming convention.
    pub policy: Option<PolicySource<U>>,

    /// Auxiliary data; defaults to an empty context.
    pub context: Option<Context>,
}

impl<U> Default for ResolveOptions<U> {
    fn default() -> Self {
        Self {
            actor: None,
            policy: None,
            context: None,
        }
    }
}

/// Overrides accepted by every dispatcher operation.
///
/// # Example
///
/// ```
/// use platform_authorize::{AuthorizeOptions, Context};
///
/// let options = AuthorizeOptions::<String>::new()
///     .actor("admin".to_string())
///     .context(Context::new().with("ip", "127.0.0.1"))
///     .action("publish?");
///
/// assert_eq!(options.action_override(), Some("publish?"));
/// ```
pub struct AuthorizeOptions<U> {
    resolve: ResolveOptions<U>,
    action: Option<String>,
}

impl<U> AuthorizeOptions<U> {
    /// No overrides.
    pub fn new() -> Self {
        Self {
            resolve: ResolveOptions::default(),
            action: None,
        }
    }

    /// Act as this user instead of the request's current actor.
    pub fn actor(mut self, actor: U) -> Self {
        self.resolve.actor = Some(actor);
        self
    }

    /// Bypass the naming convention.
    pub fn policy(mut self, source: PolicySource<U>) -> Self {
        self.resolve.policy = Some(source);
        self
    }

    /// Bind this context into the policy.
    pub fn context(mut self, context: Context) -> Self {
        self.resolve.context = Some(context);
        self
    }

    /// Evaluate this rule verbatim (e.g. `custom?`) instead of the one
    /// derived from the request's current action.
    pub fn action(mut self, rule: impl Into<String>) -> Self {
        self.action = Some(rule.into());
        self
    }

    /// The rule override, if any.
    pub fn action_override(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Split into resolver options and the rule override.
    pub fn into_parts(self) -> (ResolveOptions<U>, Option<String>) {
        (self.resolve, self.action)
    }
}

impl<U> Default for AuthorizeOptions<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> From<ResolveOptions<U>> for AuthorizeOptions<U> {
    fn from(resolve: ResolveOptions<U>) -> Self {
        Self {
            resolve,
            action: None,
        }
    }
}

impl<U> fmt::Debug for AuthorizeOptions<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizeOptions")
            .field("actor", &self.resolve.actor.is_some())
            .field("policy", &self.resolve.policy)
            .field("context", &self.resolve.context)
            .field("action", &self.action)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_empty() {
        let (resolve, action) = AuthorizeOptions::<u64>::default().into_parts();
        assert!(resolve.actor.is_none());
        assert!(resolve.policy.is_none());
        assert!(resolve.context.is_none());
        assert!(action.is_none());
    }

    #[test]
    fn test_builder_sets_each_field() {
        let options = AuthorizeOptions::<u64>::new()
            .actor(7)
            .policy(PolicySource::named("PostAuthorization"))
            .context(Context::new().with("ip", "127.0.0.1"))
            .action("custom?");
        assert_eq!(options.action_override(), Some("custom?"));

        let (resolve, action) = options.into_parts();
        assert_eq!(resolve.actor, Some(7));
        assert!(matches!(resolve.policy, Some(PolicySource::Named(ref n)) if n == "PostAuthorization"));
        assert_eq!(resolve.context.unwrap().len(), 1);
        assert_eq!(action.as_deref(), Some("custom?"));
    }
}
