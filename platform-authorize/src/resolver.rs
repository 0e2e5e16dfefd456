//! # Resolver
//!
//! Turns a target plus overrides into a policy instance bound to
//! `(actor, target, context)`.
//!
//! ```text
//! Target "Post" ──convention──▶ "PostAuthorization" ──registry──▶ factory(binding)
//! PolicySource::Named(n)  ──────────────────────────▶ registry[n](binding)
//! PolicySource::Factory   ──────────────────────────▶ factory(binding)
//! PolicySource::Instance  ──────────────────────────▶ returned unchanged
//! ```
//!
//! Resolution is fail-closed: a name that is not registered is an error,
//! never an allow-all fallback.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{AuthorizeError, AuthorizeResult};
use crate::options::{PolicySource, ResolveOptions};
use crate::policy::{Binding, Policy};
use crate::registry::{PolicyFactory, PolicyRegistry};
use crate::request::CurrentRequest;
use crate::target::Target;

/// Builds policy instances from the registry.
#[derive(Debug)]
pub struct Resolver<U> {
    registry: Arc<PolicyRegistry<U>>,
}

impl<U> Clone for Resolver<U> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<U: Clone + Send + Sync + 'static> Resolver<U> {
    /// Create a resolver over a frozen registry.
    pub fn new(registry: Arc<PolicyRegistry<U>>) -> Self {
        Self { registry }
    }

    /// The registry lookups go through.
    pub fn registry(&self) -> &PolicyRegistry<U> {
        &self.registry
    }

    /// Resolve the policy for `target`.
    ///
    /// The actor defaults to `request.current_actor()` and the context to
    /// an empty one. A pre-built instance in `options.policy` is returned
    /// without touching the registry.
    ///
    /// # Errors
    ///
    /// [`AuthorizeError::PolicyNotFound`] when no policy is registered under
    /// the derived or requested name.
    pub fn resolve<R>(
        &self,
        request: &R,
        target: Target,
        options: ResolveOptions<U>,
    ) -> AuthorizeResult<Box<dyn Policy<U>>, U>
    where
        R: CurrentRequest<U> + ?Sized,
    {
        let ResolveOptions {
            actor,
            policy,
            context,
        } = options;

        let (name, factory) = match policy {
            Some(PolicySource::Instance(instance)) => {
                debug!(
                    target_name = %target.name(),
                    policy = instance.name(),
                    "Using supplied policy instance"
                );
                return Ok(instance);
            }
            Some(PolicySource::Factory { name, factory }) => (name, factory),
            Some(PolicySource::Named(name)) => {
                let factory = self.lookup(&target, &name)?;
                (name, factory)
            }
            None => {
                let name = self.registry.policy_name_for(target.name());
                let factory = self.lookup(&target, &name)?;
                (name, factory)
            }
        };

        let actor = actor.unwrap_or_else(|| request.current_actor().clone());
        debug!(target_name = %target.name(), policy = %name, "Resolved policy");

        Ok(factory(Binding::new(
            actor,
            target,
            context.unwrap_or_default(),
        )))
    }

    fn lookup(&self, target: &Target, name: &str) -> AuthorizeResult<PolicyFactory<U>, U> {
        match self.registry.get(name) {
            Some(factory) => Ok(Arc::clone(factory)),
            None => {
                warn!(target_name = %target.name(), policy = %name, "No policy registered");
                Err(AuthorizeError::PolicyNotFound {
                    target: target.name().to_string(),
                    policy: name.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::policy::PolicyType;
    use crate::request::RequestContext;
    use crate::target::Resource;

    struct Invoice;

    impl Resource for Invoice {}

    struct InvoiceAuthorization {
        binding: Binding<String>,
    }

    impl Policy<String> for InvoiceAuthorization {
        fn binding(&self) -> &Binding<String> {
            &self.binding
        }
    }

    impl PolicyType<String> for InvoiceAuthorization {
        fn build(binding: Binding<String>) -> Self {
            Self { binding }
        }
    }

    fn resolver() -> Resolver<String> {
        let mut registry = PolicyRegistry::new();
        registry.register::<InvoiceAuthorization>();
        Resolver::new(Arc::new(registry))
    }

    fn request() -> RequestContext<String> {
        RequestContext::new("current".to_string(), "index")
    }

    #[test]
    fn test_resolve_by_convention() {
        let policy = resolver()
            .resolve(&request(), Target::kind::<Invoice>(), ResolveOptions::default())
            .unwrap();

        assert_eq!(policy.name(), "InvoiceAuthorization");
        assert_eq!(policy.binding().actor(), "current");
        assert!(policy.binding().context().is_empty());
    }

    #[test]
    fn test_resolve_miss_is_policy_not_found() {
        let err = resolver()
            .resolve(&request(), Target::named("Receipt"), ResolveOptions::default())
            .unwrap_err();

        match err {
            AuthorizeError::PolicyNotFound { target, policy } => {
                assert_eq!(target, "Receipt");
                assert_eq!(policy, "ReceiptAuthorization");
            }
            other => panic!("expected PolicyNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_overrides() {
        let options = ResolveOptions {
            actor: Some("other".to_string()),
            policy: None,
            context: Some(Context::new().with("ip", "127.0.0.1")),
        };
        let policy = resolver()
            .resolve(&request(), Target::kind::<Invoice>(), options)
            .unwrap();

        assert_eq!(policy.binding().actor(), "other");
        assert_eq!(
            policy.binding().context(),
            &Context::new().with("ip", "127.0.0.1")
        );
    }

    #[test]
    fn test_resolve_named_policy() {
        let options = ResolveOptions {
            policy: Some(PolicySource::named("InvoiceAuthorization")),
            ..Default::default()
        };
        let policy = resolver()
            .resolve(&request(), Target::named("Ledger"), options)
            .unwrap();
        assert_eq!(policy.name(), "InvoiceAuthorization");
        assert_eq!(policy.binding().target().name(), "Ledger");

        let options = ResolveOptions {
            policy: Some(PolicySource::named("LedgerAuthorization")),
            ..Default::default()
        };
        let err = resolver()
            .resolve(&request(), Target::kind::<Invoice>(), options)
            .unwrap_err();
        assert!(matches!(err, AuthorizeError::PolicyNotFound { .. }));
    }

    #[test]
    fn test_resolve_explicit_type_skips_registry() {
        let resolver = Resolver::new(Arc::new(PolicyRegistry::<String>::new()));
        let options = ResolveOptions {
            policy: Some(PolicySource::of::<InvoiceAuthorization>()),
            ..Default::default()
        };
        let policy = resolver
            .resolve(&request(), Target::named("Anything"), options)
            .unwrap();
        assert_eq!(policy.name(), "InvoiceAuthorization");
    }
}
