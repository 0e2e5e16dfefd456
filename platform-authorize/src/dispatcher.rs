//! # Dispatcher
//!
//! The four operations request handlers call. Each call is a single pass:
//!
//! ```text
//! START → RESOLVING ─┬─▶ RESOLVED → CHECKING ─┬─▶ ALLOWED ─┬─▶ DONE
//!                    │                        │            └─▶ SCOPING → DONE
//!                    │                        └─▶ DENIED → FAILED
//!                    └─▶ RESOLUTION_FAILED → FAILED
//! ```
//!
//! One policy instance is built per call and evaluated at most twice
//! (check, then scope). Nothing is cached between calls.

use std::any::Any;
use std::sync::Arc;

use tracing::{debug, debug_span, info, instrument, warn};

use crate::error::{AuthorizeError, AuthorizeResult};
use crate::options::AuthorizeOptions;
use crate::policy::Policy;
use crate::registry::PolicyRegistry;
use crate::request::CurrentRequest;
use crate::resolver::Resolver;
use crate::target::{Resource, Target};

/// Shared, thread-safe entry point holding the frozen registry.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use platform_authorize::{
///     AuthorizeOptions, Authorizer, Binding, Policy, PolicyRegistry, PolicyType,
///     RequestContext, Resource, Scope,
/// };
///
/// struct Post;
/// impl Resource for Post {}
///
/// struct PostAuthorization {
///     binding: Binding<String>,
/// }
///
/// impl Policy<String> for PostAuthorization {
///     fn binding(&self) -> &Binding<String> {
///         &self.binding
///     }
///
///     fn check(&self, rule: &str) -> Option<bool> {
///         match rule {
///             "index?" => Some(true),
///             "show?" => Some(false),
///             _ => None,
///         }
///     }
///
///     fn scope(&self) -> Option<platform_authorize::PolicyResult<Scope>> {
///         Some(Ok(Scope::new(Vec::<u64>::new())))
///     }
/// }
///
/// impl PolicyType<String> for PostAuthorization {
///     fn build(binding: Binding<String>) -> Self {
///         Self { binding }
///     }
/// }
///
/// let mut registry = PolicyRegistry::<String>::new();
/// registry.register::<PostAuthorization>();
/// let authorizer = Authorizer::new(registry);
///
/// let request = RequestContext::new("alice".to_string(), "index");
/// let guard = authorizer.for_request(&request);
///
/// let post = Arc::new(Post);
/// let allowed = guard.authorize(Arc::clone(&post), AuthorizeOptions::new()).unwrap();
/// assert!(Arc::ptr_eq(&allowed, &post));
///
/// let ids: Vec<u64> = guard
///     .authorized_scope(platform_authorize::Target::kind::<Post>(), AuthorizeOptions::new())
///     .unwrap();
/// assert!(ids.is_empty());
/// ```
#[derive(Debug)]
pub struct Authorizer<U> {
    resolver: Resolver<U>,
}

impl<U> Clone for Authorizer<U> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
        }
    }
}

impl<U: Clone + Send + Sync + 'static> Authorizer<U> {
    /// Freeze a registry and build an authorizer over it.
    pub fn new(registry: PolicyRegistry<U>) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    /// Build an authorizer over an already shared registry.
    pub fn from_shared(registry: Arc<PolicyRegistry<U>>) -> Self {
        Self {
            resolver: Resolver::new(registry),
        }
    }

    /// The registry policies are resolved from.
    pub fn registry(&self) -> &PolicyRegistry<U> {
        self.resolver.registry()
    }

    /// The resolver used by every operation.
    pub fn resolver(&self) -> &Resolver<U> {
        &self.resolver
    }

    /// Bind the authorizer to the current request.
    pub fn for_request<'a, R>(&'a self, request: &'a R) -> RequestAuthorizer<'a, U, R>
    where
        R: CurrentRequest<U>,
    {
        RequestAuthorizer {
            authorizer: self,
            request,
        }
    }
}

/// The dispatcher operations, bound to one request.
///
/// The request supplies the default actor and the current action; both can
/// be overridden per call through [`AuthorizeOptions`].
pub struct RequestAuthorizer<'a, U, R> {
    authorizer: &'a Authorizer<U>,
    request: &'a R,
}

impl<'a, U, R> RequestAuthorizer<'a, U, R>
where
    U: Clone + Send + Sync + 'static,
    R: CurrentRequest<U>,
{
    /// Resolve and return the raw policy for manual control.
    ///
    /// A rule override in `options` is ignored.
    pub fn authorization(
        &self,
        target: impl Into<Target>,
        options: AuthorizeOptions<U>,
    ) -> AuthorizeResult<Box<dyn Policy<U>>, U> {
        let (resolve, _) = options.into_parts();
        self.authorizer
            .resolver
            .resolve(self.request, target.into(), resolve)
    }

    /// Check the current action against `target`'s policy.
    ///
    /// Returns the same `Arc` on success so calls can be chained.
    ///
    /// # Errors
    ///
    /// - [`AuthorizeError::NotAuthorized`] when the rule returns false
    /// - [`AuthorizeError::PolicyNotFound`] / [`AuthorizeError::MissingRule`]
    ///   for configuration gaps
    /// - [`AuthorizeError::PolicyFailed`] when the rule itself fails
    #[instrument(
        skip_all,
        fields(resource = T::resource_name(), request_id = ?self.request.request_id())
    )]
    pub fn authorize<T: Resource>(
        &self,
        target: Arc<T>,
        options: AuthorizeOptions<U>,
    ) -> AuthorizeResult<Arc<T>, U> {
        let (resolve, action) = options.into_parts();
        let policy = self.authorizer.resolver.resolve(
            self.request,
            Target::instance(Arc::clone(&target)),
            resolve,
        )?;
        self.check(policy, self.rule_name(action))?;
        Ok(target)
    }

    /// Fetch the policy's scope without any permission check.
    ///
    /// Never consults the current action; a rule override is ignored.
    pub fn authorization_scope<S: Any>(
        &self,
        target: impl Into<Target>,
        options: AuthorizeOptions<U>,
    ) -> AuthorizeResult<S, U> {
        let target = target.into();
        let span = debug_span!(
            "authorization_scope",
            target_name = %target.name(),
            request_id = ?self.request.request_id()
        );
        let _enter = span.enter();

        let (resolve, action) = options.into_parts();
        if let Some(rule) = action {
            debug!(rule = %rule, "Ignoring rule override for unchecked scope");
        }

        let policy = self
            .authorizer
            .resolver
            .resolve(self.request, target, resolve)?;
        fetch_scope(&*policy)
    }

    /// Check the current action, then fetch the scope from the same policy.
    ///
    /// The scope method is only invoked after the check allowed the
    /// request, on the very instance that was checked.
    pub fn authorized_scope<S: Any>(
        &self,
        target: impl Into<Target>,
        options: AuthorizeOptions<U>,
    ) -> AuthorizeResult<S, U> {
        let target = target.into();
        let span = debug_span!(
            "authorized_scope",
            target_name = %target.name(),
            request_id = ?self.request.request_id()
        );
        let _enter = span.enter();

        let (resolve, action) = options.into_parts();
        let policy = self
            .authorizer
            .resolver
            .resolve(self.request, target, resolve)?;
        let policy = self.check(policy, self.rule_name(action))?;
        fetch_scope(&*policy)
    }

    fn rule_name(&self, action: Option<String>) -> String {
        action.unwrap_or_else(|| {
            self.authorizer
                .registry()
                .config()
                .rule_name_for(self.request.action_name())
        })
    }

    fn check(
        &self,
        policy: Box<dyn Policy<U>>,
        rule: String,
    ) -> AuthorizeResult<Box<dyn Policy<U>>, U> {
        match policy.try_check(&rule) {
            Some(Ok(true)) => {
                debug!(policy = policy.name(), rule = %rule, "Allowed");
                Ok(policy)
            }
            Some(Ok(false)) => {
                info!(
                    policy = policy.name(),
                    rule = %rule,
                    request_id = ?self.request.request_id(),
                    "Not authorized"
                );
                Err(AuthorizeError::NotAuthorized { policy, rule })
            }
            Some(Err(source)) => Err(AuthorizeError::PolicyFailed {
                policy: policy.name().to_string(),
                rule,
                source,
            }),
            None => {
                warn!(policy = policy.name(), rule = %rule, "Policy does not declare rule");
                Err(AuthorizeError::MissingRule {
                    policy: policy.name().to_string(),
                    rule,
                })
            }
        }
    }
}

fn fetch_scope<U: 'static, S: Any>(policy: &dyn Policy<U>) -> AuthorizeResult<S, U> {
    match policy.scope() {
        Some(Ok(scope)) => scope
            .downcast::<S>()
            .map_err(|scope| AuthorizeError::ScopeMismatch {
                policy: policy.name().to_string(),
                expected: std::any::type_name::<S>(),
                found: scope.type_name(),
            }),
        Some(Err(source)) => Err(AuthorizeError::PolicyFailed {
            policy: policy.name().to_string(),
            rule: "scope".to_string(),
            source,
        }),
        None => {
            warn!(policy = policy.name(), "Policy does not define a scope");
            Err(AuthorizeError::MissingScope {
                policy: policy.name().to_string(),
            })
        }
    }
}
