//! # Policies
//!
//! A policy decides what one actor may do with one target. Each policy is
//! built fresh for a single check, bound to `(actor, target, context)`, and
//! answers rules by name (`index?`, `show?`, ...) plus an optional scope.

use std::any::Any;
use std::fmt;

use thiserror::Error;

use crate::context::Context;
use crate::target::{simple_type_name, Target};

/// Failure raised by a fallible rule or scope.
///
/// This is distinct from a denial: a rule that cannot answer is reported as
/// [`crate::AuthorizeError::PolicyFailed`], never as "not authorized".
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Free-form failure message
    #[error("{0}")]
    Message(String),

    /// Failure from a collaborator the policy consulted
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl PolicyError {
    /// Create a policy error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        PolicyError::Message(message.into())
    }
}

/// Result type for fallible policy rules.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// The `(actor, target, context)` triple a policy is built with.
///
/// Fields are private and only exposed by reference, so a binding cannot
/// change once the policy owning it has been constructed.
#[derive(Clone)]
pub struct Binding<U> {
    actor: U,
    target: Target,
    context: Context,
}

impl<U> Binding<U> {
    /// Bind an actor, a target and a context together.
    pub fn new(actor: U, target: impl Into<Target>, context: Context) -> Self {
        Self {
            actor,
            target: target.into(),
            context,
        }
    }

    /// The acting user.
    pub fn actor(&self) -> &U {
        &self.actor
    }

    /// The target being checked.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Auxiliary request data.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Typed access to an instance target.
    ///
    /// Returns `None` for type markers, or when the target is not a `T`
    /// (a policy selected explicitly may be handed an unrelated target).
    pub fn resource<T: Any>(&self) -> Option<&T> {
        self.target.downcast_ref::<T>()
    }

    /// Consume and return all three parts.
    pub fn into_parts(self) -> (U, Target, Context) {
        (self.actor, self.target, self.context)
    }
}

impl<U: fmt::Debug> fmt::Debug for Binding<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("actor", &self.actor)
            .field("target", &self.target)
            .field("context", &self.context)
            .finish()
    }
}

/// Type-erased value produced by a policy's scope method.
///
/// Callers recover the concrete type with [`Scope::downcast`]; the
/// dispatcher reports a mismatch as a configuration error.
pub struct Scope {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl Scope {
    /// Wrap a scope value (usually a filtered collection or query).
    pub fn new<S: Any + Send>(value: S) -> Self {
        Self {
            value: Box::new(value),
            type_name: std::any::type_name::<S>(),
        }
    }

    /// Full type name of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Check whether the wrapped value is an `S`.
    pub fn is<S: Any>(&self) -> bool {
        self.value.is::<S>()
    }

    /// Recover the wrapped value, or get the scope back on a type mismatch.
    pub fn downcast<S: Any>(self) -> Result<S, Self> {
        let type_name = self.type_name;
        match self.value.downcast::<S>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self { value, type_name }),
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// A policy instance bound to one `(actor, target, context)` triple.
///
/// Rules are looked up by name. A policy answers `Some(bool)` for the rules
/// it declares and `None` for anything else; `None` is reported as a missing
/// rule and is never confused with a denial.
///
/// Implement [`Policy::check`] for infallible rules, or override
/// [`Policy::try_check`] when a rule can fail.
///
/// # Example
///
/// ```
/// use platform_authorize::{Binding, Policy, PolicyType};
///
/// struct Report;
///
/// struct ReportAuthorization {
///     binding: Binding<String>,
/// }
///
/// impl Policy<String> for ReportAuthorization {
///     fn binding(&self) -> &Binding<String> {
///         &self.binding
///     }
///
///     fn check(&self, rule: &str) -> Option<bool> {
///         match rule {
///             "index?" => Some(true),
///             "destroy?" => Some(self.binding.actor() == "admin"),
///             _ => None,
///         }
///     }
/// }
///
/// impl PolicyType<String> for ReportAuthorization {
///     fn build(binding: Binding<String>) -> Self {
///         Self { binding }
///     }
/// }
///
/// assert_eq!(ReportAuthorization::policy_name(), "ReportAuthorization");
/// ```
pub trait Policy<U>: Send + Sync {
    /// Name of the policy type, used in errors and logs.
    fn name(&self) -> &'static str {
        simple_type_name::<Self>()
    }

    /// The triple this policy was constructed with.
    fn binding(&self) -> &Binding<U>;

    /// Evaluate a declared rule. `None` means the rule is not declared.
    fn check(&self, rule: &str) -> Option<bool> {
        let _ = rule;
        None
    }

    /// Evaluate a rule that may fail.
    fn try_check(&self, rule: &str) -> Option<PolicyResult<bool>> {
        self.check(rule).map(Ok)
    }

    /// Produce the collection view this actor may see. `None` means the
    /// policy has no scope.
    fn scope(&self) -> Option<PolicyResult<Scope>> {
        None
    }
}

impl<U> fmt::Debug for dyn Policy<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let binding = self.binding();
        f.debug_struct("Policy")
            .field("name", &self.name())
            .field("target", binding.target())
            .field("context", binding.context())
            .finish()
    }
}

/// A policy that can be registered and constructed by the resolver.
pub trait PolicyType<U>: Policy<U> + Sized + 'static {
    /// Registry name; defaults to the simple type name.
    fn policy_name() -> &'static str {
        simple_type_name::<Self>()
    }

    /// Construct the policy for one check.
    fn build(binding: Binding<U>) -> Self;
}
