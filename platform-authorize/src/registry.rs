//! # Policy Registry
//!
//! Maps policy names to constructors. The registry is filled at startup and
//! then frozen behind an `Arc` inside [`crate::Authorizer`], so lookups need
//! no locking and a miss is a plain `None`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::config::AuthorizeConfig;
use crate::policy::{Binding, Policy, PolicyType};

/// Constructor for a policy bound to one `(actor, target, context)`.
pub type PolicyFactory<U> = Arc<dyn Fn(Binding<U>) -> Box<dyn Policy<U>> + Send + Sync>;

/// Build a factory for a policy type.
pub fn factory_for<U: 'static, P: PolicyType<U>>() -> PolicyFactory<U> {
    Arc::new(|binding| -> Box<dyn Policy<U>> { Box::new(P::build(binding)) })
}

/// Registry of policies keyed by policy name.
///
/// # Example
///
/// ```
/// use platform_authorize::{Binding, Policy, PolicyRegistry, PolicyType};
///
/// struct PostAuthorization {
///     binding: Binding<String>,
/// }
///
/// impl Policy<String> for PostAuthorization {
///     fn binding(&self) -> &Binding<String> {
///         &self.binding
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
///
/// assert_eq!(registry.policy_name_for("Post"), "PostAuthorization");
/// assert!(registry.contains("PostAuthorization"));
/// ```
pub struct PolicyRegistry<U> {
    factories: HashMap<String, PolicyFactory<U>>,
    config: AuthorizeConfig,
}

impl<U: 'static> PolicyRegistry<U> {
    /// Create an empty registry with the default naming conventions.
    pub fn new() -> Self {
        Self::with_config(AuthorizeConfig::default())
    }

    /// Create an empty registry with custom naming conventions.
    pub fn with_config(config: AuthorizeConfig) -> Self {
        Self {
            factories: HashMap::new(),
            config,
        }
    }

    /// Naming conventions in use.
    pub fn config(&self) -> &AuthorizeConfig {
        &self.config
    }

    /// Register a policy type under its policy name.
    pub fn register<P: PolicyType<U>>(&mut self) -> &mut Self {
        self.insert(P::policy_name().to_string(), factory_for::<U, P>())
    }

    /// Register a constructor under an explicit policy name.
    ///
    /// Useful for policies that need extra collaborators captured at
    /// startup, or for names that differ from the Rust type name.
    pub fn register_as<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(Binding<U>) -> Box<dyn Policy<U>> + Send + Sync + 'static,
    {
        self.insert(name.into(), Arc::new(factory))
    }

    fn insert(&mut self, name: String, factory: PolicyFactory<U>) -> &mut Self {
        if self.factories.insert(name.clone(), factory).is_some() {
            warn!(policy = %name, "Replaced previously registered policy");
        }
        self
    }

    /// Look up a constructor by policy name.
    pub fn get(&self, name: &str) -> Option<&PolicyFactory<U>> {
        self.factories.get(name)
    }

    /// Check if a policy name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Policy name the convention derives for a target name.
    pub fn policy_name_for(&self, target_name: &str) -> String {
        self.config.policy_name_for(target_name)
    }

    /// Registered policy names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered policies.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl<U: 'static> Default for PolicyRegistry<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> fmt::Debug for PolicyRegistry<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort_unstable();
        f.debug_struct("PolicyRegistry")
            .field("policies", &names)
            .field("config", &self.config)
            .finish()
    }
}
