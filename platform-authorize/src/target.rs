//! # Targets
//!
//! The thing being checked: either a concrete resource instance or a type
//! marker standing in for a whole collection (used by scope checks).
//! The dispatcher only ever reads a target's simple type name.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Strip the module path and generic arguments from a type name.
///
/// # Example
///
/// ```
/// use platform_authorize::simple_type_name;
///
/// assert_eq!(simple_type_name::<String>(), "String");
/// assert_eq!(simple_type_name::<Vec<String>>(), "Vec");
/// ```
pub fn simple_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// An application type that policies can be resolved for.
///
/// The resource name is the key of the naming convention: a `Post` is
/// handled by the policy registered as `PostAuthorization`.
pub trait Resource: Any + Send + Sync {
    /// Name used for policy lookup; defaults to the simple type name.
    fn resource_name() -> &'static str {
        simple_type_name::<Self>()
    }
}

/// A target handed to a policy.
#[derive(Clone)]
pub struct Target {
    name: Cow<'static, str>,
    instance: Option<Arc<dyn Any + Send + Sync>>,
}

impl Target {
    /// A concrete resource instance.
    pub fn instance<T: Resource>(value: Arc<T>) -> Self {
        let instance: Arc<dyn Any + Send + Sync> = value;
        Self {
            name: Cow::Borrowed(T::resource_name()),
            instance: Some(instance),
        }
    }

    /// A type marker for `T`, used when there is no instance (scopes).
    pub fn kind<T: Resource>() -> Self {
        Self::named(T::resource_name())
    }

    /// A bare type marker with no Rust type behind it.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            instance: None,
        }
    }

    /// Simple type name used for policy lookup.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when this target is a type marker rather than an instance.
    pub fn is_kind(&self) -> bool {
        self.instance.is_none()
    }

    /// Borrow the instance as a `T`, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.instance.as_deref()?.downcast_ref::<T>()
    }

    /// Get a shared handle to the instance as a `T`, if it is one.
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.instance.clone()?.downcast::<T>().ok()
    }
}

impl<T: Resource> From<Arc<T>> for Target {
    fn from(value: Arc<T>) -> Self {
        Target::instance(value)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("is_kind", &self.is_kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod blog {
        pub struct Post;
        pub struct Page<T>(pub T);
    }

    impl Resource for blog::Post {}

    struct Renamed;

    impl Resource for Renamed {
        fn resource_name() -> &'static str {
            "Article"
        }
    }

    #[test]
    fn test_simple_type_name() {
        assert_eq!(simple_type_name::<blog::Post>(), "Post");
        assert_eq!(simple_type_name::<blog::Page<blog::Post>>(), "Page");
        assert_eq!(simple_type_name::<u32>(), "u32");
    }

    #[test]
    fn test_instance_target() {
        let post = Arc::new(blog::Post);
        let target = Target::from(Arc::clone(&post));

        assert_eq!(target.name(), "Post");
        assert!(!target.is_kind());
        assert!(target.downcast_ref::<blog::Post>().is_some());
        assert!(target.downcast_ref::<Renamed>().is_none());

        let shared = target.downcast_arc::<blog::Post>().unwrap();
        assert!(Arc::ptr_eq(&shared, &post));
    }

    #[test]
    fn test_kind_target() {
        let target = Target::kind::<blog::Post>();
        assert_eq!(target.name(), "Post");
        assert!(target.is_kind());
        assert!(target.downcast_ref::<blog::Post>().is_none());
    }

    #[test]
    fn test_custom_resource_name() {
        assert_eq!(Target::kind::<Renamed>().name(), "Article");
        assert_eq!(Target::named("Dashboard").name(), "Dashboard");
    }
}
