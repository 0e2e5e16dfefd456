//! Shared fixtures: a small blog with users, posts and their policies.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use platform_authorize::{
    Authorizer, Binding, Policy, PolicyError, PolicyRegistry, PolicyResult, PolicyType,
    RequestContext, Resource, Scope,
};

/// The acting user.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub name: String,
}

impl User {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// A blog post.
#[derive(Debug, PartialEq)]
pub struct Post {
    pub id: u64,
    pub author: String,
}

impl Resource for Post {}

/// A comment; its policy declares rules but no scope.
#[derive(Debug)]
pub struct Comment;

impl Resource for Comment {}

/// An audit entry; its policy consults a collaborator that can fail.
#[derive(Debug)]
pub struct AuditLog;

impl Resource for AuditLog {}

/// A type nobody wrote a policy for.
#[derive(Debug)]
pub struct WithoutAuthorization;

impl Resource for WithoutAuthorization {}

/// Policy for posts: `index?` and `custom?` allow, `show?` denies,
/// `update?` allows the author only.
pub struct PostAuthorization {
    binding: Binding<User>,
    scope_calls: Arc<AtomicUsize>,
}

impl PostAuthorization {
    pub fn with_probe(binding: Binding<User>, scope_calls: Arc<AtomicUsize>) -> Self {
        Self {
            binding,
            scope_calls,
        }
    }
}

impl Policy<User> for PostAuthorization {
    fn binding(&self) -> &Binding<User> {
        &self.binding
    }

    fn check(&self, rule: &str) -> Option<bool> {
        match rule {
            "index?" | "custom?" => Some(true),
            "show?" => Some(false),
            "update?" => Some(
                self.binding
                    .resource::<Post>()
                    .is_some_and(|post| post.author == self.binding.actor().name),
            ),
            _ => None,
        }
    }

    fn scope(&self) -> Option<PolicyResult<Scope>> {
        self.scope_calls.fetch_add(1, Ordering::SeqCst);
        Some(Ok(Scope::new(Vec::<Arc<Post>>::new())))
    }
}

impl PolicyType<User> for PostAuthorization {
    fn build(binding: Binding<User>) -> Self {
        Self::with_probe(binding, Arc::new(AtomicUsize::new(0)))
    }
}

pub struct CommentAuthorization {
    binding: Binding<User>,
}

impl Policy<User> for CommentAuthorization {
    fn binding(&self) -> &Binding<User> {
        &self.binding
    }

    fn check(&self, rule: &str) -> Option<bool> {
        match rule {
            "index?" => Some(true),
            _ => None,
        }
    }
}

impl PolicyType<User> for CommentAuthorization {
    fn build(binding: Binding<User>) -> Self {
        Self { binding }
    }
}

pub struct AuditLogAuthorization {
    binding: Binding<User>,
}

impl Policy<User> for AuditLogAuthorization {
    fn binding(&self) -> &Binding<User> {
        &self.binding
    }

    fn try_check(&self, rule: &str) -> Option<PolicyResult<bool>> {
        match rule {
            "index?" => Some(Err(PolicyError::new("audit service unavailable"))),
            _ => None,
        }
    }

    fn scope(&self) -> Option<PolicyResult<Scope>> {
        Some(Err(PolicyError::new("audit service unavailable")))
    }
}

impl PolicyType<User> for AuditLogAuthorization {
    fn build(binding: Binding<User>) -> Self {
        Self { binding }
    }
}

/// Answers every rule with a fixed value and records what it was asked.
pub struct RecordingPolicy {
    binding: Binding<User>,
    answer: bool,
    checked: Arc<Mutex<Vec<String>>>,
    scope_calls: Arc<AtomicUsize>,
}

impl RecordingPolicy {
    pub fn new(binding: Binding<User>, answer: bool) -> Self {
        Self {
            binding,
            answer,
            checked: Arc::new(Mutex::new(Vec::new())),
            scope_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn checked(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.checked)
    }

    pub fn scope_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.scope_calls)
    }
}

impl Policy<User> for RecordingPolicy {
    fn binding(&self) -> &Binding<User> {
        &self.binding
    }

    fn check(&self, rule: &str) -> Option<bool> {
        self.checked.lock().unwrap().push(rule.to_string());
        Some(self.answer)
    }

    fn scope(&self) -> Option<PolicyResult<Scope>> {
        self.scope_calls.fetch_add(1, Ordering::SeqCst);
        Some(Ok(Scope::new(vec!["recorded".to_string()])))
    }
}

pub fn current_user() -> User {
    User::new("Current user")
}

pub fn post() -> Arc<Post> {
    Arc::new(Post {
        id: 1,
        author: "Current user".to_string(),
    })
}

pub fn request(action: &str) -> RequestContext<User> {
    RequestContext::new(current_user(), action)
}

pub fn registry() -> PolicyRegistry<User> {
    let mut registry = PolicyRegistry::new();
    registry
        .register::<PostAuthorization>()
        .register::<CommentAuthorization>()
        .register::<AuditLogAuthorization>();
    registry
}

pub fn authorizer() -> Authorizer<User> {
    Authorizer::new(registry())
}

/// Authorizer whose `PostAuthorization` counts scope invocations.
pub fn probed_authorizer() -> (Authorizer<User>, Arc<AtomicUsize>) {
    let scope_calls = Arc::new(AtomicUsize::new(0));
    let probe = Arc::clone(&scope_calls);

    let mut registry = registry();
    registry.register_as("PostAuthorization", move |binding| -> Box<dyn Policy<User>> {
        Box::new(PostAuthorization::with_probe(binding, Arc::clone(&probe)))
    });

    (Authorizer::new(registry), scope_calls)
}
