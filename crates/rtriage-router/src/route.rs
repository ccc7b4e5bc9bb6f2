//! Routes and the filter-builder contract.

use rtriage_event::Document;
use rtriage_helpers::{BuildError, Term};

/// A classification route: a boolean filter term, a target environment
/// name, and a dispatch priority.
#[derive(Debug, Clone)]
pub struct Route {
    filter: Term,
    target: String,
    priority: u32,
}

impl Route {
    pub fn new(filter: Term, target: impl Into<String>, priority: u32) -> Self {
        Route {
            filter,
            target: target.into(),
            priority,
        }
    }

    /// Whether this route's filter accepts the event.
    pub fn accept(&self, event: &mut Document) -> bool {
        self.filter.accepts(event)
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub(crate) fn set_priority(&mut self, priority: u32) {
        self.priority = priority;
    }
}

/// Output contract of the expression builder.
///
/// The builder owns the association between a route name and its filter
/// expression; every call compiles a fresh term instance, so the router
/// can hold one independent replica per worker (terms are allowed to carry
/// per-instance state).
pub trait FilterBuilder: Send + Sync {
    fn build(&self, route_name: &str) -> Result<Term, BuildError>;
}
