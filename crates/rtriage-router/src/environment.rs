//! Contract of the downstream environment manager.
//!
//! The environment manager owns the per-environment worker queues that run
//! the post-routing stage. The router only reserves environments by name
//! and hands events over; lifecycle and execution stay on the other side
//! of this trait.

use rtriage_event::Document;
use thiserror::Error;

/// An error reported by the environment manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EnvironmentError(pub String);

/// The downstream collaborator receiving routed events.
pub trait EnvironmentManager: Send + Sync {
    /// Reserve the named environment before any route targets it.
    fn add_environment(&self, name: &str) -> Result<(), EnvironmentError>;

    /// Release a previously reserved environment.
    fn delete_environment(&self, name: &str) -> Result<(), EnvironmentError>;

    /// Hand a routed event to its target environment.
    ///
    /// Must be non-blocking enough not to stall router workers; delivery
    /// failures are the manager's concern, not the router's.
    fn forward_event(&self, target: &str, worker: usize, event: Document);
}
