//! Router error types.

use thiserror::Error;

use crate::environment::EnvironmentError;

/// Errors from registry mutations and the engine control surface.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A route with this name is already registered.
    #[error("route '{0}' already exists")]
    RouteExists(String),

    /// Another route already holds this priority.
    #[error("priority '{0}' already taken")]
    PriorityTaken(u32),

    /// No route with this name is registered.
    #[error("route '{0}' not found")]
    RouteNotFound(String),

    /// The priority index has no bucket for this priority.
    #[error("priority '{0}' not found")]
    PriorityNotFound(u32),

    /// `run` was called while the engine is running.
    #[error("the router is already running")]
    AlreadyRunning,

    /// The engine is stopped or holds no ingress queue.
    #[error("the router queue is not initialized")]
    QueueNotReady,

    /// The bounded ingress queue rejected the event; callers implement
    /// backpressure.
    #[error("the router queue is in high load")]
    QueueFull,

    /// The environment manager refused a reservation.
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    /// A route filter failed to compile.
    #[error(transparent)]
    Build(#[from] rtriage_helpers::BuildError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, RouterError>;
