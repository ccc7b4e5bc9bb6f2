//! Session catalogue: named bindings of a policy, a filter and a route.
//!
//! The manager is an injectable value constructed by the embedding runtime
//! and passed by reference to whatever needs it; tests build their own
//! instances instead of sharing a hidden global.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

/// Errors from session creation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session '{0}' already exists")]
    NameExists(String),

    /// A policy backs at most one live session.
    #[error("policy '{policy}' is already assigned to route '{route}'")]
    PolicyBound { policy: String, route: String },

    #[error("route '{0}' is already bound to a session")]
    RouteBound(String),
}

/// A managed binding of a policy, filter and route under a named lifespan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: u32,
    pub name: String,
    pub policy: String,
    pub filter: String,
    pub route: String,
    /// Seconds the session is meant to live; expiry is enforced by an
    /// external reaper, not by the manager.
    pub lifespan: u32,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
struct SessionIndex {
    /// name → session
    sessions: HashMap<String, Session>,
    /// route name → session name
    routes: HashMap<String, String>,
    /// policy name → route name
    policies: HashMap<String, String>,
}

/// Thread-safe session catalogue with O(1) lookups by name, policy and
/// route.
#[derive(Default)]
pub struct SessionManager {
    index: RwLock<SessionIndex>,
}

impl SessionManager {
    pub fn new() -> Self {
        SessionManager::default()
    }

    /// Create a session, assigning its random id and creation timestamp.
    ///
    /// Fails when the name is already active, the policy already backs a
    /// session, or the route is already bound; all three indexes are
    /// updated atomically on success.
    pub fn create(
        &self,
        name: &str,
        policy: &str,
        filter: &str,
        route: &str,
        lifespan: u32,
        description: &str,
    ) -> Result<Session, SessionError> {
        let mut index = self.index.write();

        if index.sessions.contains_key(name) {
            return Err(SessionError::NameExists(name.to_string()));
        }
        if let Some(bound_route) = index.policies.get(policy) {
            return Err(SessionError::PolicyBound {
                policy: policy.to_string(),
                route: bound_route.clone(),
            });
        }
        if index.routes.contains_key(route) {
            return Err(SessionError::RouteBound(route.to_string()));
        }

        let session = Session {
            id: rand::random(),
            name: name.to_string(),
            policy: policy.to_string(),
            filter: filter.to_string(),
            route: route.to_string(),
            lifespan,
            description: description.to_string(),
            created_at: Utc::now(),
        };
        index.sessions.insert(name.to_string(), session.clone());
        index.routes.insert(route.to_string(), name.to_string());
        index.policies.insert(policy.to_string(), route.to_string());

        debug!(
            id = session.id,
            session = name,
            policy,
            route,
            lifespan,
            "session created"
        );
        Ok(session)
    }

    /// Look up a session by name.
    pub fn get(&self, name: &str) -> Option<Session> {
        self.index.read().sessions.get(name).cloned()
    }

    /// Names of all active sessions.
    pub fn list(&self) -> Vec<String> {
        self.index.read().sessions.keys().cloned().collect()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.index.read().sessions.contains_key(name)
    }

    /// Delete one session, removing all three index entries atomically.
    /// Returns whether a session was removed.
    pub fn delete(&self, name: &str) -> bool {
        let mut index = self.index.write();
        match index.sessions.remove(name) {
            Some(session) => {
                index.routes.remove(&session.route);
                index.policies.remove(&session.policy);
                true
            }
            None => false,
        }
    }

    /// Delete every active session.
    pub fn delete_all(&self) {
        let mut index = self.index.write();
        index.sessions.clear();
        index.routes.clear();
        index.policies.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(manager: &SessionManager, name: &str, policy: &str, route: &str) -> Result<Session, SessionError> {
        manager.create(name, policy, "default_filter", route, 3600, "test session")
    }

    #[test]
    fn test_create_assigns_id_and_timestamp() {
        let manager = SessionManager::new();
        let before = Utc::now();
        let session = create(&manager, "s1", "p1", "r1").unwrap();
        assert_eq!(session.name, "s1");
        assert!(session.created_at >= before);
        assert!(manager.exists("s1"));
        assert_eq!(manager.get("s1"), Some(session));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let manager = SessionManager::new();
        create(&manager, "s1", "p1", "r1").unwrap();
        let err = create(&manager, "s1", "p2", "r2").unwrap_err();
        assert_eq!(err, SessionError::NameExists("s1".to_string()));
    }

    #[test]
    fn test_policy_backs_at_most_one_session() {
        let manager = SessionManager::new();
        create(&manager, "s1", "p1", "r1").unwrap();
        let err = create(&manager, "s2", "p1", "r2").unwrap_err();
        assert_eq!(
            err,
            SessionError::PolicyBound {
                policy: "p1".to_string(),
                route: "r1".to_string(),
            }
        );
    }

    #[test]
    fn test_route_bound_once() {
        let manager = SessionManager::new();
        create(&manager, "s1", "p1", "r1").unwrap();
        let err = create(&manager, "s2", "p2", "r1").unwrap_err();
        assert_eq!(err, SessionError::RouteBound("r1".to_string()));
    }

    #[test]
    fn test_delete_releases_all_bindings() {
        let manager = SessionManager::new();
        create(&manager, "s1", "p1", "r1").unwrap();
        assert!(manager.delete("s1"));
        assert!(!manager.delete("s1"));
        assert!(!manager.exists("s1"));
        // Name, policy and route are all free again.
        create(&manager, "s1", "p1", "r1").unwrap();
    }

    #[test]
    fn test_delete_all() {
        let manager = SessionManager::new();
        create(&manager, "s1", "p1", "r1").unwrap();
        create(&manager, "s2", "p2", "r2").unwrap();
        assert_eq!(manager.list().len(), 2);
        manager.delete_all();
        assert!(manager.list().is_empty());
        // Previously bound policies and routes are reusable.
        create(&manager, "s3", "p1", "r2").unwrap();
    }

    #[test]
    fn test_list_names() {
        let manager = SessionManager::new();
        create(&manager, "s1", "p1", "r1").unwrap();
        create(&manager, "s2", "p2", "r2").unwrap();
        let mut names = manager.list();
        names.sort();
        assert_eq!(names, vec!["s1".to_string(), "s2".to_string()]);
    }
}
