//! The routing engine: registry of prioritized routes plus the worker pool
//! that dispatches dequeued events to their target environments.
//!
//! Registry mutations take the writer lock and persist the table before
//! returning; workers only take the reader lock for the duration of one
//! event's route selection. An event in flight during a reconfiguration
//! uses whichever table snapshot its worker holds.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, TrySendError};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

use rtriage_event::Document;

use crate::environment::EnvironmentManager;
use crate::error::{Result, RouterError};
use crate::queue::EventQueue;
use crate::route::{FilterBuilder, Route};
use crate::store::{ROUTES_TABLE, Store};

/// How long a worker waits on the queue before re-checking the running
/// flag.
const DEQUEUE_TIMEOUT: Duration = Duration::from_secs(1);

/// Engine construction parameters.
#[derive(Debug, Clone, Copy)]
pub struct RouterConfig {
    /// Number of worker threads; fixed for the lifetime of the router and
    /// clamped to at least one.
    pub workers: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig { workers: 4 }
    }
}

/// One row of the route table, as snapshotted and as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub name: String,
    pub priority: u32,
    pub target: String,
}

/// The two consistent registry maps. Keys of `by_priority` equal values of
/// `by_name`, bijectively; each priority bucket holds one route instance
/// per worker.
#[derive(Default)]
struct RouteTable {
    by_name: HashMap<String, u32>,
    by_priority: BTreeMap<u32, Vec<Route>>,
}

struct RouterInner {
    workers: usize,
    table: RwLock<RouteTable>,
    running: AtomicBool,
    queue: Mutex<Option<EventQueue>>,
    builder: Arc<dyn FilterBuilder>,
    environments: Arc<dyn EnvironmentManager>,
    store: Arc<dyn Store>,
}

/// The routing engine.
///
/// Registry operations (`add_route`, `remove_route`,
/// `change_route_priority`, `route_table`, `enqueue_event`) take `&self`
/// and are safe to call from any thread; `run`/`stop` manage the worker
/// pool and take `&mut self`.
pub struct Router {
    inner: Arc<RouterInner>,
    threads: Vec<JoinHandle<()>>,
}

impl Router {
    pub fn new(
        config: RouterConfig,
        builder: Arc<dyn FilterBuilder>,
        environments: Arc<dyn EnvironmentManager>,
        store: Arc<dyn Store>,
    ) -> Self {
        Router {
            inner: Arc::new(RouterInner {
                workers: config.workers.max(1),
                table: RwLock::new(RouteTable::default()),
                running: AtomicBool::new(false),
                queue: Mutex::new(None),
                builder,
                environments,
                store,
            }),
            threads: Vec::new(),
        }
    }

    /// Number of worker threads this router was built for.
    pub fn workers(&self) -> usize {
        self.inner.workers
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------
    // Registry mutations
    // -----------------------------------------------------------------

    /// Register a route: build one filter instance per worker, reserve the
    /// target environment, then insert into both maps.
    ///
    /// A duplicate name or taken priority rolls back the environment
    /// reservation and leaves the registry and its persisted snapshot
    /// untouched.
    pub fn add_route(&self, name: &str, target: &str, priority: u32) -> Result<()> {
        let mut instances = Vec::with_capacity(self.inner.workers);
        for _ in 0..self.inner.workers {
            let filter = self.inner.builder.build(name)?;
            instances.push(Route::new(filter, target, priority));
        }

        self.inner.environments.add_environment(target)?;

        {
            let mut table = self.inner.table.write();
            let conflict = if table.by_name.contains_key(name) {
                Some(RouterError::RouteExists(name.to_string()))
            } else if table.by_priority.contains_key(&priority) {
                Some(RouterError::PriorityTaken(priority))
            } else {
                None
            };
            if let Some(err) = conflict {
                drop(table);
                if let Err(env_err) = self.inner.environments.delete_environment(target) {
                    warn!(%env_err, env = target, "could not roll back environment reservation");
                }
                return Err(err);
            }
            table.by_name.insert(name.to_string(), priority);
            table.by_priority.insert(priority, instances);
        }

        self.persist();
        debug!(route = name, priority, env = target, "route added");
        Ok(())
    }

    /// Unregister a route, release its environment, and persist.
    pub fn remove_route(&self, name: &str) -> Result<()> {
        let target = {
            let mut table = self.inner.table.write();
            let priority = table
                .by_name
                .get(name)
                .copied()
                .ok_or_else(|| RouterError::RouteNotFound(name.to_string()))?;
            let routes = table
                .by_priority
                .remove(&priority)
                .ok_or(RouterError::PriorityNotFound(priority))?;
            table.by_name.remove(name);
            routes
                .first()
                .map(|route| route.target().to_string())
                .unwrap_or_default()
        };

        let released = self.inner.environments.delete_environment(&target);
        self.persist();
        debug!(route = name, env = %target, "route removed");
        released.map_err(RouterError::from)
    }

    /// Move a route to a new priority.
    ///
    /// Returns success immediately when the priority is unchanged, so the
    /// bucket is never removed and re-inserted under its own key.
    pub fn change_route_priority(&self, name: &str, priority: u32) -> Result<()> {
        {
            let mut table = self.inner.table.write();
            let old = table
                .by_name
                .get(name)
                .copied()
                .ok_or_else(|| RouterError::RouteNotFound(name.to_string()))?;
            if old == priority {
                return Ok(());
            }
            if table.by_priority.contains_key(&priority) {
                return Err(RouterError::PriorityTaken(priority));
            }
            let mut routes = table
                .by_priority
                .remove(&old)
                .ok_or(RouterError::PriorityNotFound(old))?;
            for route in &mut routes {
                route.set_priority(priority);
            }
            table.by_priority.insert(priority, routes);
            table.by_name.insert(name.to_string(), priority);
        }

        self.persist();
        debug!(route = name, priority, "route priority changed");
        Ok(())
    }

    /// Snapshot of the route table, sorted by ascending priority.
    pub fn route_table(&self) -> Vec<RouteEntry> {
        let mut entries = {
            let table = self.inner.table.read();
            table
                .by_name
                .iter()
                .filter_map(|(name, priority)| {
                    let bucket = table.by_priority.get(priority);
                    let target = bucket.and_then(|routes| routes.first());
                    match target {
                        Some(route) => Some(RouteEntry {
                            name: name.clone(),
                            priority: *priority,
                            target: route.target().to_string(),
                        }),
                        None => {
                            error!(route = %name, priority, "registry maps out of sync");
                            None
                        }
                    }
                })
                .collect::<Vec<_>>()
        };
        entries.sort_by_key(|entry| entry.priority);
        entries
    }

    /// Serialize the table and rewrite the persisted snapshot.
    ///
    /// A store failure is fatal to process integrity: the in-memory table
    /// and its mirror must never diverge, so the process exits.
    fn persist(&self) {
        let entries = self.route_table();
        let value = match serde_json::to_value(&entries) {
            Ok(value) => value,
            Err(err) => {
                error!(%err, "could not serialize the route table");
                std::process::exit(10);
            }
        };
        if let Err(err) = self.inner.store.update(ROUTES_TABLE, value) {
            error!(%err, "could not persist the route table");
            std::process::exit(10);
        }
    }

    // -----------------------------------------------------------------
    // Engine control
    // -----------------------------------------------------------------

    /// Start the worker pool over the given ingress queue.
    pub fn run(&mut self, queue: EventQueue) -> Result<()> {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return Err(RouterError::AlreadyRunning);
        }
        *self.inner.queue.lock() = Some(queue.clone());

        for worker in 0..self.inner.workers {
            let inner = Arc::clone(&self.inner);
            let queue = queue.clone();
            self.threads
                .push(thread::spawn(move || worker_loop(&inner, &queue, worker)));
        }
        Ok(())
    }

    /// Stop the worker pool and wait for every worker to exit.
    ///
    /// Idempotent; a later `run` restarts the engine.
    pub fn stop(&mut self) {
        if !self.inner.running.load(Ordering::Acquire) {
            return;
        }
        self.inner.running.store(false, Ordering::Relaxed);
        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                error!("router worker panicked");
            }
        }
        debug!("router stopped");
    }

    /// Enqueue an event without blocking.
    pub fn enqueue_event(&self, event: Document) -> Result<()> {
        if !self.inner.running.load(Ordering::Acquire) {
            return Err(RouterError::QueueNotReady);
        }
        let queue = self.inner.queue.lock().clone();
        match queue {
            Some(queue) => match queue.try_enqueue(event) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(_)) => Err(RouterError::QueueFull),
                Err(TrySendError::Disconnected(_)) => Err(RouterError::QueueNotReady),
            },
            None => Err(RouterError::QueueNotReady),
        }
    }
}

impl Drop for Router {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One worker: dequeue, select the lowest-priority accepting route under
/// the reader lock, release the lock, forward. Events no route accepts are
/// dropped; observability of drops is the caller's concern.
fn worker_loop(inner: &Arc<RouterInner>, queue: &EventQueue, worker: usize) {
    while inner.running.load(Ordering::Acquire) {
        let mut event = match queue.dequeue_timeout(DEQUEUE_TIMEOUT) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let selected = {
            let table = inner.table.read();
            let mut selected = None;
            for routes in table.by_priority.values() {
                if let Some(route) = routes.get(worker)
                    && route.accept(&mut event)
                {
                    selected = Some(route.target().to_string());
                    break;
                }
            }
            selected
        };

        match selected {
            Some(target) => inner.environments.forward_event(&target, worker, event),
            None => trace!(worker, "no route accepted the event; dropped"),
        }
    }
    debug!(worker, "router worker finished");
}
