//! # rtriage-router
//!
//! The routing core of the rtriage ingestion engine.
//!
//! Raw events land on a bounded in-memory queue; a fixed pool of worker
//! threads dequeues them, walks the route table in ascending priority
//! order, and hands each event to the first environment whose filter
//! accepts it. The table supports live reconfiguration under load: workers
//! take reader locks per event, mutations take the writer lock, and every
//! successful mutation is mirrored into the persisted store before it
//! returns.
//!
//! ## Architecture
//!
//! - **Registry**: `name → priority` and `priority → routes` maps, one
//!   filter replica per worker, guarded by a single reader/writer lock.
//! - **Engine**: N worker threads with a cooperative atomic stop flag and
//!   a 1 s dequeue timeout; FIFO per worker, no cross-worker ordering.
//! - **Sessions**: a thread-safe catalogue binding policies, filters and
//!   routes under named lifespans.
//! - **Contracts**: the expression builder ([`FilterBuilder`]), the
//!   environment manager and the persisted store stay behind traits; test
//!   doubles live in [`testing`].
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use rtriage_router::{Router, RouterConfig};
//! use rtriage_router::testing::{MemStore, RecordingEnvironments, TableFilterBuilder};
//!
//! let builder = Arc::new(TableFilterBuilder::new());
//! builder.insert_accept_all("default");
//!
//! let router = Router::new(
//!     RouterConfig::default(),
//!     builder,
//!     Arc::new(RecordingEnvironments::new()),
//!     Arc::new(MemStore::new()),
//! );
//!
//! router.add_route("default", "main_env", 100).unwrap();
//! let table = router.route_table();
//! assert_eq!(table[0].target, "main_env");
//! ```

pub mod api;
pub mod environment;
pub mod error;
pub mod queue;
pub mod route;
pub mod router;
pub mod session;
pub mod store;
pub mod testing;

pub use api::{Response, dispatch};
pub use environment::{EnvironmentError, EnvironmentManager};
pub use error::{Result, RouterError};
pub use queue::EventQueue;
pub use route::{FilterBuilder, Route};
pub use router::{RouteEntry, Router, RouterConfig};
pub use session::{Session, SessionError, SessionManager};
pub use store::{ROUTES_TABLE, Store, StoreError};
