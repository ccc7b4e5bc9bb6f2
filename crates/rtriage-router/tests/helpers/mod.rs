use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rtriage_router::testing::{MemStore, RecordingEnvironments, TableFilterBuilder};
use rtriage_router::{ROUTES_TABLE, Router, RouterConfig};
use serde_json::Value;

pub struct Harness {
    pub builder: Arc<TableFilterBuilder>,
    pub environments: Arc<RecordingEnvironments>,
    pub store: Arc<MemStore>,
    pub router: Router,
}

pub fn harness(workers: usize) -> Harness {
    let builder = Arc::new(TableFilterBuilder::new());
    let environments = Arc::new(RecordingEnvironments::new());
    let store = Arc::new(MemStore::new());
    let builder_handle: Arc<dyn rtriage_router::FilterBuilder> = builder.clone() as Arc<dyn rtriage_router::FilterBuilder>;
    let env_handle: Arc<dyn rtriage_router::EnvironmentManager> = environments.clone() as Arc<dyn rtriage_router::EnvironmentManager>;
    let store_handle: Arc<dyn rtriage_router::Store> = store.clone() as Arc<dyn rtriage_router::Store>;
    let router = Router::new(RouterConfig { workers }, builder_handle, env_handle, store_handle);
    Harness {
        builder,
        environments,
        store,
        router,
    }
}

impl Harness {
    /// The persisted route-table snapshot, as stored.
    pub fn snapshot(&self) -> Option<Value> {
        self.store.value(ROUTES_TABLE)
    }
}

/// Poll `cond` until it holds or the timeout elapses.
pub fn wait_for(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    cond()
}
