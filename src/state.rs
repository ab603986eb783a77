use crate::storage::Storage;
use crate::store::VisitStore;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handlers take the lock for a whole load-mutate-save cycle, so requests
/// never interleave on the record.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<VisitStore>>,
}

impl AppState {
    pub fn new(storage: Storage) -> Self {
        Self {
            store: Arc::new(Mutex::new(VisitStore::new(storage))),
        }
    }
}
