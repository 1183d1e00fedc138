use std::sync::Arc;

use crate::storage::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }
}
