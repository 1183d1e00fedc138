use crate::core::Record;
use tokio::sync::RwLock;

/// Listing cache served by the root route.
///
/// Holds the collection as last loaded through the store. Every committed
/// mutation invalidates it and bumps the generation, so a fill that raced a
/// mutation is discarded instead of resurrecting the older snapshot. Edits
/// made to the backing file by other processes are not observed until the
/// next invalidation.
#[derive(Debug, Default)]
pub struct RecordCache {
    state: RwLock<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    records: Option<Vec<Record>>,
    generation: u64,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached snapshot together with the generation it belongs to.
    pub async fn get(&self) -> (Option<Vec<Record>>, u64) {
        let state = self.state.read().await;
        (state.records.clone(), state.generation)
    }

    /// Stores `records` unless a mutation happened since `generation` was read.
    pub async fn fill(&self, generation: u64, records: Vec<Record>) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return false;
        }
        state.records = Some(records);
        true
    }

    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.records = None;
        state.generation = state.generation.wrapping_add(1);
    }

    pub async fn is_primed(&self) -> bool {
        self.state.read().await.records.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fill_then_get_returns_snapshot() {
        let cache = RecordCache::new();
        let (cached, generation) = cache.get().await;
        assert!(cached.is_none());
        assert!(cache.fill(generation, vec![Record::new(1, "A", "red", "2020")]).await);
        assert_eq!(cache.get().await.0.map(|records| records.len()), Some(1));
    }

    #[tokio::test]
    async fn invalidate_clears_and_rejects_stale_fill() {
        let cache = RecordCache::new();
        let (_, generation) = cache.get().await;
        cache.fill(generation, Vec::new()).await;
        assert!(cache.is_primed().await);

        cache.invalidate().await;
        assert!(!cache.is_primed().await);
        assert!(!cache.fill(generation, Vec::new()).await);
        assert!(!cache.is_primed().await);
    }
}
