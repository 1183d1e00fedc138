pub mod cache;
pub mod persistence;
pub mod store;

pub use cache::RecordCache;
pub use persistence::{CollectionFile, DurabilityMode};
pub use store::{RecordStore, StoreOptions};
