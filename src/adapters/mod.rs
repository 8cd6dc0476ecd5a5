// Adapters layer: concrete implementations for external systems (storage, search index).

pub mod algolia;
pub mod storage;

pub use algolia::{AlgoliaIndex, AlgoliaSettings};
pub use storage::LocalStorage;
