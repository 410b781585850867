pub mod auth;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod reconciler;
pub mod search;
pub mod store;
pub mod testing;

pub mod prelude {
    pub use crate::auth::{AuthGate, SessionAuth};
    pub use crate::backend::{GraphqlBackend, WriteBackend};
    pub use crate::catalog::CatalogRecord;
    pub use crate::config::Config;
    pub use crate::error::{BookError, Result, SaveError, SearchError};
    pub use crate::reconciler::{SaveReconciler, SearchOutcome, SearchSession};
    pub use crate::search::{GoogleBooksProvider, SearchNormalizer, SearchProvider};
    pub use crate::store::{FileKvStore, InMemoryKvStore, KeyValueStore, SavedIdStore};
}
