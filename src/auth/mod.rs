// Authentication module
// Acquires, caches and rotates the upstream credential bundle

mod fetch;
mod sources;
mod store;
mod types;

pub(crate) use fetch::error_kind;
pub use sources::SourceList;
pub use store::TokenStore;
pub use types::{CacheEntry, Credential, SourceFailure, TokenError, TokenStatus};
