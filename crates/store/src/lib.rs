//! Vector similarity store clients for rentier.
//!
//! Two `PropertyIndex` implementations:
//! - [`RpcPropertyIndex`] — calls a PostgREST-style similarity RPC on a
//!   hosted Postgres service (the production store).
//! - [`InMemoryPropertyIndex`] — pure-Rust cosine search over records
//!   registered at startup, for development and tests.

pub mod in_memory;
pub mod rpc;
pub mod vector;

pub use in_memory::{InMemoryPropertyIndex, PropertyRecord};
pub use rpc::RpcPropertyIndex;

use std::sync::Arc;

use rentier_core::error::ProviderError;
use rentier_core::property::PropertyIndex;

/// Build the configured store backend.
pub fn build_from_config(
    config: &rentier_config::AppConfig,
) -> Result<Arc<dyn PropertyIndex>, ProviderError> {
    match config.retrieval.store.as_str() {
        "memory" => Ok(Arc::new(InMemoryPropertyIndex::new())),
        _ => Ok(Arc::new(RpcPropertyIndex::from_config(config)?)),
    }
}
