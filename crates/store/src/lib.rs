#![deny(unused)]
//! Storage backends for Concierge.
//!
//! In-memory implementations of the booking, complaint and conversation
//! contracts, plus a Redis-backed conversation log for shared deployments.

pub mod memory;
pub mod redis;

use std::sync::Arc;

use concierge_core::{config::StoreConfig, traits::ConversationLog, Result};
use secrecy::ExposeSecret;

pub use memory::{InMemoryBookingStore, InMemoryComplaintStore, InMemoryConversationLog};
pub use self::redis::RedisConversationLog;

/// Pick the conversation log backend from configuration.
///
/// Redis when a URL is configured, otherwise in-memory.
pub fn conversation_log_from_config(config: &StoreConfig) -> Result<Arc<dyn ConversationLog>> {
    match &config.redis_url {
        Some(url) => {
            tracing::info!(prefix = %config.conversation_prefix, "Using Redis conversation log");
            Ok(Arc::new(RedisConversationLog::new(
                url.expose_secret(),
                &config.conversation_prefix,
                config.conversation_ttl_secs,
            )?))
        }
        None => {
            tracing::info!("Using in-memory conversation log");
            Ok(Arc::new(InMemoryConversationLog::new()))
        }
    }
}
