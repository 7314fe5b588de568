//! Turn handling trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{TurnRequest, TurnResponse};

/// Handles one conversation turn end to end.
#[async_trait]
pub trait TurnHandler: Send + Sync {
    /// Classify, plan, execute and merge a single user message.
    async fn handle_turn(&self, request: TurnRequest) -> Result<TurnResponse>;
}
