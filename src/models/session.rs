use chrono::{DateTime, Utc};
use ethers::types::Address;
use serde::Serialize;
use uuid::Uuid;

/// Session-scoped connection state. Created on connect, dropped on
/// disconnect; the account is immutable for the lifetime of the session.
#[derive(Clone, Debug, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub account: Address,
    pub chain_id: u64,
    pub connected_at: DateTime<Utc>,
}
