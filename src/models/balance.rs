use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single displayed balance. Every snapshot field is always present and is
/// either a known decimal value or explicitly unknown, never silently absent.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum BalanceField {
    Known(String),
    Unknown,
}

/// The five on-chain readings the UI displays, converted to decimal units.
/// Recomputed wholesale on connect and after every completed transfer.
#[derive(Clone, Debug, Serialize)]
pub struct BalanceSnapshot {
    pub paymaster_native: BalanceField,
    pub paymaster_token: BalanceField,
    pub sender_native: BalanceField,
    pub sender_token: BalanceField,
    pub receiver_token: BalanceField,
    pub refreshed_at: DateTime<Utc>,
}
