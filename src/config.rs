use ethers::types::Address;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub chain_id: u64,
    pub rpc_url_override: Option<String>,
    pub paymaster: Address,
    pub approval_token: Address,
    pub receipt_poll_attempts: u32,
    pub receipt_poll_interval_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Failed to parse PORT"),
            chain_id: std::env::var("CHAIN_ID")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .expect("Failed to parse CHAIN_ID"),
            rpc_url_override: std::env::var("RPC_URL").ok(),
            paymaster: std::env::var("PAYMASTER_ADDRESS")
                .expect("PAYMASTER_ADDRESS must be set")
                .parse()
                .expect("Failed to parse PAYMASTER_ADDRESS"),
            approval_token: std::env::var("APPROVAL_TOKEN_ADDRESS")
                .expect("APPROVAL_TOKEN_ADDRESS must be set")
                .parse()
                .expect("Failed to parse APPROVAL_TOKEN_ADDRESS"),
            receipt_poll_attempts: std::env::var("RECEIPT_POLL_ATTEMPTS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .expect("Failed to parse RECEIPT_POLL_ATTEMPTS"),
            receipt_poll_interval_ms: std::env::var("RECEIPT_POLL_INTERVAL_MS")
                .unwrap_or_else(|_| "1500".to_string())
                .parse()
                .expect("Failed to parse RECEIPT_POLL_INTERVAL_MS"),
        }
    }
}
