use crate::{errors::CustomError, models::network_config::NetworkConfig};

/// Get network configuration based on chain ID
pub fn get_network_config(chain_id: u64) -> Result<NetworkConfig, CustomError> {
    match chain_id {
        324 => Ok(NetworkConfig {
            chain_id: 324,
            name: "zkSync Era Mainnet".to_string(),
            rpc_url: "https://mainnet.era.zksync.io".to_string(),
            symbol: "ETH".to_string(),
        }),
        300 => Ok(NetworkConfig {
            chain_id: 300,
            name: "zkSync Sepolia Testnet".to_string(),
            rpc_url: "https://sepolia.era.zksync.dev".to_string(),
            symbol: "ETH".to_string(),
        }),
        260 => Ok(NetworkConfig {
            chain_id: 260,
            name: "zkSync local node".to_string(),
            rpc_url: "http://127.0.0.1:8011".to_string(),
            symbol: "ETH".to_string(),
        }),
        _ => Err(CustomError::UnsupportedChainError(chain_id)),
    }
}
