pub mod balance_service;
pub mod chain_access;
pub mod network_config;
pub mod session_service;
pub mod transfer_service;
pub mod units;
