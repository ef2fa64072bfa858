use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use ethers::types::{Address, U256};
use log::warn;
use tokio::sync::RwLock;

use crate::errors::CustomError;
use crate::models::balance::{BalanceField, BalanceSnapshot};
use crate::services::chain_access::ChainAccess;
use crate::services::units::format_units;

/// Computes the five-field balance snapshot. Reads are independent and run
/// concurrently; a failed read degrades its own field to unknown without
/// aborting the rest.
pub struct BalanceService {
    chain: Arc<dyn ChainAccess>,
    paymaster: Address,
    approval_token: Address,
    generation: AtomicU64,
    last_receiver: RwLock<Option<Address>>,
    latest: RwLock<Option<(u64, BalanceSnapshot)>>,
}

impl BalanceService {
    pub fn new(chain: Arc<dyn ChainAccess>, paymaster: Address, approval_token: Address) -> Self {
        Self {
            chain,
            paymaster,
            approval_token,
            generation: AtomicU64::new(0),
            last_receiver: RwLock::new(None),
            latest: RwLock::new(None),
        }
    }

    /// Recompute the snapshot wholesale. Passing a receiver remembers it for
    /// subsequent refreshes; before any transfer the receiver field stays
    /// unknown.
    pub async fn refresh(&self, sender: Address, receiver: Option<Address>) -> BalanceSnapshot {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let receiver = match receiver {
            Some(receiver) => {
                *self.last_receiver.write().await = Some(receiver);
                Some(receiver)
            }
            None => *self.last_receiver.read().await,
        };

        let paymaster_native = self.chain.get_native_balance(self.paymaster);
        let sender_native = self.chain.get_native_balance(sender);
        let paymaster_token = self
            .chain
            .get_token_balance(self.approval_token, self.paymaster);
        let sender_token = self.chain.get_token_balance(self.approval_token, sender);
        let receiver_token = async {
            match receiver {
                Some(receiver) => {
                    Some(self.chain.get_token_balance(self.approval_token, receiver).await)
                }
                None => None,
            }
        };

        let (paymaster_native, sender_native, paymaster_token, sender_token, receiver_token) = tokio::join!(
            paymaster_native,
            sender_native,
            paymaster_token,
            sender_token,
            receiver_token
        );

        let snapshot = BalanceSnapshot {
            paymaster_native: to_field("paymaster native", paymaster_native),
            paymaster_token: to_field("paymaster token", paymaster_token),
            sender_native: to_field("sender native", sender_native),
            sender_token: to_field("sender token", sender_token),
            receiver_token: match receiver_token {
                Some(read) => to_field("receiver token", read),
                None => BalanceField::Unknown,
            },
            refreshed_at: Utc::now(),
        };

        self.install(generation, snapshot.clone()).await;
        snapshot
    }

    /// The most recent snapshot that won installation.
    pub async fn latest(&self) -> Option<BalanceSnapshot> {
        self.latest
            .read()
            .await
            .as_ref()
            .map(|(_, snapshot)| snapshot.clone())
    }

    /// Last refresh wins: a stale snapshot never replaces one from a newer
    /// refresh that already completed.
    async fn install(&self, generation: u64, snapshot: BalanceSnapshot) {
        let mut latest = self.latest.write().await;
        match latest.as_ref() {
            Some((current, _)) if *current > generation => {}
            _ => *latest = Some((generation, snapshot)),
        }
    }
}

fn to_field(label: &str, read: Result<U256, CustomError>) -> BalanceField {
    match read {
        Ok(raw) => BalanceField::Known(format_units(raw)),
        Err(e) => {
            warn!("balance read failed for {}: {}", label, e);
            BalanceField::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ethers::types::{TransactionReceipt, H256};
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    use crate::services::units::TOKEN_DECIMALS;

    fn addr(byte: u8) -> Address {
        Address::from_low_u64_be(byte as u64)
    }

    fn base(n: u64) -> U256 {
        U256::from(n) * U256::exp10(TOKEN_DECIMALS)
    }

    /// Read-only mock. Balances come from shared slots so tests can change
    /// chain state between refreshes; write operations are never expected.
    struct MockChain {
        native: std::sync::Mutex<U256>,
        token: std::sync::Mutex<U256>,
        fail_token_reads: AtomicBool,
        stall_first_native_read: AtomicBool,
    }

    impl MockChain {
        fn new(native: U256, token: U256) -> Self {
            Self {
                native: std::sync::Mutex::new(native),
                token: std::sync::Mutex::new(token),
                fail_token_reads: AtomicBool::new(false),
                stall_first_native_read: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl ChainAccess for MockChain {
        async fn get_native_balance(&self, _address: Address) -> Result<U256, CustomError> {
            if self.stall_first_native_read.swap(false, Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Ok(*self.native.lock().unwrap())
        }

        async fn get_token_balance(
            &self,
            _token: Address,
            _address: Address,
        ) -> Result<U256, CustomError> {
            if self.fail_token_reads.load(Ordering::SeqCst) {
                return Err(CustomError::NetworkError("connection reset".to_string()));
            }
            Ok(*self.token.lock().unwrap())
        }

        async fn get_allowance(
            &self,
            _token: Address,
            _owner: Address,
            _spender: Address,
        ) -> Result<U256, CustomError> {
            Err(CustomError::NetworkError("not a read mock path".to_string()))
        }

        async fn submit_approval(
            &self,
            _token: Address,
            _spender: Address,
            _amount: U256,
        ) -> Result<H256, CustomError> {
            Err(CustomError::NetworkError("writes unsupported".to_string()))
        }

        async fn submit_paymaster_transfer(
            &self,
            _to: Address,
            _amount: U256,
            _paymaster: Address,
            _fee_token: Address,
        ) -> Result<H256, CustomError> {
            Err(CustomError::NetworkError("writes unsupported".to_string()))
        }

        async fn get_receipt(
            &self,
            _tx_hash: H256,
        ) -> Result<Option<TransactionReceipt>, CustomError> {
            Ok(None)
        }
    }

    fn service(mock: Arc<MockChain>) -> BalanceService {
        BalanceService::new(mock, addr(0xAA), addr(0xBB))
    }

    #[tokio::test]
    async fn refresh_formats_all_known_fields() {
        let mock = Arc::new(MockChain::new(base(3), base(7)));
        let balances = service(mock);

        let snapshot = balances.refresh(addr(1), Some(addr(2))).await;

        assert_eq!(snapshot.paymaster_native, BalanceField::Known("3".to_string()));
        assert_eq!(snapshot.sender_native, BalanceField::Known("3".to_string()));
        assert_eq!(snapshot.paymaster_token, BalanceField::Known("7".to_string()));
        assert_eq!(snapshot.sender_token, BalanceField::Known("7".to_string()));
        assert_eq!(snapshot.receiver_token, BalanceField::Known("7".to_string()));
    }

    #[tokio::test]
    async fn receiver_defaults_to_unknown_then_is_remembered() {
        let mock = Arc::new(MockChain::new(base(1), base(1)));
        let balances = service(mock);

        let snapshot = balances.refresh(addr(1), None).await;
        assert_eq!(snapshot.receiver_token, BalanceField::Unknown);

        balances.refresh(addr(1), Some(addr(2))).await;
        let snapshot = balances.refresh(addr(1), None).await;
        assert_eq!(snapshot.receiver_token, BalanceField::Known("1".to_string()));
    }

    #[tokio::test]
    async fn failed_token_reads_degrade_only_their_fields() {
        let mock = Arc::new(MockChain::new(base(2), base(9)));
        mock.fail_token_reads.store(true, Ordering::SeqCst);
        let balances = service(mock);

        let snapshot = balances.refresh(addr(1), Some(addr(2))).await;

        assert_eq!(snapshot.paymaster_native, BalanceField::Known("2".to_string()));
        assert_eq!(snapshot.sender_native, BalanceField::Known("2".to_string()));
        assert_eq!(snapshot.paymaster_token, BalanceField::Unknown);
        assert_eq!(snapshot.sender_token, BalanceField::Unknown);
        assert_eq!(snapshot.receiver_token, BalanceField::Unknown);
    }

    #[tokio::test]
    async fn refresh_is_idempotent_without_chain_state_changes() {
        let mock = Arc::new(MockChain::new(base(4), base(6)));
        let balances = service(mock);

        let first = balances.refresh(addr(1), Some(addr(2))).await;
        let second = balances.refresh(addr(1), Some(addr(2))).await;

        assert_eq!(first.paymaster_native, second.paymaster_native);
        assert_eq!(first.paymaster_token, second.paymaster_token);
        assert_eq!(first.sender_native, second.sender_native);
        assert_eq!(first.sender_token, second.sender_token);
        assert_eq!(first.receiver_token, second.receiver_token);
    }

    #[tokio::test]
    async fn stale_refresh_never_overwrites_a_newer_one() {
        let mock = Arc::new(MockChain::new(base(1), base(1)));
        mock.stall_first_native_read.store(true, Ordering::SeqCst);
        let balances = Arc::new(service(mock.clone()));

        // First refresh stalls on one read while it is in flight.
        let slow = {
            let balances = balances.clone();
            tokio::spawn(async move { balances.refresh(addr(1), None).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Chain state moves on and a second refresh completes first.
        *mock.native.lock().unwrap() = base(2);
        *mock.token.lock().unwrap() = base(2);
        balances.refresh(addr(1), None).await;

        slow.await.unwrap();

        let latest = balances.latest().await.unwrap();
        assert_eq!(latest.paymaster_native, BalanceField::Known("2".to_string()));
        assert_eq!(latest.sender_token, BalanceField::Known("2".to_string()));
    }
}
