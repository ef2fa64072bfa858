use std::env;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::info;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::CustomError;
use crate::models::session::Session;
use crate::services::balance_service::BalanceService;
use crate::services::chain_access::{ChainAccess, ZkChainClient};
use crate::services::transfer_service::TransferService;

/// Everything scoped to one connected account: the session record plus the
/// services built over its chain adapter.
pub struct SessionHandle {
    pub session: Session,
    pub balances: Arc<BalanceService>,
    pub transfers: Arc<TransferService>,
}

/// Owns the single active session. Initialized on connect, torn down on
/// disconnect; nothing about the connection lives outside this slot.
pub struct SessionService {
    config: Config,
    active: RwLock<Option<Arc<SessionHandle>>>,
}

impl SessionService {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            active: RwLock::new(None),
        }
    }

    /// Connect: derive the account from the configured signing key, build the
    /// chain adapter and its services, and take the first balance snapshot.
    pub async fn connect(&self) -> Result<Arc<SessionHandle>, CustomError> {
        let private_key = env::var("PRIVATE_KEY").map_err(|_| {
            CustomError::WalletUnavailableError("PRIVATE_KEY is not set".to_string())
        })?;

        let client = ZkChainClient::new(&self.config, &private_key).await?;
        let account = client.account();
        let chain: Arc<dyn ChainAccess> = Arc::new(client);

        let balances = Arc::new(BalanceService::new(
            chain.clone(),
            self.config.paymaster,
            self.config.approval_token,
        ));
        let transfers = Arc::new(TransferService::new(
            chain,
            balances.clone(),
            self.config.paymaster,
            self.config.approval_token,
            self.config.receipt_poll_attempts,
            Duration::from_millis(self.config.receipt_poll_interval_ms),
        ));

        let session = Session {
            id: Uuid::new_v4(),
            account,
            chain_id: self.config.chain_id,
            connected_at: Utc::now(),
        };
        let handle = Arc::new(SessionHandle {
            session,
            balances,
            transfers,
        });

        handle.balances.refresh(account, None).await;

        let mut active = self.active.write().await;
        *active = Some(handle.clone());
        info!("session {} connected as {:?}", handle.session.id, account);
        Ok(handle)
    }

    pub async fn disconnect(&self) {
        let mut active = self.active.write().await;
        if let Some(handle) = active.take() {
            info!("session {} disconnected", handle.session.id);
        }
    }

    pub async fn current(&self) -> Result<Arc<SessionHandle>, CustomError> {
        self.active.read().await.clone().ok_or_else(|| {
            CustomError::WalletUnavailableError("no connected session".to_string())
        })
    }
}
