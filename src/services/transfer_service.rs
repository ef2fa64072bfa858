use std::sync::Arc;
use std::time::Duration;

use ethers::types::{Address, H256, U64};
use log::{debug, error, info, warn};
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::errors::CustomError;
use crate::models::transfer::{TransferIntent, TransferOutcome};
use crate::services::balance_service::BalanceService;
use crate::services::chain_access::ChainAccess;

/// Runs the approval-then-transfer sequence. At most one transfer is in
/// flight per session; the allowance check-then-act would race otherwise.
pub struct TransferService {
    chain: Arc<dyn ChainAccess>,
    balances: Arc<BalanceService>,
    paymaster: Address,
    approval_token: Address,
    receipt_poll_attempts: u32,
    receipt_poll_interval: Duration,
    in_flight: Mutex<()>,
}

impl TransferService {
    pub fn new(
        chain: Arc<dyn ChainAccess>,
        balances: Arc<BalanceService>,
        paymaster: Address,
        approval_token: Address,
        receipt_poll_attempts: u32,
        receipt_poll_interval: Duration,
    ) -> Self {
        Self {
            chain,
            balances,
            paymaster,
            approval_token,
            receipt_poll_attempts,
            receipt_poll_interval,
            in_flight: Mutex::new(()),
        }
    }

    /// Execute one validated intent. A second invocation while a transfer is
    /// pending is rejected. The balance snapshot is recomputed on every
    /// completion path, success or failure.
    pub async fn execute_transfer(
        &self,
        sender: Address,
        intent: &TransferIntent,
    ) -> Result<TransferOutcome, CustomError> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| CustomError::TransferInFlightError)?;

        let result = self.run_protocol(sender, intent).await;

        self.balances.refresh(sender, Some(intent.recipient)).await;

        match &result {
            Ok(outcome) => info!(
                "transfer {} confirmed={}",
                outcome.transaction_hash, outcome.confirmed
            ),
            Err(e) => error!("transfer to {:?} failed: {}", intent.recipient, e),
        }
        result
    }

    async fn run_protocol(
        &self,
        sender: Address,
        intent: &TransferIntent,
    ) -> Result<TransferOutcome, CustomError> {
        // Read the allowance fresh every time; it can change out-of-band.
        let allowance = self
            .chain
            .get_allowance(self.approval_token, sender, self.paymaster)
            .await?;

        if allowance < intent.amount_base_units {
            let approval_tx = self
                .chain
                .submit_approval(self.approval_token, self.paymaster, intent.amount_base_units)
                .await
                .map_err(|e| CustomError::ApprovalFailedError(e.to_string()))?;
            // Proceed once the approval is accepted by the network, without
            // waiting for it to be mined.
            debug!(
                "approval {:?} accepted for {}",
                approval_tx, intent.amount_base_units
            );
        } else {
            debug!(
                "allowance {} covers {}, skipping approval",
                allowance, intent.amount_base_units
            );
        }

        let tx_hash = self
            .chain
            .submit_paymaster_transfer(
                intent.recipient,
                intent.amount_base_units,
                self.paymaster,
                self.approval_token,
            )
            .await
            .map_err(|e| CustomError::TransferFailedError(e.to_string()))?;

        let mut outcome = TransferOutcome {
            transaction_hash: format!("{:?}", tx_hash),
            confirmed: false,
        };
        self.await_receipt(tx_hash).await?;
        outcome.confirmed = true;
        Ok(outcome)
    }

    /// Poll for the receipt. A reverted receipt is a failed transfer; running
    /// out of attempts only stops the wait and reports the transaction as
    /// submitted but unconfirmed. The transaction itself is never cancelled.
    async fn await_receipt(&self, tx_hash: H256) -> Result<(), CustomError> {
        for attempt in 0..self.receipt_poll_attempts {
            if attempt > 0 {
                sleep(self.receipt_poll_interval).await;
            }
            match self.chain.get_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    if receipt.status == Some(U64::from(1)) {
                        return Ok(());
                    }
                    return Err(CustomError::TransferFailedError(format!(
                        "transaction {:?} reverted",
                        tx_hash
                    )));
                }
                Ok(None) => {}
                Err(e) => warn!("receipt poll for {:?} failed: {}", tx_hash, e),
            }
        }
        Err(CustomError::ReceiptTimeoutError(format!("{:?}", tx_hash)))
    }
}
