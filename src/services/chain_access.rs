use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    abi::{Abi, AbiParser, Function, Token},
    contract::Contract,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, Bytes, TransactionReceipt, H256, U256},
};
use serde_json::json;

use crate::config::Config;
use crate::errors::CustomError;
use crate::services::network_config::get_network_config;

// ERC20 fragment for the reads and the approval the paymaster flow needs
const ERC20_ABI: &str = r#"[
    function balanceOf(address owner) view returns (uint256)
    function allowance(address owner, address spender) view returns (uint256)
    function approve(address spender, uint256 value) returns (bool)
]"#;

// zkSync paymaster flow selectors (IPaymasterFlow)
const PAYMASTER_FLOW_ABI: &str = r#"[
    function approvalBased(address token, uint256 minAllowance, bytes innerInput)
    function general(bytes input)
]"#;

const TRANSFER_GAS_LIMIT: u64 = 6_000_000;
const GAS_PER_PUBDATA_LIMIT: u64 = 50_000;

/// Everything the orchestrator needs from the chain. The trait hides the
/// wallet signing, RPC transport, and paymaster-parameter encoding behind
/// six operations; services never touch the provider directly.
#[async_trait]
pub trait ChainAccess: Send + Sync {
    async fn get_native_balance(&self, address: Address) -> Result<U256, CustomError>;

    async fn get_token_balance(&self, token: Address, address: Address)
        -> Result<U256, CustomError>;

    async fn get_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, CustomError>;

    /// Submit an approval and return its hash once the network accepts it.
    async fn submit_approval(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<H256, CustomError>;

    /// Submit a value transfer billed to the paymaster, with fees settled in
    /// `fee_token`.
    async fn submit_paymaster_transfer(
        &self,
        to: Address,
        amount: U256,
        paymaster: Address,
        fee_token: Address,
    ) -> Result<H256, CustomError>;

    async fn get_receipt(&self, tx_hash: H256)
        -> Result<Option<TransactionReceipt>, CustomError>;
}

/// Production adapter over a zkSync Era RPC endpoint. Contract-interface
/// descriptors are parsed once at construction and reused for every call.
pub struct ZkChainClient {
    provider: Provider<Http>,
    signer: Arc<SignerMiddleware<Provider<Http>, LocalWallet>>,
    account: Address,
    erc20: Abi,
    approval_based: Function,
}

impl ZkChainClient {
    pub async fn new(config: &Config, private_key: &str) -> Result<Self, CustomError> {
        let network = get_network_config(config.chain_id)?;
        let rpc_url = config
            .rpc_url_override
            .clone()
            .unwrap_or(network.rpc_url);
        let provider = Provider::<Http>::try_from(rpc_url.as_str())
            .map_err(|e| CustomError::NetworkError(e.to_string()))?;

        // Verify connection and chain ID
        let connected_chain_id = provider.get_chainid().await?;
        if connected_chain_id.as_u64() != config.chain_id {
            return Err(CustomError::NetworkError(format!(
                "connected chain ID {} does not match configured chain ID {}",
                connected_chain_id, config.chain_id
            )));
        }

        let wallet = LocalWallet::from_str(private_key)
            .map_err(|e| CustomError::WalletUnavailableError(e.to_string()))?
            .with_chain_id(config.chain_id);
        let account = wallet.address();
        let signer = Arc::new(SignerMiddleware::new(provider.clone(), wallet));

        let erc20 = AbiParser::default()
            .parse_str(ERC20_ABI)
            .map_err(|e| CustomError::ContractError(e.to_string()))?;
        let paymaster_flow = AbiParser::default()
            .parse_str(PAYMASTER_FLOW_ABI)
            .map_err(|e| CustomError::ContractError(e.to_string()))?;
        let approval_based = paymaster_flow
            .function("approvalBased")
            .map_err(|e| CustomError::ContractError(e.to_string()))?
            .clone();

        Ok(Self {
            provider,
            signer,
            account,
            erc20,
            approval_based,
        })
    }

    /// The account derived from the signing key.
    pub fn account(&self) -> Address {
        self.account
    }

    fn erc20_reader(&self, token: Address) -> Contract<Provider<Http>> {
        Contract::new(token, self.erc20.clone(), Arc::new(self.provider.clone()))
    }

    /// ABI-encode the approval-based paymaster input for `fee_token`.
    fn paymaster_input(&self, fee_token: Address, min_allowance: U256) -> Result<Bytes, CustomError> {
        let encoded = self
            .approval_based
            .encode_input(&[
                Token::Address(fee_token),
                Token::Uint(min_allowance),
                Token::Bytes(Vec::new()),
            ])
            .map_err(|e| CustomError::ContractError(e.to_string()))?;
        Ok(Bytes::from(encoded))
    }
}

#[async_trait]
impl ChainAccess for ZkChainClient {
    async fn get_native_balance(&self, address: Address) -> Result<U256, CustomError> {
        Ok(self.provider.get_balance(address, None).await?)
    }

    async fn get_token_balance(
        &self,
        token: Address,
        address: Address,
    ) -> Result<U256, CustomError> {
        let contract = self.erc20_reader(token);
        contract
            .method::<_, U256>("balanceOf", address)
            .map_err(|e| CustomError::ContractError(e.to_string()))?
            .call()
            .await
            .map_err(|e| CustomError::ContractError(e.to_string()))
    }

    async fn get_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, CustomError> {
        let contract = self.erc20_reader(token);
        contract
            .method::<_, U256>("allowance", (owner, spender))
            .map_err(|e| CustomError::ContractError(e.to_string()))?
            .call()
            .await
            .map_err(|e| CustomError::ContractError(e.to_string()))
    }

    async fn submit_approval(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<H256, CustomError> {
        let contract = Contract::new(token, self.erc20.clone(), self.signer.clone());
        let call = contract
            .method::<_, bool>("approve", (spender, amount))
            .map_err(|e| CustomError::ContractError(e.to_string()))?;
        let pending = call
            .send()
            .await
            .map_err(|e| CustomError::ContractError(e.to_string()))?;
        Ok(*pending)
    }

    async fn submit_paymaster_transfer(
        &self,
        to: Address,
        amount: U256,
        paymaster: Address,
        fee_token: Address,
    ) -> Result<H256, CustomError> {
        let paymaster_input = self.paymaster_input(fee_token, amount)?;

        // EIP-712 transaction (type 0x71) carrying the paymaster metadata.
        // The node fills in nonce and fee fields for the managed account.
        let tx = json!({
            "from": self.account,
            "to": to,
            "value": amount,
            "gas": U256::from(TRANSFER_GAS_LIMIT),
            "type": "0x71",
            "eip712Meta": {
                "gasPerPubdata": U256::from(GAS_PER_PUBDATA_LIMIT),
                "paymasterParams": {
                    "paymaster": paymaster,
                    "paymasterInput": paymaster_input,
                },
            },
        });

        let tx_hash: H256 = self.provider.request("eth_sendTransaction", [tx]).await?;
        Ok(tx_hash)
    }

    async fn get_receipt(
        &self,
        tx_hash: H256,
    ) -> Result<Option<TransactionReceipt>, CustomError> {
        Ok(self.provider.get_transaction_receipt(tx_hash).await?)
    }
}
