use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use ethers::providers::ProviderError;
use serde::Serialize;
use thiserror::Error;

use crate::models::api_response::ApiResponse;

#[derive(Error, Debug)]
pub enum CustomError {
    #[error("No connectable wallet: {0}")]
    WalletUnavailableError(String),

    #[error("Invalid address: {0}")]
    InvalidAddressError(String),

    #[error("Invalid amount: {0}")]
    InvalidAmountError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Provider error: {0}")]
    ProviderError(#[from] ProviderError),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Approval failed: {0}")]
    ApprovalFailedError(String),

    #[error("Transfer failed: {0}")]
    TransferFailedError(String),

    #[error("Transaction {0} submitted but unconfirmed")]
    ReceiptTimeoutError(String),

    #[error("A transfer is already in flight for this session")]
    TransferInFlightError,

    #[error("Unsupported chain: {0}")]
    UnsupportedChainError(u64),
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    code: u16,
    message: String,
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match self {
            CustomError::WalletUnavailableError(_) => StatusCode::SERVICE_UNAVAILABLE,
            CustomError::InvalidAddressError(_) => StatusCode::BAD_REQUEST,
            CustomError::InvalidAmountError(_) => StatusCode::BAD_REQUEST,
            CustomError::NetworkError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::ProviderError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::ContractError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::ApprovalFailedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::TransferFailedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::ReceiptTimeoutError(_) => StatusCode::GATEWAY_TIMEOUT,
            CustomError::TransferInFlightError => StatusCode::CONFLICT,
            CustomError::UnsupportedChainError(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let response = ApiResponse {
            status: "FAILURE".to_string(),
            code: status.as_u16(),
            result: None::<()>,
            error: Some(ApiError {
                code: status.as_u16(),
                message: self.to_string(),
            }),
        };
        HttpResponse::build(status).json(response)
    }
}
