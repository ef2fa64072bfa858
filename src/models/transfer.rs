use std::str::FromStr;

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::errors::CustomError;
use crate::services::units;

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub recipient: String,
    pub amount: String,
}

/// A validated transfer submission. Construction performs every input check
/// so that a malformed recipient or amount is rejected before any network
/// call is made.
#[derive(Clone, Debug)]
pub struct TransferIntent {
    pub recipient: Address,
    pub amount_base_units: U256,
}

impl TransferIntent {
    pub fn new(recipient: &str, amount: &str) -> Result<Self, CustomError> {
        let recipient = Address::from_str(recipient.trim())
            .map_err(|_| CustomError::InvalidAddressError(recipient.to_string()))?;
        if recipient == Address::zero() {
            return Err(CustomError::InvalidAddressError(
                "the zero address is not a valid recipient".to_string(),
            ));
        }

        let amount_base_units = units::parse_units(amount)?;
        if amount_base_units.is_zero() {
            return Err(CustomError::InvalidAmountError(
                "amount must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            recipient,
            amount_base_units,
        })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TransferOutcome {
    pub transaction_hash: String,
    pub confirmed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPIENT: &str = "0x36615Cf349d7F6344891B1e7CA7C72883F5dc049";

    #[test]
    fn builds_intent_from_valid_input() {
        let intent = TransferIntent::new(RECIPIENT, "5").unwrap();
        assert_eq!(
            intent.recipient,
            Address::from_str(RECIPIENT).unwrap()
        );
        assert_eq!(intent.amount_base_units, U256::exp10(18) * 5);
    }

    #[test]
    fn rejects_empty_recipient() {
        let err = TransferIntent::new("", "5").unwrap_err();
        assert!(matches!(err, CustomError::InvalidAddressError(_)));
    }

    #[test]
    fn rejects_malformed_recipient() {
        let err = TransferIntent::new("not-an-address", "5").unwrap_err();
        assert!(matches!(err, CustomError::InvalidAddressError(_)));
    }

    #[test]
    fn rejects_zero_address_recipient() {
        let err =
            TransferIntent::new("0x0000000000000000000000000000000000000000", "5").unwrap_err();
        assert!(matches!(err, CustomError::InvalidAddressError(_)));
    }

    #[test]
    fn rejects_zero_amount() {
        let err = TransferIntent::new(RECIPIENT, "0").unwrap_err();
        assert!(matches!(err, CustomError::InvalidAmountError(_)));

        let err = TransferIntent::new(RECIPIENT, "0.0").unwrap_err();
        assert!(matches!(err, CustomError::InvalidAmountError(_)));
    }

    #[test]
    fn rejects_excess_precision() {
        // 19 fractional digits cannot be represented at the 18-decimal scale.
        let err = TransferIntent::new(RECIPIENT, "1.0000000000000000001").unwrap_err();
        assert!(matches!(err, CustomError::InvalidAmountError(_)));
    }
}
