use ethers::types::U256;

use crate::errors::CustomError;

/// The approval token and the native currency both use the standard 18
/// decimal scale; all on-chain arithmetic happens in these base units.
pub const TOKEN_DECIMALS: usize = 18;

/// Parse a human-entered decimal amount into base units.
///
/// Conversion must be lossless: more than 18 fractional digits, signs,
/// non-numeric input, and values past 2^256 - 1 are all rejected.
pub fn parse_units(amount: &str) -> Result<U256, CustomError> {
    let trimmed = amount.trim();
    let (whole, frac) = match trimmed.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (trimmed, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(CustomError::InvalidAmountError(
            "amount must be a decimal number".to_string(),
        ));
    }
    if frac.len() > TOKEN_DECIMALS {
        return Err(CustomError::InvalidAmountError(format!(
            "more than {} fractional digits cannot be represented",
            TOKEN_DECIMALS
        )));
    }

    let whole_units = if whole.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(whole)
            .map_err(|_| CustomError::InvalidAmountError(amount.to_string()))?
    };
    let scaled = whole_units
        .checked_mul(U256::exp10(TOKEN_DECIMALS))
        .ok_or_else(|| CustomError::InvalidAmountError(format!("{} is too large", amount)))?;

    let frac_units = if frac.is_empty() {
        U256::zero()
    } else {
        let padded = format!("{:0<width$}", frac, width = TOKEN_DECIMALS);
        U256::from_dec_str(&padded)
            .map_err(|_| CustomError::InvalidAmountError(amount.to_string()))?
    };

    scaled
        .checked_add(frac_units)
        .ok_or_else(|| CustomError::InvalidAmountError(format!("{} is too large", amount)))
}

/// Format base units as a decimal string, trimming trailing zeros.
pub fn format_units(amount: U256) -> String {
    let mut amount_str = amount.to_string();
    if amount_str.len() <= TOKEN_DECIMALS {
        let padding = TOKEN_DECIMALS - amount_str.len() + 1;
        amount_str.insert_str(0, &"0".repeat(padding));
    }

    let point = amount_str.len() - TOKEN_DECIMALS;
    amount_str.insert(point, '.');

    let trimmed = amount_str.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
