use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid action: {0}. Must be 'add' or 'remove'")]
    InvalidAction(String),

    #[error("Invalid EVM address format: {0}")]
    InvalidAddress(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Largest page the query API hands out.
pub const MAX_LIMIT: i64 = 1000;

fn is_hex(digits: &str) -> bool {
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit())
}

pub fn validate_action(action: &str) -> Result<(), ValidationError> {
    match action {
        "add" | "remove" => Ok(()),
        _ => Err(ValidationError::InvalidAction(action.to_string())),
    }
}

pub fn validate_evm_address(address: &str) -> Result<(), ValidationError> {
    if address.trim().is_empty() {
        return Err(ValidationError::MissingParameter("address".to_string()));
    }

    // 0x followed by 20 bytes
    match address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) {
        Some(digits) if digits.len() == 40 && is_hex(digits) => Ok(()),
        _ => Err(ValidationError::InvalidAddress(address.to_string())),
    }
}

/// A method signature is the leading bytes of call data: `0x` plus at least
/// one whole byte.
pub fn validate_method_signature(signature: &str) -> Result<(), ValidationError> {
    if signature.trim().is_empty() {
        return Err(ValidationError::MissingParameter("method_signature".to_string()));
    }

    match signature.strip_prefix("0x").or_else(|| signature.strip_prefix("0X")) {
        Some(digits) if digits.len() % 2 == 0 && is_hex(digits) => Ok(()),
        _ => Err(ValidationError::InvalidParameter(format!(
            "method_signature must be 0x-prefixed hex bytes: {}",
            signature
        ))),
    }
}

pub fn validate_chain_id(chain_id: &str) -> Result<(), ValidationError> {
    if chain_id.trim().is_empty() {
        return Err(ValidationError::MissingParameter("chain_id".to_string()));
    }

    if chain_id.parse::<u64>().is_err() {
        return Err(ValidationError::InvalidParameter(format!(
            "chain_id must be a decimal chain id: {}",
            chain_id
        )));
    }

    Ok(())
}

pub fn validate_offset(offset: Option<&str>) -> Result<i64, ValidationError> {
    match offset {
        None => Ok(0),
        Some(raw) => match raw.parse::<i64>() {
            Ok(value) if value >= 0 => Ok(value),
            _ => Err(ValidationError::InvalidParameter(format!(
                "offset must be a non-negative integer: {}",
                raw
            ))),
        },
    }
}

pub fn validate_limit(limit: Option<&str>) -> Result<i64, ValidationError> {
    match limit {
        None => Ok(100),
        Some(raw) => match raw.parse::<i64>() {
            Ok(value) if (1..=MAX_LIMIT).contains(&value) => Ok(value),
            _ => Err(ValidationError::InvalidParameter(format!(
                "limit must be between 1 and {}: {}",
                MAX_LIMIT, raw
            ))),
        },
    }
}

pub fn validate_target(
    chain_id: &str,
    address: &str,
    method_signature: &str,
    action: &str,
) -> Result<(), ValidationError> {
    if action.trim().is_empty() {
        return Err(ValidationError::MissingParameter("action".to_string()));
    }

    validate_action(action)?;
    validate_chain_id(chain_id)?;
    validate_evm_address(address)?;
    validate_method_signature(method_signature)?;

    Ok(())
}
