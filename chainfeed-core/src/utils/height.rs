use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeightError {
    #[error("hex string without 0x prefix: {0:?}")]
    MissingPrefix(String),
    #[error("empty hex string")]
    Empty,
    #[error("invalid hex height {0:?}")]
    Invalid(String),
}

/// Parses a `0x` prefixed quantity such as the result of `eth_blockNumber`.
pub fn parse_hex_height(value: &str) -> Result<u64, HeightError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| HeightError::MissingPrefix(value.to_string()))?;
    if digits.is_empty() {
        return Err(HeightError::Empty)
    }
    // from_str_radix would also take a leading sign
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HeightError::Invalid(value.to_string()))
    }
    u64::from_str_radix(digits, 16).map_err(|_| HeightError::Invalid(value.to_string()))
}
