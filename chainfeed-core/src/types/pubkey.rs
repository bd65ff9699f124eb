use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Address of the SPL Token program
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Address of the SPL Token-2022 program
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

/// [`TOKEN_PROGRAM_ID`] as raw bytes
pub const TOKEN_PROGRAM: Pubkey = Pubkey::new_from_array([
    6, 221, 246, 225, 215, 101, 161, 147, 217, 203, 225, 70, 206, 235, 121, 172, 28, 180, 133,
    237, 95, 91, 55, 145, 58, 140, 245, 133, 126, 255, 0, 169,
]);

/// [`TOKEN_2022_PROGRAM_ID`] as raw bytes
pub const TOKEN_2022_PROGRAM: Pubkey = Pubkey::new_from_array([
    6, 221, 246, 225, 238, 117, 143, 222, 24, 66, 93, 188, 228, 108, 205, 218, 182, 26, 252, 77,
    131, 185, 13, 39, 254, 189, 249, 40, 216, 161, 139, 252,
]);

/// Longest base58 string that can decode to 32 bytes
const MAX_BASE58_LEN: usize = 44;

/// A 32 byte Solana account address, rendered as base58.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pubkey([u8; 32]);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PubkeyError {
    #[error("invalid base58 string: {0}")]
    InvalidBase58(String),
    #[error("expected 32 bytes, got {0}")]
    WrongSize(usize),
}

impl Pubkey {
    pub const fn new_from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Builds a key from a slice, which must be exactly 32 bytes long.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, PubkeyError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| PubkeyError::WrongSize(bytes.len()))?;
        Ok(Self(arr))
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }
}

/// Returns `true` if `owner` is one of the SPL token programs.
pub fn is_token_program(owner: &Pubkey) -> bool {
    *owner == TOKEN_PROGRAM || *owner == TOKEN_2022_PROGRAM
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Pubkey {
    fn from(src: [u8; 32]) -> Self {
        Self(src)
    }
}

impl FromStr for Pubkey {
    type Err = PubkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > MAX_BASE58_LEN {
            return Err(PubkeyError::InvalidBase58(s.to_string()))
        }
        let bytes =
            bs58::decode(s).into_vec().map_err(|_| PubkeyError::InvalidBase58(s.to_string()))?;
        Self::try_from_slice(&bytes)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({self})")
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = String::deserialize(d)?;
        value.parse().map_err(de::Error::custom)
    }
}
