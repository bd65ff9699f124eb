//! Binary layout of an SPL token account.
//!
//! ```text
//! offset  size  field
//!      0    32  mint
//!     32    32  owner
//!     64     8  amount (u64, little endian)
//!     72    36  delegate (COption<Pubkey>)
//!    108     1  state
//!    109    12  is_native (COption<u64>)
//!    121     8  delegated_amount (u64, little endian)
//!    129    36  close_authority (COption<Pubkey>)
//! ```
//!
//! Token-2022 accounts append extensions after the base layout; they are
//! ignored here.

use super::Pubkey;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("token account data too short: expected at least {expected} bytes, got {got}")]
    TooShort { expected: usize, got: usize },
    #[error("invalid option tag {tag} for field {field}")]
    InvalidOptionTag { field: &'static str, tag: u32 },
    #[error("invalid account state {0}")]
    InvalidState(u8),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccountState {
    #[default]
    Uninitialized,
    Initialized,
    Frozen,
}

impl TryFrom<u8> for AccountState {
    type Error = DecodeError;

    fn try_from(src: u8) -> Result<Self, Self::Error> {
        Ok(match src {
            0 => AccountState::Uninitialized,
            1 => AccountState::Initialized,
            2 => AccountState::Frozen,
            other => return Err(DecodeError::InvalidState(other)),
        })
    }
}

impl From<AccountState> for u8 {
    fn from(state: AccountState) -> Self {
        match state {
            AccountState::Uninitialized => 0,
            AccountState::Initialized => 1,
            AccountState::Frozen => 2,
        }
    }
}

/// A decoded token account. `amount` is the raw, unscaled balance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenAccount {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub delegate: Option<Pubkey>,
    pub state: AccountState,
    pub is_native: Option<u64>,
    pub delegated_amount: u64,
    pub close_authority: Option<Pubkey>,
}

impl TokenAccount {
    /// Size of the base layout in bytes
    pub const LEN: usize = 165;

    /// Decodes the base layout from the start of `data`.
    pub fn unpack(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < Self::LEN {
            return Err(DecodeError::TooShort { expected: Self::LEN, got: data.len() })
        }
        let mut reader = Reader { data, pos: 0 };

        let mint = reader.pubkey();
        let owner = reader.pubkey();
        let amount = reader.u64();
        let delegate = reader.coption("delegate", Reader::pubkey)?;
        let state = AccountState::try_from(reader.u8())?;
        let is_native = reader.coption("is_native", Reader::u64)?;
        let delegated_amount = reader.u64();
        let close_authority = reader.coption("close_authority", Reader::pubkey)?;

        Ok(Self { mint, owner, amount, delegate, state, is_native, delegated_amount, close_authority })
    }

    /// Encodes the account into its base layout.
    pub fn pack(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::LEN);
        out.extend_from_slice(self.mint.as_ref());
        out.extend_from_slice(self.owner.as_ref());
        out.extend_from_slice(&self.amount.to_le_bytes());
        pack_coption(&mut out, self.delegate.as_ref().map(|k| k.as_ref()), 32);
        out.push(self.state.into());
        pack_coption(&mut out, self.is_native.map(u64::to_le_bytes).as_ref().map(|b| &b[..]), 8);
        out.extend_from_slice(&self.delegated_amount.to_le_bytes());
        pack_coption(&mut out, self.close_authority.as_ref().map(|k| k.as_ref()), 32);
        out
    }
}

fn pack_coption(out: &mut Vec<u8>, value: Option<&[u8]>, width: usize) {
    match value {
        Some(bytes) => {
            out.extend_from_slice(&1u32.to_le_bytes());
            out.extend_from_slice(bytes);
        }
        None => {
            out.extend_from_slice(&0u32.to_le_bytes());
            out.extend(std::iter::repeat(0u8).take(width));
        }
    }
}

// Bounds are checked once up front against `TokenAccount::LEN`.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut buf = [0u8; N];
        buf.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        buf
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    fn u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take())
    }

    fn pubkey(&mut self) -> Pubkey {
        Pubkey::new_from_array(self.take())
    }

    fn coption<T>(
        &mut self,
        field: &'static str,
        read: fn(&mut Self) -> T,
    ) -> Result<Option<T>, DecodeError> {
        let tag = self.u32();
        let value = read(self);
        match tag {
            0 => Ok(None),
            1 => Ok(Some(value)),
            tag => Err(DecodeError::InvalidOptionTag { field, tag }),
        }
    }
}
