use crate::ProviderError;
use base64::{engine::general_purpose, Engine};
use chainfeed_core::types::Pubkey;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How settled the state a node answers from must be
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Commitment {
    /// Most recent block seen by the node, may be skipped
    Processed,
    /// Voted on by a supermajority
    Confirmed,
    /// Rooted by a supermajority, cannot be rolled back
    #[default]
    Finalized,
}

/// An on-chain account with its data decoded to raw bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    pub lamports: u64,
    /// Program owning the account
    pub owner: Pubkey,
    pub data: Vec<u8>,
    pub executable: bool,
    pub rent_epoch: u64,
}

/// An account as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiAccount {
    pub lamports: u64,
    /// `[payload, encoding]`
    pub data: (String, String),
    pub owner: Pubkey,
    pub executable: bool,
    /// Rent exempt accounts report `u64::MAX`, which some nodes send as a float
    #[serde(default, deserialize_with = "deserialize_rent_epoch")]
    pub rent_epoch: u64,
}

fn deserialize_rent_epoch<'de, D>(d: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Number::deserialize(d)?;
    Ok(value.as_u64().or_else(|| value.as_f64().map(|f| f as u64)).unwrap_or(u64::MAX))
}

impl TryFrom<UiAccount> for Account {
    type Error = ProviderError;

    fn try_from(src: UiAccount) -> Result<Self, Self::Error> {
        let (payload, encoding) = src.data;
        if encoding != "base64" {
            return Err(ProviderError::CustomError(format!(
                "unsupported account encoding: {encoding}"
            )))
        }
        let data = general_purpose::STANDARD.decode(payload)?;
        Ok(Account {
            lamports: src.lamports,
            owner: src.owner,
            data,
            executable: src.executable,
            rent_epoch: src.rent_epoch,
        })
    }
}

/// Slot the node answered at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcContext {
    pub slot: u64,
}

/// Envelope of context-carrying Solana RPC results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcResponse<T> {
    pub context: RpcContext,
    pub value: T,
}
