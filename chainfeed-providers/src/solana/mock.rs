use super::{Account, AccountsClient, Commitment};
use crate::ProviderError;
use async_trait::async_trait;
use chainfeed_core::types::Pubkey;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

type Scripted = Result<Vec<Option<Account>>, String>;

/// Scripted [`AccountsClient`] for tests.
///
/// Answers are handed out in the order they were pushed; every call is
/// recorded with the addresses and commitment it asked for.
#[derive(Clone, Debug, Default)]
pub struct MockAccountsClient {
    requests: Arc<Mutex<VecDeque<(Vec<Pubkey>, Commitment)>>>,
    responses: Arc<Mutex<VecDeque<Scripted>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockAccountsClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the accounts returned by the next call
    pub fn push_accounts(&self, accounts: Vec<Option<Account>>) {
        lock(&self.responses).push_back(Ok(accounts));
    }

    /// Queues a transport error for the next call
    pub fn push_error(&self, reason: impl Into<String>) {
        lock(&self.responses).push_back(Err(reason.into()));
    }

    /// Pops the oldest recorded call
    pub fn next_request(&self) -> Option<(Vec<Pubkey>, Commitment)> {
        lock(&self.requests).pop_front()
    }

    /// Number of calls made and not yet popped
    pub fn pending_requests(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl AccountsClient for MockAccountsClient {
    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
        commitment: Commitment,
    ) -> Result<Vec<Option<Account>>, ProviderError> {
        lock(&self.requests).push_back((addresses.to_vec(), commitment));
        match lock(&self.responses).pop_front() {
            Some(Ok(accounts)) => Ok(accounts),
            Some(Err(reason)) => Err(ProviderError::CustomError(reason)),
            None => Err(ProviderError::CustomError("no scripted accounts response".to_string())),
        }
    }
}
