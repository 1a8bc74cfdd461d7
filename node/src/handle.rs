//! Shared async access to the marketplace
//!
//! Writers queue on the lock and run one at a time to completion; readers
//! get owned copies so no partially applied state is ever observable.

use crate::error::Result;
use crate::marketplace::{AccountView, Call, Marketplace, Receipt};
use acdm_core::{Address, Timestamp};
use acdm_platform::{Order, Round, RoundSummary};
use governance::{Proposal, ProposalOutcome};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct MarketplaceHandle {
    state: Arc<RwLock<Marketplace>>,
}

impl MarketplaceHandle {
    pub fn new(marketplace: Marketplace) -> Self {
        Self {
            state: Arc::new(RwLock::new(marketplace)),
        }
    }

    /// Wait for exclusive access, then apply `call`.
    pub async fn submit(&self, call: Call) -> Result<Receipt> {
        let mut state = self.state.write().await;
        state.apply(call)
    }

    pub async fn snapshot(&self) -> Marketplace {
        self.state.read().await.clone()
    }

    pub async fn round(&self) -> Round {
        self.state.read().await.platform().round().clone()
    }

    pub async fn history(&self) -> Vec<RoundSummary> {
        self.state.read().await.platform().history().to_vec()
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.state.read().await.platform().orders().to_vec()
    }

    pub async fn account(&self, account: &Address, now: Timestamp) -> AccountView {
        self.state.read().await.account(account, now)
    }

    pub async fn proposal(&self, id: u64) -> Result<Proposal> {
        Ok(self.state.read().await.dao().proposal(id)?.clone())
    }

    pub async fn proposals(&self) -> Vec<Proposal> {
        self.state.read().await.dao().proposals().to_vec()
    }

    pub async fn outcomes(&self) -> Vec<ProposalOutcome> {
        self.state.read().await.dao().outcomes().to_vec()
    }

    /// Recover the marketplace once every other handle is gone.
    pub fn into_inner(self) -> Option<Marketplace> {
        Arc::try_unwrap(self.state).ok().map(RwLock::into_inner)
    }
}
