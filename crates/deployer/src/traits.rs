//! Trait definitions for the chain boundary.
//!
//! The deployment workflow only moves opaque call data and balances; every
//! node interaction goes through this trait so the workflow can be unit
//! tested with mocks.

use {
    anyhow::Result,
    subxt::utils::{AccountId32, H256},
};

/// Chain operations consumed by the deployment workflow.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ChainOps: Send + Sync {
    /// Account id of the signing account; used as the admin of newly
    /// registered agents.
    fn signer_account(&self) -> AccountId32;

    /// Minimum stake required to participate in nomination.
    async fn min_nominator_bond(&self) -> Result<u128>;

    /// Minimum balance required for an account to remain active.
    async fn existential_deposit(&self) -> Result<u128>;

    /// Id of the most recently created nomination pool.
    async fn last_pool_id(&self) -> Result<u32>;

    /// Uploads contract code, returning its on-chain code hash.
    async fn upload_code(&self, code: Vec<u8>) -> Result<H256>;

    /// Instantiates a contract from code and encoded constructor input,
    /// returning the new contract's address.
    async fn instantiate(&self, code: Vec<u8>, data: Vec<u8>) -> Result<AccountId32>;

    /// Submits a contract call with the given transferred value.
    async fn call(&self, dest: AccountId32, data: Vec<u8>, value: u128) -> Result<()>;

    /// Dry-runs a read-only contract call, returning its raw output bytes.
    async fn query(&self, dest: AccountId32, data: Vec<u8>) -> Result<Vec<u8>>;
}
