//! `ChainOps` implementation backed by a live node connection.

use {
    crate::traits::ChainOps,
    anyhow::Result,
    chain::{contracts, signer, Node},
    subxt::utils::{AccountId32, H256},
    subxt_signer::sr25519::Keypair,
};

pub struct Onchain {
    pub node: Node,
    pub signer: Keypair,
}

#[async_trait::async_trait]
impl ChainOps for Onchain {
    fn signer_account(&self) -> AccountId32 {
        signer::account_id(&self.signer)
    }

    async fn min_nominator_bond(&self) -> Result<u128> {
        self.node.min_nominator_bond().await
    }

    async fn existential_deposit(&self) -> Result<u128> {
        self.node.existential_deposit()
    }

    async fn last_pool_id(&self) -> Result<u32> {
        self.node.last_pool_id().await
    }

    async fn upload_code(&self, code: Vec<u8>) -> Result<H256> {
        contracts::upload_code(&self.node, &self.signer, code).await
    }

    async fn instantiate(&self, code: Vec<u8>, data: Vec<u8>) -> Result<AccountId32> {
        contracts::instantiate(&self.node, &self.signer, code, data, 0).await
    }

    async fn call(&self, dest: AccountId32, data: Vec<u8>, value: u128) -> Result<()> {
        contracts::call(&self.node, &self.signer, &dest, data, value).await
    }

    async fn query(&self, dest: AccountId32, data: Vec<u8>) -> Result<Vec<u8>> {
        contracts::query(&self.node, &self.signer_account(), &dest, data).await
    }
}
