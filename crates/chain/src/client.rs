use {
    anyhow::{Context, Result},
    subxt::{
        dynamic::{self, Value},
        ext::scale_decode::DecodeAsType,
        OnlineClient,
        PolkadotConfig,
    },
    url::Url,
};

/// Connection to the target chain.
pub struct Node {
    pub client: OnlineClient<PolkadotConfig>,
}

impl Node {
    /// Connects to the node at `url`. Plaintext schemes are accepted since
    /// deployments regularly target local development nodes.
    pub async fn connect(url: &Url) -> Result<Self> {
        let client = match url.scheme() {
            "ws" | "http" => OnlineClient::<PolkadotConfig>::from_insecure_url(url.as_str()).await,
            _ => OnlineClient::<PolkadotConfig>::from_url(url.as_str()).await,
        }
        .with_context(|| format!("failed to connect to node at {url}"))?;
        tracing::debug!(%url, "connected to node");
        Ok(Self { client })
    }

    /// Minimum stake required to participate in nomination.
    pub async fn min_nominator_bond(&self) -> Result<u128> {
        self.fetch_storage("Staking", "MinNominatorBond").await
    }

    /// Id of the most recently created nomination pool, 0 before the first
    /// pool exists.
    pub async fn last_pool_id(&self) -> Result<u32> {
        self.fetch_storage("NominationPools", "LastPoolId").await
    }

    /// Minimum balance required for an account to remain active.
    pub fn existential_deposit(&self) -> Result<u128> {
        let address = dynamic::constant("Balances", "ExistentialDeposit");
        let deposit = self
            .client
            .constants()
            .at(&address)
            .context("failed to read Balances::ExistentialDeposit")?;
        Ok(deposit.as_type::<u128>()?)
    }

    async fn fetch_storage<T: DecodeAsType>(&self, pallet: &str, entry: &str) -> Result<T> {
        let address = dynamic::storage(pallet, entry, Vec::<Value>::new());
        let value = self
            .client
            .storage()
            .at_latest()
            .await?
            .fetch_or_default(&address)
            .await
            .with_context(|| format!("failed to fetch {pallet}::{entry}"))?;
        Ok(value.as_type::<T>()?)
    }
}
