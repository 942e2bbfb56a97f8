use {
    clap::Parser,
    std::path::PathBuf,
    subxt::utils::AccountId32,
    url::Url,
};

#[derive(Parser)]
pub struct Arguments {
    /// Network identifier. Selects the `.env.<chain>` environment file and
    /// keys the persisted address file.
    #[clap(long, env = "CHAIN", default_value = crate::config::DEFAULT_CHAIN)]
    pub chain: String,

    /// Comma separated list of validator addresses to register nomination
    /// agents for.
    #[clap(long, env = "VALIDATOR_ADDRESSES", value_delimiter = ',')]
    pub validator_addresses: Vec<AccountId32>,

    /// The node URL to connect to.
    #[clap(long, env, default_value = "ws://127.0.0.1:9944")]
    pub node_url: Url,

    /// Secret URI of the account paying for and administering the
    /// deployment.
    #[clap(long, env, default_value = "//Alice")]
    pub suri: String,

    /// Directory holding the contract deployment artifacts.
    #[clap(long, env, default_value = "artifacts")]
    pub artifacts_path: PathBuf,

    /// File the deployed contract addresses are written to.
    #[clap(long, env, default_value = "deployments/addresses.json")]
    pub addresses_path: PathBuf,
}

impl std::fmt::Display for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "chain: {}", self.chain)?;
        let validators = self
            .validator_addresses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        writeln!(f, "validator_addresses: {validators}")?;
        writeln!(f, "node_url: {}", self.node_url)?;
        writeln!(f, "suri: SECRET")?;
        writeln!(f, "artifacts_path: {}", self.artifacts_path.display())?;
        writeln!(f, "addresses_path: {}", self.addresses_path.display())?;
        Ok(())
    }
}
