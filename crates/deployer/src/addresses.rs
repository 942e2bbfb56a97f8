//! Persists deployed contract addresses, keyed by network name.

use {
    crate::deployment::DeployedContracts,
    anyhow::{Context, Result},
    serde::{Deserialize, Serialize},
    std::{collections::BTreeMap, fs, io::ErrorKind, path::Path},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAddresses {
    pub vault: String,
    pub share_token: String,
    pub registry: String,
}

impl From<&DeployedContracts> for NetworkAddresses {
    fn from(deployed: &DeployedContracts) -> Self {
        Self {
            vault: deployed.vault.to_string(),
            share_token: deployed.share_token.to_string(),
            registry: deployed.registry.to_string(),
        }
    }
}

/// Merges this run's addresses into the address file, preserving entries of
/// other networks.
pub fn write(path: &Path, network: &str, deployed: &DeployedContracts) -> Result<()> {
    let mut book: BTreeMap<String, NetworkAddresses> = match fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents)
            .with_context(|| format!("malformed address file {}", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read address file {}", path.display()))
        }
    };
    book.insert(network.to_string(), deployed.into());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut contents = serde_json::to_string_pretty(&book)?;
    contents.push('\n');
    fs::write(path, contents)
        .with_context(|| format!("failed to write address file {}", path.display()))
}
