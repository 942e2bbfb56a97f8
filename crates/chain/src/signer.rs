//! Construction of the signing account from its secret URI.

use {
    anyhow::{Context, Result},
    std::str::FromStr,
    subxt::utils::AccountId32,
    subxt_signer::{sr25519::Keypair, SecretUri},
};

/// Derives the sr25519 keypair from a secret URI such as `//Alice` or a
/// mnemonic phrase with optional derivation junctions.
pub fn from_suri(suri: &str) -> Result<Keypair> {
    let uri = SecretUri::from_str(suri).context("malformed secret uri")?;
    Keypair::from_uri(&uri).context("failed to derive keypair from secret uri")
}

/// Account id of the keypair's public key.
pub fn account_id(keypair: &Keypair) -> AccountId32 {
    keypair.public_key().to_account_id()
}
