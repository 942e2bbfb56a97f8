pub mod addresses;
pub mod arguments;
pub mod config;
pub mod deployment;
pub mod onchain;
pub mod traits;

use {
    crate::{deployment::DeploymentService, onchain::Onchain},
    anyhow::{Context, Result},
    artifacts::ArtifactSet,
    chain::{signer, Node},
};

pub async fn main(args: arguments::Arguments) -> Result<()> {
    // Fail on bad input before the first network round trip.
    deployment::validate_validators(&args.validator_addresses)?;

    let artifacts = ArtifactSet::load(&args.artifacts_path).with_context(|| {
        format!(
            "failed to load deployment artifacts from {}",
            args.artifacts_path.display()
        )
    })?;
    let signer = signer::from_suri(&args.suri)?;
    let node = Node::connect(&args.node_url).await?;

    let service = DeploymentService::new(
        Box::new(Onchain { node, signer }),
        artifacts,
        args.chain.clone(),
    );
    let deployed = service.run(&args.validator_addresses).await?;

    addresses::write(&args.addresses_path, &args.chain, &deployed)?;
    tracing::info!(
        path = %args.addresses_path.display(),
        network = %args.chain,
        "wrote contract addresses",
    );
    Ok(())
}
