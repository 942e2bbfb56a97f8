//! The deployment workflow: a linear sequence of chain operations, each one
//! feeding the next.

use {
    crate::traits::ChainOps,
    anyhow::{ensure, Context, Result},
    artifacts::{ArtifactSet, ContractArtifact},
    chain::decode,
    std::collections::HashSet,
    subxt::{
        ext::scale_value::At,
        utils::{AccountId32, H256},
    },
};

/// Network id of the local development chain.
pub const DEVELOPMENT_NETWORK: &str = "development";

/// Era duration passed to the vault's fast-unlock constructor on the
/// development network, in milliseconds.
const DEVELOPMENT_ERA_MS: u64 = 15_000;

/// Weight assigned to every agent by the final weighting call.
const EQUAL_WEIGHT: u64 = 1000;

/// Addresses resulting from a deployment run.
#[derive(Debug, Clone)]
pub struct DeployedContracts {
    pub vault: AccountId32,
    pub share_token: AccountId32,
    pub registry: AccountId32,
    pub agents: Vec<AccountId32>,
}

/// Input validation: a non-empty, duplicate-free validator list. Runs
/// before the first network round trip.
pub fn validate_validators(validators: &[AccountId32]) -> Result<()> {
    ensure!(!validators.is_empty(), "must specify validator addresses");
    let mut seen = HashSet::with_capacity(validators.len());
    for validator in validators {
        ensure!(
            seen.insert(validator.0),
            "duplicate validator address {validator}"
        );
    }
    Ok(())
}

pub struct DeploymentService {
    chain: Box<dyn ChainOps>,
    artifacts: ArtifactSet,
    network: String,
}

impl DeploymentService {
    pub fn new(chain: Box<dyn ChainOps>, artifacts: ArtifactSet, network: String) -> Self {
        Self {
            chain,
            artifacts,
            network,
        }
    }

    /// Deploys and wires all contracts, returning their addresses.
    pub async fn run(&self, validators: &[AccountId32]) -> Result<DeployedContracts> {
        validate_validators(validators)?;

        tracing::info!("===== network queries =====");
        let min_nominator_bond = self
            .chain
            .min_nominator_bond()
            .await
            .context("failed to query the minimum nominator bond")?;
        tracing::info!(%min_nominator_bond, "minimum nomination bond");
        let existential_deposit = self
            .chain
            .existential_deposit()
            .await
            .context("failed to query the existential deposit")?;
        tracing::info!(%existential_deposit, "existential deposit");

        tracing::info!("===== code hash deployment =====");
        let registry_hash = self.upload(&self.artifacts.registry).await?;
        let share_token_hash = self.deploy_share_token_template().await?;
        let agent_hash = self.upload(&self.artifacts.nomination_agent).await?;

        tracing::info!("===== contract deployment =====");
        tracing::info!(name = artifacts::VAULT, network = %self.network, "deploying contract");
        let data = vault_constructor_data(
            &self.artifacts.vault,
            &self.network,
            share_token_hash,
            registry_hash,
            agent_hash,
        )?;
        let vault = self
            .chain
            .instantiate(self.artifacts.vault.code()?, data)
            .await
            .context("failed to instantiate the vault")?;

        tracing::info!("===== address lookup =====");
        let registry = self
            .vault_address_query(&vault, "IVault::get_registry_contract")
            .await?;
        tracing::info!(address = %registry, "registry contract");
        let share_token = self
            .vault_address_query(&vault, "IVault::get_share_token_contract")
            .await?;
        tracing::info!(address = %share_token, "share token contract");

        tracing::info!("===== agent configuration =====");
        let admin = self.chain.signer_account();
        let deposit = min_nominator_bond + existential_deposit;
        let mut pool_ids = Vec::with_capacity(validators.len());
        for validator in validators {
            let pool_id = self
                .chain
                .last_pool_id()
                .await
                .context("failed to query the last pool id")?
                + 1;
            tracing::info!(validator = %validator, pool_id, "adding nomination agent");
            let data = self.artifacts.registry.encode_message(
                "add_agent",
                &(
                    admin.clone(),
                    validator.clone(),
                    min_nominator_bond,
                    existential_deposit,
                ),
            )?;
            self.chain
                .call(registry.clone(), data, deposit)
                .await
                .with_context(|| format!("failed to register an agent for validator {validator}"))?;
            pool_ids.push(pool_id);
        }

        tracing::info!("fetching agents");
        let data = self.artifacts.registry.encode_message("get_agents", &())?;
        let output = self
            .chain
            .query(registry.clone(), data)
            .await
            .context("failed to fetch the agent list")?;
        let agents = decode_agents(&self.artifacts.registry, &output)?;

        for (agent, pool_id) in agents.iter().zip(&pool_ids) {
            tracing::info!(agent = %agent, pool_id, "initializing nomination agent");
            let data = self
                .artifacts
                .registry
                .encode_message("initialize_agent", &(agent.clone(), *pool_id))?;
            self.chain
                .call(registry.clone(), data, 0)
                .await
                .with_context(|| format!("failed to initialize agent {agent}"))?;
        }

        tracing::info!("equally weighting agents");
        let weights = vec![EQUAL_WEIGHT; agents.len()];
        let data = self
            .artifacts
            .registry
            .encode_message("update_agents", &(agents.clone(), weights))?;
        self.chain
            .call(registry.clone(), data, 0)
            .await
            .context("failed to set agent weights")?;

        let deployed = DeployedContracts {
            vault,
            share_token,
            registry,
            agents,
        };
        tracing::info!("===== contract locations =====");
        tracing::info!(
            vault = %deployed.vault,
            share_token = %deployed.share_token,
            registry = %deployed.registry,
            "deployed contracts",
        );
        for (index, agent) in deployed.agents.iter().enumerate() {
            tracing::info!(index, address = %agent, "agent");
        }
        Ok(deployed)
    }

    /// Uploads an artifact's code and checks the on-chain hash against the
    /// metadata; the vault constructor receives these hashes, so a mismatch
    /// would wire up the wrong code.
    async fn upload(&self, artifact: &ContractArtifact) -> Result<H256> {
        tracing::info!(name = %artifact.name, code_hash = ?artifact.code_hash(), "uploading code");
        let uploaded = self
            .chain
            .upload_code(artifact.code()?)
            .await
            .with_context(|| format!("failed to upload `{}` code", artifact.name))?;
        ensure!(
            uploaded == artifact.code_hash(),
            "uploaded `{}` code hash {uploaded:?} does not match the artifact metadata",
            artifact.name,
        );
        Ok(uploaded)
    }

    /// Instantiates the share token once so its code lands on chain. The
    /// instance itself is throwaway; the vault instantiates the real token
    /// from the code hash.
    async fn deploy_share_token_template(&self) -> Result<H256> {
        tracing::info!(name = artifacts::SHARE_TOKEN, "deploying code template");
        let constructor = self.artifacts.share_token.encode_constructor(
            "new",
            &(Some("TEST".to_string()), Some("TS".to_string())),
        )?;
        let template = self
            .chain
            .instantiate(self.artifacts.share_token.code()?, constructor)
            .await
            .context("failed to deploy the share token template")?;
        tracing::info!(address = %template, "share token template instance");
        Ok(self.artifacts.share_token.code_hash())
    }

    async fn vault_address_query(
        &self,
        vault: &AccountId32,
        message: &str,
    ) -> Result<AccountId32> {
        let data = self.artifacts.vault.encode_message(message, &())?;
        let output = self
            .chain
            .query(vault.clone(), data)
            .await
            .with_context(|| format!("`{message}` query failed"))?;
        let value = self.artifacts.vault.decode_message_return(message, &output)?;
        decode::account_id(decode::unwrap_ok(&value)?)
    }
}

/// Constructor data for the vault. The development network gets the
/// fast-unlock constructor so unlock requests mature within seconds.
fn vault_constructor_data(
    vault: &ContractArtifact,
    network: &str,
    share_token_hash: H256,
    registry_hash: H256,
    agent_hash: H256,
) -> Result<Vec<u8>> {
    let data = if network == DEVELOPMENT_NETWORK {
        vault.encode_constructor(
            "custom_era",
            &(
                share_token_hash,
                registry_hash,
                agent_hash,
                DEVELOPMENT_ERA_MS,
            ),
        )?
    } else {
        vault.encode_constructor("new", &(share_token_hash, registry_hash, agent_hash))?
    };
    Ok(data)
}

/// Extracts the agent addresses from the output of the registry's
/// `get_agents` message. The message returns the total weight together with
/// the agent records; only the addresses matter here.
fn decode_agents(registry: &ContractArtifact, output: &[u8]) -> Result<Vec<AccountId32>> {
    let value = registry.decode_message_return("get_agents", output)?;
    let result = decode::unwrap_ok(&value).context("`get_agents` message failed")?;
    let payload = decode::unwrap_ok(result).context("`get_agents` returned an error")?;
    let list = payload
        .at(1)
        .context("`get_agents` output lacks the agent list")?;
    decode::items(list)?
        .into_iter()
        .map(|agent| {
            let address = agent.at("address").context("agent record lacks an address")?;
            decode::account_id(address)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::traits::MockChainOps,
        mockall::{predicate::eq, Sequence},
        parity_scale_codec::Encode,
    };

    const MIN_BOND: u128 = 100;
    const DEPOSIT: u128 = 1;

    fn artifact(name: &str, metadata: serde_json::Value) -> ContractArtifact {
        ContractArtifact::from_json(name, &metadata.to_string()).unwrap()
    }

    fn artifact_set() -> ArtifactSet {
        ArtifactSet {
            registry: artifact(artifacts::REGISTRY, testlib::registry_metadata()),
            share_token: artifact(artifacts::SHARE_TOKEN, testlib::share_token_metadata()),
            nomination_agent: artifact(
                artifacts::NOMINATION_AGENT,
                testlib::nomination_agent_metadata(),
            ),
            vault: artifact(artifacts::VAULT, testlib::vault_metadata()),
        }
    }

    fn account(byte: u8) -> AccountId32 {
        AccountId32([byte; 32])
    }

    fn admin() -> AccountId32 {
        account(0x01)
    }

    fn registry_address() -> AccountId32 {
        account(0x51)
    }

    fn share_token_address() -> AccountId32 {
        account(0x52)
    }

    fn vault_address() -> AccountId32 {
        account(0x53)
    }

    fn service(chain: MockChainOps, network: &str) -> DeploymentService {
        DeploymentService::new(Box::new(chain), artifact_set(), network.to_string())
    }

    #[derive(Encode)]
    struct AgentRecord {
        address: [u8; 32],
        weight: u64,
    }

    /// `get_agents` output: `MessageResult<Result<(u64, Vec<Agent>), _>>`.
    fn get_agents_response(agents: &[AccountId32]) -> Vec<u8> {
        let records: Vec<AgentRecord> = agents
            .iter()
            .map(|agent| AgentRecord {
                address: agent.0,
                weight: EQUAL_WEIGHT,
            })
            .collect();
        let payload: Result<Result<(u64, Vec<AgentRecord>), u8>, u8> = Ok(Ok((0, records)));
        payload.encode()
    }

    /// Vault getter output: `MessageResult<AccountId>`.
    fn address_response(address: &AccountId32) -> Vec<u8> {
        Ok::<_, u8>(address.0).encode()
    }

    /// Mocks the full happy path for the given validators, with the registry
    /// reporting `agents` afterwards. Registration and initialization order
    /// is enforced through a sequence.
    fn configured_chain(validators: &[AccountId32], agents: &[AccountId32]) -> MockChainOps {
        let set = artifact_set();
        let mut chain = MockChainOps::new();
        chain.expect_signer_account().return_const(admin());
        chain.expect_min_nominator_bond().returning(|| Ok(MIN_BOND));
        chain.expect_existential_deposit().returning(|| Ok(DEPOSIT));

        let registry_code = set.registry.code().unwrap();
        let registry_hash = set.registry.code_hash();
        let agent_code = set.nomination_agent.code().unwrap();
        let agent_hash = set.nomination_agent.code_hash();
        chain
            .expect_upload_code()
            .times(2)
            .returning(move |code| {
                if code == registry_code {
                    Ok(registry_hash)
                } else {
                    assert_eq!(code, agent_code, "unexpected code upload");
                    Ok(agent_hash)
                }
            });

        let share_token_code = set.share_token.code().unwrap();
        let vault_code = set.vault.code().unwrap();
        chain
            .expect_instantiate()
            .times(2)
            .returning(move |code, _| {
                if code == share_token_code {
                    Ok(account(0x50))
                } else {
                    assert_eq!(code, vault_code, "unexpected instantiation");
                    Ok(vault_address())
                }
            });

        // One pool is created per registration, so the last pool id grows by
        // one between reads. First registration sees pool id 5.
        let mut last = 3u32;
        chain
            .expect_last_pool_id()
            .times(validators.len())
            .returning(move || {
                last += 1;
                Ok(last)
            });

        let get_registry = set
            .vault
            .encode_message("IVault::get_registry_contract", &())
            .unwrap();
        chain
            .expect_query()
            .with(eq(vault_address()), eq(get_registry))
            .times(1)
            .returning(|_, _| Ok(address_response(&registry_address())));
        let get_share_token = set
            .vault
            .encode_message("IVault::get_share_token_contract", &())
            .unwrap();
        chain
            .expect_query()
            .with(eq(vault_address()), eq(get_share_token))
            .times(1)
            .returning(|_, _| Ok(address_response(&share_token_address())));
        let get_agents = set.registry.encode_message("get_agents", &()).unwrap();
        let reported = agents.to_vec();
        chain
            .expect_query()
            .with(eq(registry_address()), eq(get_agents))
            .times(1)
            .returning(move |_, _| Ok(get_agents_response(&reported)));

        let mut order = Sequence::new();
        for validator in validators {
            let data = set
                .registry
                .encode_message(
                    "add_agent",
                    &(admin(), validator.clone(), MIN_BOND, DEPOSIT),
                )
                .unwrap();
            chain
                .expect_call()
                .with(eq(registry_address()), eq(data), eq(MIN_BOND + DEPOSIT))
                .times(1)
                .in_sequence(&mut order)
                .returning(|_, _, _| Ok(()));
        }
        for (agent, pool_id) in agents.iter().take(validators.len()).zip(5u32..) {
            let data = set
                .registry
                .encode_message("initialize_agent", &(agent.clone(), pool_id))
                .unwrap();
            chain
                .expect_call()
                .with(eq(registry_address()), eq(data), eq(0u128))
                .times(1)
                .in_sequence(&mut order)
                .returning(|_, _, _| Ok(()));
        }
        let weights = set
            .registry
            .encode_message(
                "update_agents",
                &(agents.to_vec(), vec![EQUAL_WEIGHT; agents.len()]),
            )
            .unwrap();
        chain
            .expect_call()
            .with(eq(registry_address()), eq(weights), eq(0u128))
            .times(1)
            .in_sequence(&mut order)
            .returning(|_, _, _| Ok(()));

        chain
    }

    #[tokio::test]
    async fn empty_validator_list_fails_before_any_chain_operation() {
        // No expectations are set up: any chain operation would panic.
        let service = service(MockChainOps::new(), DEVELOPMENT_NETWORK);
        let err = service.run(&[]).await.unwrap_err();
        assert!(err.to_string().contains("must specify validator addresses"));
    }

    #[tokio::test]
    async fn duplicate_validators_fail_before_any_chain_operation() {
        let service = service(MockChainOps::new(), DEVELOPMENT_NETWORK);
        let err = service
            .run(&[account(0xa1), account(0xa1)])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("duplicate validator address"));
    }

    #[tokio::test]
    async fn registers_and_initializes_agents_in_input_order() {
        let validators = [account(0xa1), account(0xa2), account(0xa3)];
        let agents = [account(0x61), account(0x62), account(0x63)];
        let chain = configured_chain(&validators, &agents);

        let deployed = service(chain, DEVELOPMENT_NETWORK)
            .run(&validators)
            .await
            .unwrap();

        assert_eq!(deployed.vault, vault_address());
        assert_eq!(deployed.share_token, share_token_address());
        assert_eq!(deployed.registry, registry_address());
        assert_eq!(deployed.agents, agents.to_vec());
    }

    #[tokio::test]
    async fn extra_registry_agents_are_weighted_but_not_initialized() {
        // The registry reports one agent more than this run registered; the
        // weighting call covers all of them, initialization stays at N.
        let validators = [account(0xa1), account(0xa2)];
        let agents = [account(0x61), account(0x62), account(0x63)];
        let chain = configured_chain(&validators, &agents);

        let deployed = service(chain, DEVELOPMENT_NETWORK)
            .run(&validators)
            .await
            .unwrap();
        assert_eq!(deployed.agents.len(), 3);
    }

    #[test]
    fn constructor_selection_follows_the_network() {
        let set = artifact_set();
        let share_token_hash = set.share_token.code_hash();
        let registry_hash = set.registry.code_hash();
        let agent_hash = set.nomination_agent.code_hash();

        let development = vault_constructor_data(
            &set.vault,
            DEVELOPMENT_NETWORK,
            share_token_hash,
            registry_hash,
            agent_hash,
        )
        .unwrap();
        assert_eq!(
            development[..4],
            set.vault.metadata.constructor("custom_era").unwrap().selector
        );
        // three 32 byte code hashes plus the era in milliseconds
        assert_eq!(development.len(), 4 + 3 * 32 + 8);
        assert_eq!(development[4 + 3 * 32..], DEVELOPMENT_ERA_MS.encode());

        let production = vault_constructor_data(
            &set.vault,
            "testnet",
            share_token_hash,
            registry_hash,
            agent_hash,
        )
        .unwrap();
        assert_eq!(
            production[..4],
            set.vault.metadata.constructor("new").unwrap().selector
        );
        assert_eq!(production.len(), 4 + 3 * 32);
        assert_eq!(development[4..4 + 3 * 32], production[4..]);
    }

    #[test]
    fn validation_rejects_empty_and_duplicate_lists() {
        assert!(validate_validators(&[]).is_err());
        assert!(validate_validators(&[account(1), account(2), account(1)]).is_err());
        assert!(validate_validators(&[account(1), account(2)]).is_ok());
    }

    #[test]
    fn decode_agents_extracts_addresses_in_order() {
        let set = artifact_set();
        let agents = [account(0x61), account(0x62)];
        let output = get_agents_response(&agents);
        assert_eq!(decode_agents(&set.registry, &output).unwrap(), agents.to_vec());
    }

    #[test]
    fn decode_agents_surfaces_contract_errors() {
        let set = artifact_set();
        let payload: Result<Result<(u64, Vec<AgentRecord>), u8>, u8> = Ok(Err(0));
        let err = decode_agents(&set.registry, &payload.encode()).unwrap_err();
        assert!(
            err.to_string().contains("`get_agents` returned an error"),
            "unexpected message: {err}"
        );
    }
}
