//! Contract operations against the chain's contracts pallet.
//!
//! Every state-changing operation is preceded by a dry run through the
//! `ContractsApi` runtime API. The dry run supplies the gas limit for the
//! real submission and surfaces contract-level failures before anything is
//! signed.

use {
    crate::{decode, Node},
    anyhow::{anyhow, bail, Context, Result},
    rand::RngCore,
    subxt::{
        blocks::ExtrinsicEvents,
        dynamic::{self, Value},
        ext::scale_value::{At, Composite},
        utils::{AccountId32, H256},
        PolkadotConfig,
    },
    subxt_signer::sr25519::Keypair,
};

const PALLET: &str = "Contracts";

/// Bit set in a return value's `flags` field when the contract reverted.
const REVERT_FLAG: u128 = 0b1;

/// Uploads contract code without instantiating it, returning the on-chain
/// code hash.
pub async fn upload_code(node: &Node, signer: &Keypair, code: Vec<u8>) -> Result<H256> {
    let tx = dynamic::tx(
        PALLET,
        "upload_code",
        vec![
            Value::from_bytes(code),
            none(),
            Value::unnamed_variant("Enforced", Vec::<Value>::new()),
        ],
    );
    let events = submit(node, signer, &tx).await?;
    let event = find_event(&events, "CodeStored")?;
    let hash = decode::bytes(decode::field(&event, "code_hash")?)?;
    let hash: [u8; 32] = hash
        .as_slice()
        .try_into()
        .map_err(|_| anyhow!("code hash event field has {} bytes, expected 32", hash.len()))?;
    Ok(H256(hash))
}

/// Instantiates a contract from code and encoded constructor input,
/// returning the address of the new contract.
pub async fn instantiate(
    node: &Node,
    signer: &Keypair,
    code: Vec<u8>,
    data: Vec<u8>,
    value: u128,
) -> Result<AccountId32> {
    let origin = crate::signer::account_id(signer);
    let salt = salt();
    let dry_run = dynamic::runtime_api_call(
        "ContractsApi",
        "instantiate",
        vec![
            Value::from_bytes(origin.0),
            Value::u128(value),
            none(),
            none(),
            Value::unnamed_variant("Upload", vec![Value::from_bytes(&code)]),
            Value::from_bytes(&data),
            Value::from_bytes(&salt),
        ],
    );
    let outcome = node
        .client
        .runtime_api()
        .at_latest()
        .await?
        .call(dry_run)
        .await
        .context("instantiation dry run failed")?
        .to_value()?;
    ensure_instantiation_succeeded(&outcome)?;

    let tx = dynamic::tx(
        PALLET,
        "instantiate_with_code",
        vec![
            Value::u128(value),
            gas_required(&outcome)?,
            none(),
            Value::from_bytes(code),
            Value::from_bytes(data),
            Value::from_bytes(salt),
        ],
    );
    let events = submit(node, signer, &tx).await?;
    let event = find_event(&events, "Instantiated")?;
    decode::account_id(decode::field(&event, "contract")?)
}

/// Submits a contract call with the given transferred value and waits for
/// inclusion.
pub async fn call(
    node: &Node,
    signer: &Keypair,
    dest: &AccountId32,
    data: Vec<u8>,
    value: u128,
) -> Result<()> {
    let origin = crate::signer::account_id(signer);
    let outcome = dry_run_call(node, &origin, dest, &data, value).await?;
    return_data(&outcome)?;

    let tx = dynamic::tx(
        PALLET,
        "call",
        vec![
            Value::unnamed_variant("Id", vec![Value::from_bytes(dest.0)]),
            Value::u128(value),
            gas_required(&outcome)?,
            none(),
            Value::from_bytes(data),
        ],
    );
    submit(node, signer, &tx).await?;
    Ok(())
}

/// Dry-runs a read-only contract call and returns its raw output bytes.
pub async fn query(
    node: &Node,
    origin: &AccountId32,
    dest: &AccountId32,
    data: Vec<u8>,
) -> Result<Vec<u8>> {
    let outcome = dry_run_call(node, origin, dest, &data, 0).await?;
    return_data(&outcome)
}

async fn dry_run_call(
    node: &Node,
    origin: &AccountId32,
    dest: &AccountId32,
    data: &[u8],
    value: u128,
) -> Result<Value<u32>> {
    let payload = dynamic::runtime_api_call(
        "ContractsApi",
        "call",
        vec![
            Value::from_bytes(origin.0),
            Value::from_bytes(dest.0),
            Value::u128(value),
            none(),
            none(),
            Value::from_bytes(data),
        ],
    );
    Ok(node
        .client
        .runtime_api()
        .at_latest()
        .await?
        .call(payload)
        .await
        .context("contract call dry run failed")?
        .to_value()?)
}

async fn submit<Call: subxt::tx::Payload>(
    node: &Node,
    signer: &Keypair,
    tx: &Call,
) -> Result<ExtrinsicEvents<PolkadotConfig>> {
    node.client
        .tx()
        .sign_and_submit_then_watch_default(tx, signer)
        .await
        .context("failed to submit extrinsic")?
        .wait_for_finalized_success()
        .await
        .context("extrinsic was not successfully finalized")
}

fn find_event(events: &ExtrinsicEvents<PolkadotConfig>, variant: &str) -> Result<Composite<u32>> {
    for event in events.iter() {
        let event = event?;
        if event.pallet_name() == PALLET && event.variant_name() == variant {
            return Ok(event.field_values()?);
        }
    }
    bail!("transaction emitted no `{PALLET}::{variant}` event")
}

/// The `Ok` payload of a dry run's `result` field. A failed dry run becomes
/// an error carrying the contract's debug buffer when one is present.
fn dry_run_payload<'a>(outcome: &'a Value<u32>) -> Result<&'a Value<u32>> {
    let result = outcome
        .at("result")
        .context("dry run response lacks `result`")?;
    match decode::unwrap_ok(result) {
        Ok(payload) => Ok(payload),
        Err(err) => {
            let debug = debug_message(outcome);
            if debug.is_empty() {
                Err(err)
            } else {
                Err(err.context(format!("contract debug message: {debug}")))
            }
        }
    }
}

/// Output bytes of a successful `ContractsApi::call` dry run.
fn return_data(outcome: &Value<u32>) -> Result<Vec<u8>> {
    let payload = dry_run_payload(outcome)?;
    let flags = decode::uint(payload.at("flags").context("return value lacks `flags`")?)?;
    if flags & REVERT_FLAG != 0 {
        bail!("contract reverted: {}", debug_message(outcome));
    }
    decode::bytes(payload.at("data").context("return value lacks `data`")?)
}

fn ensure_instantiation_succeeded(outcome: &Value<u32>) -> Result<()> {
    let payload = dry_run_payload(outcome)?;
    let result = payload
        .at("result")
        .context("instantiation payload lacks `result`")?;
    let flags = decode::uint(result.at("flags").context("return value lacks `flags`")?)?;
    if flags & REVERT_FLAG != 0 {
        bail!("constructor reverted: {}", debug_message(outcome));
    }
    Ok(())
}

fn debug_message(outcome: &Value<u32>) -> String {
    outcome
        .at("debug_message")
        .and_then(|message| decode::bytes(message).ok())
        .map(|message| String::from_utf8_lossy(&message).into_owned())
        .unwrap_or_default()
}

fn gas_required(outcome: &Value<u32>) -> Result<Value> {
    let (ref_time, proof_size) = decode::weight(
        outcome
            .at("gas_required")
            .context("dry run response lacks `gas_required`")?,
    )?;
    Ok(Value::named_composite(vec![
        ("ref_time", Value::u128(u128::from(ref_time))),
        ("proof_size", Value::u128(u128::from(proof_size))),
    ]))
}

/// Random salt so repeated instantiations of the same code and input get
/// distinct addresses.
fn salt() -> Vec<u8> {
    let mut salt = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut salt);
    salt.to_vec()
}

fn none() -> Value {
    Value::unnamed_variant("None", Vec::<Value>::new())
}
