//! Helpers for navigating dynamically decoded SCALE values.
//!
//! Contract outputs and event fields arrive as `scale_value::Value` trees
//! whose exact nesting (newtype wrappers, arrays vs sequences) depends on
//! the type registry that produced them. These helpers extract the handful
//! of shapes the deployment workflow cares about.

use {
    anyhow::{anyhow, bail, Context, Result},
    std::fmt::Debug,
    subxt::{
        ext::scale_value::{At, Composite, Primitive, Value, ValueDef},
        utils::AccountId32,
    },
};

/// Looks up a named field of a composite, e.g. an event's field set.
pub fn field<'a, T>(composite: &'a Composite<T>, name: &str) -> Result<&'a Value<T>> {
    match composite {
        Composite::Named(fields) => fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value),
        Composite::Unnamed(_) => None,
    }
    .ok_or_else(|| anyhow!("missing field `{name}`"))
}

/// Extracts an unsigned integer, looking through single-element wrappers
/// such as compact encodings and newtypes.
pub fn uint<T>(value: &Value<T>) -> Result<u128> {
    match &value.value {
        ValueDef::Primitive(Primitive::U128(value)) => Ok(*value),
        ValueDef::Composite(Composite::Unnamed(inner)) if inner.len() == 1 => uint(&inner[0]),
        _ => bail!("expected an unsigned integer"),
    }
}

/// Flattens a value consisting of byte primitives (arrays, sequences,
/// newtype wrappers) into the raw bytes.
pub fn bytes<T>(value: &Value<T>) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    collect_bytes(value, &mut out)?;
    Ok(out)
}

fn collect_bytes<T>(value: &Value<T>, out: &mut Vec<u8>) -> Result<()> {
    match &value.value {
        ValueDef::Primitive(Primitive::U128(byte)) => {
            out.push(u8::try_from(*byte).map_err(|_| anyhow!("byte value out of range"))?);
        }
        ValueDef::Composite(composite) => {
            for inner in composite.values() {
                collect_bytes(inner, out)?;
            }
        }
        _ => bail!("expected byte data"),
    }
    Ok(())
}

/// Extracts a 32 byte account id.
pub fn account_id<T>(value: &Value<T>) -> Result<AccountId32> {
    let bytes = bytes(value)?;
    let bytes: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| anyhow!("account id has {} bytes, expected 32", bytes.len()))?;
    Ok(AccountId32(bytes))
}

/// Unwraps the payload of an `Ok` variant; any other variant becomes an
/// error naming the variant and its payload.
pub fn unwrap_ok<T: Debug>(value: &Value<T>) -> Result<&Value<T>> {
    match &value.value {
        ValueDef::Variant(variant) if variant.name == "Ok" => variant
            .values
            .values()
            .next()
            .ok_or_else(|| anyhow!("`Ok` variant carries no payload")),
        ValueDef::Variant(variant) => {
            bail!("call returned `{}`: {:?}", variant.name, variant.values)
        }
        _ => bail!("expected a Result variant"),
    }
}

/// The elements of a sequence or tuple value.
pub fn items<T>(value: &Value<T>) -> Result<Vec<&Value<T>>> {
    match &value.value {
        ValueDef::Composite(composite) => Ok(composite.values().collect()),
        _ => bail!("expected a sequence"),
    }
}

/// Extracts a `(ref_time, proof_size)` weight pair.
pub fn weight<T>(value: &Value<T>) -> Result<(u64, u64)> {
    let ref_time = uint(value.at("ref_time").context("weight lacks `ref_time`")?)?;
    let proof_size = uint(value.at("proof_size").context("weight lacks `proof_size`")?)?;
    Ok((
        u64::try_from(ref_time).context("ref_time out of range")?,
        u64::try_from(proof_size).context("proof_size out of range")?,
    ))
}
