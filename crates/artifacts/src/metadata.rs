//! Parsing of ink! contract metadata documents.
//!
//! Only the parts the deployment workflow consumes are modelled: the code
//! hash and Wasm blob from `source`, the constructor/message selectors from
//! `spec`, and the portable type registry used to decode message outputs.

use {
    crate::ArtifactError,
    scale_info::PortableRegistry,
    serde::Deserialize,
    std::collections::HashMap,
    subxt::utils::H256,
};

/// Parsed deployment metadata of a single contract.
pub struct Metadata {
    /// Hash of the contract code, as reported by the contract build.
    pub code_hash: H256,
    pub(crate) wasm: Option<Vec<u8>>,
    constructors: HashMap<String, Dispatchable>,
    messages: HashMap<String, Dispatchable>,
    types: PortableRegistry,
}

/// A callable entry point: a constructor or a message.
pub struct Dispatchable {
    pub selector: [u8; 4],
    /// Id of the return type in the artifact's type registry. Constructors
    /// and fire-and-forget messages may not carry one.
    pub return_type: Option<u32>,
}

#[derive(Deserialize)]
struct RawMetadata {
    source: RawSource,
    spec: RawSpec,
    types: serde_json::Value,
}

#[derive(Deserialize)]
struct RawSource {
    hash: String,
    wasm: Option<String>,
}

#[derive(Deserialize)]
struct RawSpec {
    constructors: Vec<RawDispatchable>,
    messages: Vec<RawDispatchable>,
}

#[derive(Deserialize)]
struct RawDispatchable {
    label: String,
    selector: String,
    #[serde(rename = "returnType")]
    return_type: Option<RawReturnType>,
}

#[derive(Deserialize)]
struct RawReturnType {
    #[serde(rename = "type")]
    ty: u32,
}

impl Metadata {
    pub fn from_json(raw: &str) -> Result<Self, ArtifactError> {
        let raw: RawMetadata = serde_json::from_str(raw)?;
        // The `types` field is the inner list of a serialized
        // `PortableRegistry`; wrap it back into the registry's own format.
        let types: PortableRegistry =
            serde_json::from_value(serde_json::json!({ "types": raw.types }))?;
        let wasm = raw
            .source
            .wasm
            .as_deref()
            .map(decode_hex)
            .transpose()?;
        Ok(Self {
            code_hash: parse_code_hash(&raw.source.hash)?,
            wasm,
            constructors: parse_dispatchables(raw.spec.constructors)?,
            messages: parse_dispatchables(raw.spec.messages)?,
            types,
        })
    }

    pub fn constructor(&self, label: &str) -> Result<&Dispatchable, ArtifactError> {
        self.constructors
            .get(label)
            .ok_or_else(|| ArtifactError::UnknownConstructor(label.to_string()))
    }

    pub fn message(&self, label: &str) -> Result<&Dispatchable, ArtifactError> {
        self.messages
            .get(label)
            .ok_or_else(|| ArtifactError::UnknownMessage(label.to_string()))
    }

    pub fn types(&self) -> &PortableRegistry {
        &self.types
    }
}

fn parse_dispatchables(
    raw: Vec<RawDispatchable>,
) -> Result<HashMap<String, Dispatchable>, ArtifactError> {
    raw.into_iter()
        .map(|dispatchable| {
            let selector = parse_selector(&dispatchable.selector)?;
            Ok((
                dispatchable.label,
                Dispatchable {
                    selector,
                    return_type: dispatchable.return_type.map(|ty| ty.ty),
                },
            ))
        })
        .collect()
}

fn parse_selector(selector: &str) -> Result<[u8; 4], ArtifactError> {
    decode_hex(selector)?
        .as_slice()
        .try_into()
        .map_err(|_| ArtifactError::MalformedSelector(selector.to_string()))
}

fn parse_code_hash(hash: &str) -> Result<H256, ArtifactError> {
    let bytes: [u8; 32] = decode_hex(hash)?
        .as_slice()
        .try_into()
        .map_err(|_| ArtifactError::MalformedCodeHash(hash.to_string()))?;
    Ok(H256(bytes))
}

fn decode_hex(blob: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(blob.strip_prefix("0x").unwrap_or(blob))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_registry_fixture() {
        let metadata = Metadata::from_json(&testlib::registry_metadata().to_string()).unwrap();
        assert_eq!(metadata.constructor("new").unwrap().selector, [0x9b, 0xae, 0x9d, 0x5e]);
        assert_eq!(metadata.message("add_agent").unwrap().selector, [0, 0, 0, 1]);
        assert_eq!(metadata.message("get_agents").unwrap().selector, [0, 0, 0, 4]);
        assert!(metadata.message("get_agents").unwrap().return_type.is_some());
        assert!(metadata.wasm.is_some());
    }

    #[test]
    fn unknown_entry_points_error() {
        let metadata = Metadata::from_json(&testlib::registry_metadata().to_string()).unwrap();
        assert!(matches!(
            metadata.message("does_not_exist"),
            Err(ArtifactError::UnknownMessage(_))
        ));
        assert!(matches!(
            metadata.constructor("does_not_exist"),
            Err(ArtifactError::UnknownConstructor(_))
        ));
    }

    #[test]
    fn rejects_malformed_selector() {
        let mut raw = testlib::registry_metadata();
        raw["spec"]["messages"][0]["selector"] = "0x123".into();
        assert!(matches!(
            Metadata::from_json(&raw.to_string()),
            Err(ArtifactError::MalformedHex(_) | ArtifactError::MalformedSelector(_))
        ));
    }

    #[test]
    fn rejects_short_code_hash() {
        let mut raw = testlib::registry_metadata();
        raw["source"]["hash"] = "0x0102".into();
        assert!(matches!(
            Metadata::from_json(&raw.to_string()),
            Err(ArtifactError::MalformedCodeHash(_))
        ));
    }
}
