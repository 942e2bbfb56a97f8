//! Deployment artifacts for the contracts this workspace deploys.
//!
//! An artifact is the build output of one contract: its Wasm code and the
//! ink! metadata describing constructors, messages, and types. Artifacts are
//! loaded by name from a directory, either as a bundled `<name>.contract`
//! file (metadata with embedded Wasm) or as a `<name>.json` / `<name>.wasm`
//! pair.

pub mod metadata;

pub use metadata::Metadata;

use {
    parity_scale_codec::Encode,
    std::{
        fs,
        path::{Path, PathBuf},
    },
    subxt::{ext::scale_value::{scale, Value}, utils::H256},
};

pub const REGISTRY: &str = "registry";
pub const SHARE_TOKEN: &str = "share_token";
pub const NOMINATION_AGENT: &str = "nomination_agent";
pub const VAULT: &str = "vault";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("no artifact named `{0}` in `{}`", .1.display())]
    NotFound(String, PathBuf),
    #[error("artifact `{0}` carries no contract code")]
    MissingCode(String),
    #[error("constructor `{0}` is not defined by the metadata")]
    UnknownConstructor(String),
    #[error("message `{0}` is not defined by the metadata")]
    UnknownMessage(String),
    #[error("message `{0}` does not declare a return type")]
    MissingReturnType(String),
    #[error("malformed selector `{0}`")]
    MalformedSelector(String),
    #[error("source.hash `{0}` is not a 32 byte hex string")]
    MalformedCodeHash(String),
    #[error("malformed hex blob in metadata")]
    MalformedHex(#[from] hex::FromHexError),
    #[error("malformed metadata document")]
    MalformedMetadata(#[from] serde_json::Error),
    #[error("failed to decode contract output: {0}")]
    Decode(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A named contract artifact, ready to encode calls against.
pub struct ContractArtifact {
    pub name: String,
    pub metadata: Metadata,
}

impl ContractArtifact {
    /// Loads the artifact `name` from `dir`, preferring a bundled
    /// `<name>.contract` file over a `<name>.json` / `<name>.wasm` pair.
    pub fn load(dir: &Path, name: &str) -> Result<Self, ArtifactError> {
        let bundled = dir.join(format!("{name}.contract"));
        if bundled.exists() {
            return Self::from_json(name, &fs::read_to_string(bundled)?);
        }
        let metadata_path = dir.join(format!("{name}.json"));
        if !metadata_path.exists() {
            return Err(ArtifactError::NotFound(name.to_string(), dir.to_path_buf()));
        }
        let mut artifact = Self::from_json(name, &fs::read_to_string(metadata_path)?)?;
        if artifact.metadata.wasm.is_none() {
            let wasm_path = dir.join(format!("{name}.wasm"));
            if wasm_path.exists() {
                artifact.metadata.wasm = Some(fs::read(wasm_path)?);
            }
        }
        Ok(artifact)
    }

    pub fn from_json(name: &str, raw: &str) -> Result<Self, ArtifactError> {
        Ok(Self {
            name: name.to_string(),
            metadata: Metadata::from_json(raw)?,
        })
    }

    /// The contract Wasm blob.
    pub fn code(&self) -> Result<Vec<u8>, ArtifactError> {
        self.metadata
            .wasm
            .clone()
            .ok_or_else(|| ArtifactError::MissingCode(self.name.clone()))
    }

    /// Code hash as reported by the contract build.
    pub fn code_hash(&self) -> H256 {
        self.metadata.code_hash
    }

    /// Encodes a constructor call as `selector ++ SCALE(args)`.
    pub fn encode_constructor<Args: Encode>(
        &self,
        label: &str,
        args: &Args,
    ) -> Result<Vec<u8>, ArtifactError> {
        Ok(encode_call(self.metadata.constructor(label)?.selector, args))
    }

    /// Encodes a message call as `selector ++ SCALE(args)`.
    pub fn encode_message<Args: Encode>(
        &self,
        label: &str,
        args: &Args,
    ) -> Result<Vec<u8>, ArtifactError> {
        Ok(encode_call(self.metadata.message(label)?.selector, args))
    }

    /// Decodes the raw output of a message against the artifact's own type
    /// registry. The returned value carries the full ink! wrapping, i.e.
    /// `MessageResult<..>` is the outermost layer.
    pub fn decode_message_return(
        &self,
        label: &str,
        data: &[u8],
    ) -> Result<Value<u32>, ArtifactError> {
        let message = self.metadata.message(label)?;
        let ty = message
            .return_type
            .ok_or_else(|| ArtifactError::MissingReturnType(label.to_string()))?;
        let mut cursor = data;
        scale::decode_as_type(&mut cursor, ty, self.metadata.types())
            .map_err(|err| ArtifactError::Decode(format!("{label}: {err}")))
    }
}

fn encode_call<Args: Encode>(selector: [u8; 4], args: &Args) -> Vec<u8> {
    let mut data = selector.to_vec();
    args.encode_to(&mut data);
    data
}

/// The four artifacts the deployment workflow needs, loaded together.
pub struct ArtifactSet {
    pub registry: ContractArtifact,
    pub share_token: ContractArtifact,
    pub nomination_agent: ContractArtifact,
    pub vault: ContractArtifact,
}

impl ArtifactSet {
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        Ok(Self {
            registry: ContractArtifact::load(dir, REGISTRY)?,
            share_token: ContractArtifact::load(dir, SHARE_TOKEN)?,
            nomination_agent: ContractArtifact::load(dir, NOMINATION_AGENT)?,
            vault: ContractArtifact::load(dir, VAULT)?,
        })
    }
}
