//! Binary persistence of models and test data.
//!
//! Every artifact is a bincode-encoded [`Envelope`] wrapping the bincode
//! payload of the value itself:
//!
//! ```text
//! magic "LMFA" | format version | kind | created_at (ms) | crc32(payload) | payload
//! ```
//!
//! The kind tag makes it an error to load test labels as a model, and the
//! checksum catches truncated or corrupted objects before the payload is
//! decoded.

use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::ml::{FeatureMatrix, LinearModel};
use crate::storage::ObjectStore;

/// Leading bytes of every artifact.
pub const MAGIC: [u8; 4] = *b"LMFA";

/// Envelope layout version written by this crate.
pub const FORMAT_VERSION: u32 = 1;

/// What an artifact holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Model,
    Features,
    Labels,
}

/// Values that can be stored as artifacts.
pub trait Artifact: Serialize + DeserializeOwned {
    const KIND: ArtifactKind;
}

impl Artifact for LinearModel {
    const KIND: ArtifactKind = ArtifactKind::Model;
}

impl Artifact for FeatureMatrix {
    const KIND: ArtifactKind = ArtifactKind::Features;
}

impl Artifact for Vec<f64> {
    const KIND: ArtifactKind = ArtifactKind::Labels;
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    magic: [u8; 4],
    version: u32,
    kind: ArtifactKind,
    created_at: i64,
    checksum: u32,
    payload: Vec<u8>,
}

/// Header fields of a stored artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub kind: ArtifactKind,
    pub version: u32,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub payload_len: usize,
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| PipelineError::serialization(format!("Failed to encode artifact: {e}")))
}

fn decode<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T> {
    let (value, read) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map_err(|e| PipelineError::serialization(format!("Failed to decode {what}: {e}")))?;
    if read != bytes.len() {
        return Err(PipelineError::serialization(format!(
            "{} trailing bytes after {what}",
            bytes.len() - read
        )));
    }
    Ok(value)
}

fn open_envelope(bytes: &[u8]) -> Result<Envelope> {
    let envelope: Envelope = decode(bytes, "artifact envelope")?;

    if envelope.magic != MAGIC {
        return Err(PipelineError::serialization("not an artifact (bad magic)"));
    }
    if envelope.version != FORMAT_VERSION {
        return Err(PipelineError::serialization(format!(
            "unsupported artifact version {} (expected {FORMAT_VERSION})",
            envelope.version
        )));
    }
    let checksum = crc32fast::hash(&envelope.payload);
    if checksum != envelope.checksum {
        return Err(PipelineError::serialization(format!(
            "checksum mismatch: stored {:08x}, computed {checksum:08x}",
            envelope.checksum
        )));
    }

    Ok(envelope)
}

/// Serialize a value into artifact bytes.
pub fn serialize<T: Artifact>(value: &T) -> Result<Vec<u8>> {
    let payload = encode(value)?;
    let envelope = Envelope {
        magic: MAGIC,
        version: FORMAT_VERSION,
        kind: T::KIND,
        created_at: chrono::Utc::now().timestamp_millis(),
        checksum: crc32fast::hash(&payload),
        payload,
    };
    encode(&envelope)
}

/// Deserialize artifact bytes, checking header, kind and checksum.
pub fn deserialize<T: Artifact>(bytes: &[u8]) -> Result<T> {
    let envelope = open_envelope(bytes)?;
    if envelope.kind != T::KIND {
        return Err(PipelineError::serialization(format!(
            "expected a {:?} artifact, found {:?}",
            T::KIND,
            envelope.kind
        )));
    }
    decode(&envelope.payload, "artifact payload")
}

/// Read the header of artifact bytes without decoding the payload.
pub fn inspect(bytes: &[u8]) -> Result<ArtifactInfo> {
    let envelope = open_envelope(bytes)?;
    Ok(ArtifactInfo {
        kind: envelope.kind,
        version: envelope.version,
        created_at: envelope.created_at,
        payload_len: envelope.payload.len(),
    })
}

/// Serialize `value` and put it under `bucket/key`.
pub fn save<T: Artifact>(store: &dyn ObjectStore, bucket: &str, key: &str, value: &T) -> Result<()> {
    info!("serializing {:?} artifact for {bucket}/{key}", T::KIND);

    let result = serialize(value).and_then(|bytes| {
        debug!("uploading {} bytes", bytes.len());
        store.put(bucket, key, &bytes)
    });

    match result {
        Ok(()) => {
            info!("artifact uploaded to {bucket}/{key}");
            Ok(())
        }
        Err(e) => {
            error!("failed to save {bucket}/{key} - {e}");
            Err(e)
        }
    }
}

/// Get `bucket/key` and deserialize it.
pub fn load<T: Artifact>(store: &dyn ObjectStore, bucket: &str, key: &str) -> Result<T> {
    info!("loading {:?} artifact from {bucket}/{key}", T::KIND);

    store
        .get(bucket, key)
        .and_then(|bytes| deserialize(&bytes))
        .inspect_err(|e| error!("failed to load {bucket}/{key} - {e}"))
}
