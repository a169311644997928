//! Single-line save codes that persist a session's progress.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use route_defence_core::SaveRecord;
use thiserror::Error;

const SAVE_DOMAIN: &str = "route";
const SAVE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded payload.
pub(crate) const SAVE_HEADER: &str = "route:v1";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while encoding or decoding save codes.
#[derive(Debug, Error)]
pub(crate) enum SaveCodeError {
    /// The provided string was empty or contained only whitespace.
    #[error("save code was empty")]
    EmptyPayload,
    /// A required segment was missing.
    #[error("save code is missing the {0}")]
    MissingSegment(&'static str),
    /// The prefix segment did not name this game.
    #[error("save prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The version segment is not understood by this build.
    #[error("save version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode save payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not process save payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Encodes a save record into a single-line string.
pub(crate) fn encode(record: &SaveRecord) -> Result<String, SaveCodeError> {
    let json = serde_json::to_vec(record)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{SAVE_HEADER}{FIELD_DELIMITER}{encoded}"))
}

/// Decodes a save record from its string representation.
pub(crate) fn decode(value: &str) -> Result<SaveRecord, SaveCodeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SaveCodeError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().ok_or(SaveCodeError::MissingSegment("prefix"))?;
    let version = parts
        .next()
        .ok_or(SaveCodeError::MissingSegment("version"))?;
    let payload = parts
        .next()
        .ok_or(SaveCodeError::MissingSegment("payload"))?;

    if domain != SAVE_DOMAIN {
        return Err(SaveCodeError::InvalidPrefix(domain.to_owned()));
    }
    if version != SAVE_VERSION {
        return Err(SaveCodeError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
    Ok(serde_json::from_slice(&bytes)?)
}
