//! Torrent semantics built on the bencode decoder

pub mod analyzer;
pub mod descriptor;
pub mod report;
pub mod slicer;

use std::fmt;

use serde::{Serialize, Serializer};

pub use analyzer::{AnalysisWarning, MetadataAnalyzer, TorrentAnalysis, TorrentType};
pub use descriptor::{FileEntry, InfoDictionary, TextField, TorrentDescriptor};
pub use report::TorrentReport;
pub use slicer::TorrentSlicer;

use crate::bencode::DecodeError;

/// SHA-1 hash identifying a unique torrent.
///
/// 20-byte SHA-1 hash of the canonically encoded info dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoHash([u8; 20]);

impl InfoHash {
    /// Creates InfoHash from 20-byte SHA-1 hash.
    pub fn new(hash: [u8; 20]) -> Self {
        Self(hash)
    }

    /// Returns reference to underlying 20-byte hash.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase hex rendering, 40 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for InfoHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Errors that end processing of a single torrent file.
///
/// No partial results accompany these; a caller either gets a complete
/// report or exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TorrentError {
    #[error("Invalid bencode: {0}")]
    Decode(DecodeError),

    #[error("Malformed torrent field '{field}': {reason}")]
    MalformedTorrent { field: String, reason: String },

    #[error("Resource limit exceeded: {0}")]
    ResourceLimit(DecodeError),
}

impl From<DecodeError> for TorrentError {
    fn from(error: DecodeError) -> Self {
        if error.is_resource_limit() {
            TorrentError::ResourceLimit(error)
        } else {
            TorrentError::Decode(error)
        }
    }
}

impl TorrentError {
    pub(crate) fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TorrentError::MalformedTorrent {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns a message suitable for a report shown to end users.
    pub fn user_message(&self) -> String {
        match self {
            TorrentError::Decode(e) => format!("Not a valid torrent file: {e}"),
            TorrentError::MalformedTorrent { field, reason } => {
                format!("Not a valid torrent file: field '{field}' {reason}")
            }
            TorrentError::ResourceLimit(e) => format!("Torrent file rejected: {e}"),
        }
    }

    /// Checks if the input was rejected as oversized or hostile rather than corrupt.
    pub fn is_resource_limit(&self) -> bool {
        matches!(self, TorrentError::ResourceLimit(_))
    }
}
