//! Structured result handed to reporters

use serde::Serialize;

use super::analyzer::TorrentAnalysis;
use super::descriptor::TorrentDescriptor;

/// Complete result for one torrent file: display fields plus derived facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TorrentReport {
    pub descriptor: TorrentDescriptor,
    pub analysis: TorrentAnalysis,
}

impl TorrentReport {
    pub fn new(descriptor: TorrentDescriptor, analysis: TorrentAnalysis) -> Self {
        Self {
            descriptor,
            analysis,
        }
    }

    /// Piece hashes as a JSON array of hex strings, for persisting next to the report.
    ///
    /// # Errors
    ///
    /// - `serde_json::Error` - Serialization failed
    pub fn piece_hashes_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.analysis.piece_hashes)
    }

    /// Whole report as pretty-printed JSON, without the piece hash list.
    ///
    /// # Errors
    ///
    /// - `serde_json::Error` - Serialization failed
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
