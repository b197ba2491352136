//! Decode, extract and analyze pipeline for one torrent buffer

use super::analyzer::MetadataAnalyzer;
use super::descriptor::TorrentDescriptor;
use super::report::TorrentReport;
use super::TorrentError;
use crate::bencode::decode_with_limits;
use crate::config::SlicerConfig;

/// Runs the full pipeline over in-memory torrent bytes.
///
/// Holds only configuration, so one instance can serve many independent
/// calls, including from several threads.
#[derive(Debug, Clone, Default)]
pub struct TorrentSlicer {
    config: SlicerConfig,
    analyzer: MetadataAnalyzer,
}

impl TorrentSlicer {
    pub fn new(config: SlicerConfig) -> Self {
        Self {
            analyzer: MetadataAnalyzer::new(config.analysis),
            config,
        }
    }

    pub fn config(&self) -> &SlicerConfig {
        &self.config
    }

    /// Decodes `data`, extracts the descriptor and computes the analysis.
    ///
    /// # Errors
    ///
    /// - `TorrentError::Decode` - Bencode syntax is invalid or truncated
    /// - `TorrentError::ResourceLimit` - Input size or nesting exceeds the configured limits
    /// - `TorrentError::MalformedTorrent` - Document lacks required fields or has mistyped ones
    pub fn slice(&self, data: &[u8]) -> Result<TorrentReport, TorrentError> {
        let (root, consumed) = decode_with_limits(data, &self.config.decode)?;
        if consumed < data.len() {
            tracing::debug!(
                consumed,
                trailing = data.len() - consumed,
                "Ignoring bytes after torrent document"
            );
        }

        let descriptor = TorrentDescriptor::from_root(&root)?;
        let analysis = self.analyzer.analyze(&descriptor)?;

        Ok(TorrentReport::new(descriptor, analysis))
    }
}
