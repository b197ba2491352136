//! Derived statistics for an extracted torrent descriptor
//!
//! Each computation is a pure function of the descriptor. The analyzer keeps
//! no state between calls.

use std::fmt;

use chrono::DateTime;
use serde::{Serialize, Serializer};
use sha1::{Digest, Sha1};

use super::descriptor::{InfoDictionary, PIECE_HASH_LEN, TorrentDescriptor};
use super::{InfoHash, TorrentError};
use crate::bencode::{BencodeMap, BencodeValue, encode};
use crate::config::{AnalysisConfig, LastPieceFormula};

/// Layout classification of a torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorrentType {
    SingleFile,
    MultipleFile,
}

impl TorrentType {
    pub fn as_str(self) -> &'static str {
        match self {
            TorrentType::SingleFile => "single file torrent",
            TorrentType::MultipleFile => "multiple file torrent",
        }
    }
}

impl fmt::Display for TorrentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TorrentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Advisory consistency findings. Never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisWarning {
    LastPieceExceedsPieceLength,
    PieceLengthExceedsTorrentSize,
}

impl AnalysisWarning {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisWarning::LastPieceExceedsPieceLength => "last piece size exceeds piece length",
            AnalysisWarning::PieceLengthExceedsTorrentSize => "piece length exceeds torrent size",
        }
    }
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AnalysisWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Facts derived from a torrent descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TorrentAnalysis {
    pub info_hash: InfoHash,
    /// Hex digest of every piece, in order
    #[serde(skip)]
    pub piece_hashes: Vec<String>,
    pub number_of_pieces: usize,
    pub piece_length: i64,
    pub torrent_size: i64,
    pub last_piece_size: i64,
    pub torrent_type: TorrentType,
    pub warnings: Vec<AnalysisWarning>,
    pub creation_date_display: String,
}

/// Computes [`TorrentAnalysis`] values from descriptors.
#[derive(Debug, Clone, Default)]
pub struct MetadataAnalyzer {
    config: AnalysisConfig,
}

impl MetadataAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Runs every computation over `descriptor`.
    ///
    /// # Errors
    ///
    /// - `TorrentError::MalformedTorrent` - `info.pieces` is not a whole number
    ///   of digests, or size arithmetic leaves the 64-bit range
    pub fn analyze(&self, descriptor: &TorrentDescriptor) -> Result<TorrentAnalysis, TorrentError> {
        let info = &descriptor.info;

        let info_hash = calculate_info_hash(&info.source);
        let piece_hashes = split_piece_hashes(&info.pieces)?;
        let number_of_pieces = piece_hashes.len();
        let (torrent_size, torrent_type) = calculate_torrent_size(info)?;
        let last_piece_size = calculate_last_piece_size(
            self.config.last_piece_formula,
            torrent_size,
            number_of_pieces,
            info.piece_length,
        )?;
        let warnings = collect_warnings(
            last_piece_size,
            info.piece_length,
            torrent_size,
            torrent_type,
        );
        let creation_date_display = descriptor
            .creation_date
            .map(format_creation_date)
            .unwrap_or_default();

        tracing::debug!(
            %info_hash,
            number_of_pieces,
            torrent_size,
            last_piece_size,
            torrent_type = torrent_type.as_str(),
            "Analyzed torrent metadata"
        );
        for warning in &warnings {
            tracing::debug!(%info_hash, %warning, "Torrent consistency warning");
        }

        Ok(TorrentAnalysis {
            info_hash,
            piece_hashes,
            number_of_pieces,
            piece_length: info.piece_length,
            torrent_size,
            last_piece_size,
            torrent_type,
            warnings,
            creation_date_display,
        })
    }
}

/// SHA-1 of the canonical encoding of the decoded `info` map.
pub fn calculate_info_hash(info: &BencodeMap) -> InfoHash {
    let encoded = encode(&BencodeValue::Map(info.clone()));

    let mut hasher = Sha1::new();
    hasher.update(&encoded);
    let hash_result = hasher.finalize();
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&hash_result);

    InfoHash::new(hash)
}

/// Splits concatenated piece digests into hex strings.
///
/// # Errors
///
/// - `TorrentError::MalformedTorrent` - Length is not a multiple of 20
pub fn split_piece_hashes(pieces: &[u8]) -> Result<Vec<String>, TorrentError> {
    if pieces.len() % PIECE_HASH_LEN != 0 {
        return Err(TorrentError::malformed(
            "info.pieces",
            format!(
                "length {} is not a multiple of {PIECE_HASH_LEN}",
                pieces.len()
            ),
        ));
    }

    Ok(pieces.chunks_exact(PIECE_HASH_LEN).map(hex::encode).collect())
}

/// Total payload size and the layout it implies.
///
/// A non-empty `files` list takes precedence over `length`. The torrent is
/// multi-file only when the summed file lengths are non-zero.
///
/// # Errors
///
/// - `TorrentError::MalformedTorrent` - File lengths overflow a 64-bit sum
pub fn calculate_torrent_size(info: &InfoDictionary) -> Result<(i64, TorrentType), TorrentError> {
    if !info.files.is_empty() {
        let size = info
            .files
            .iter()
            .try_fold(0i64, |total, file| total.checked_add(file.length))
            .ok_or_else(|| TorrentError::malformed("info.files", "total length overflows"))?;
        let torrent_type = if size != 0 {
            TorrentType::MultipleFile
        } else {
            TorrentType::SingleFile
        };
        return Ok((size, torrent_type));
    }

    Ok((info.length.unwrap_or(0), TorrentType::SingleFile))
}

/// Size reported for the final piece.
///
/// `Legacy` is `min(size, pieces * piece_length - size)`. It matches the
/// remainder only by coincidence and may be negative or larger than a piece
/// for inconsistent inputs.
///
/// # Errors
///
/// - `TorrentError::MalformedTorrent` - Result does not fit in 64 bits
pub fn calculate_last_piece_size(
    formula: LastPieceFormula,
    torrent_size: i64,
    number_of_pieces: usize,
    piece_length: i64,
) -> Result<i64, TorrentError> {
    let size = i128::from(torrent_size);
    let pieces = number_of_pieces as i128;
    let piece_length = i128::from(piece_length);

    let last = match formula {
        LastPieceFormula::Legacy => size.min(pieces * piece_length - size),
        LastPieceFormula::Remainder if pieces == 0 => 0,
        LastPieceFormula::Remainder => size - (pieces - 1) * piece_length,
    };

    i64::try_from(last)
        .map_err(|_| TorrentError::malformed("info.piece length", "piece arithmetic overflows"))
}

fn collect_warnings(
    last_piece_size: i64,
    piece_length: i64,
    torrent_size: i64,
    torrent_type: TorrentType,
) -> Vec<AnalysisWarning> {
    let mut warnings = Vec::new();
    if last_piece_size > piece_length {
        warnings.push(AnalysisWarning::LastPieceExceedsPieceLength);
    }
    if piece_length > torrent_size && torrent_type == TorrentType::MultipleFile {
        warnings.push(AnalysisWarning::PieceLengthExceedsTorrentSize);
    }
    warnings
}

/// Renders `<epoch-seconds> (<UTC timestamp>)`.
///
/// Timestamps chrono cannot represent are shown as the bare epoch value.
pub fn format_creation_date(epoch_seconds: i64) -> String {
    match DateTime::from_timestamp(epoch_seconds, 0) {
        Some(timestamp) => format!(
            "{epoch_seconds} ({})",
            timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => epoch_seconds.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::torrent::descriptor::{FileEntry, TextField};

    fn info_with(piece_length: i64, pieces: usize, length: Option<i64>, files: &[i64]) -> InfoDictionary {
        InfoDictionary {
            piece_length,
            pieces: vec![0xab; pieces * PIECE_HASH_LEN],
            private: None,
            name: TextField::new("fixture"),
            length,
            md5sum: TextField::default(),
            files: files
                .iter()
                .map(|length| FileEntry {
                    length: *length,
                    path: vec![TextField::new("file")],
                    md5sum: None,
                })
                .collect(),
            source: BencodeMap::new(),
        }
    }

    fn descriptor_with(info: InfoDictionary) -> TorrentDescriptor {
        TorrentDescriptor {
            announce: TextField::new("http://tracker/announce"),
            announce_list: Vec::new(),
            creation_date: None,
            comment: TextField::default(),
            created_by: TextField::default(),
            encoding: TextField::default(),
            url_list: Vec::new(),
            info,
        }
    }

    #[test]
    fn test_single_file_classification() {
        let (size, torrent_type) = calculate_torrent_size(&info_with(16, 1, Some(1024), &[])).unwrap();
        assert_eq!(size, 1024);
        assert_eq!(torrent_type, TorrentType::SingleFile);
        assert_eq!(torrent_type.to_string(), "single file torrent");
    }

    #[test]
    fn test_multi_file_classification() {
        let (size, torrent_type) = calculate_torrent_size(&info_with(16, 1, None, &[100, 200])).unwrap();
        assert_eq!(size, 300);
        assert_eq!(torrent_type, TorrentType::MultipleFile);
        assert_eq!(torrent_type.to_string(), "multiple file torrent");
    }

    #[test]
    fn test_files_take_precedence_over_length() {
        let (size, torrent_type) = calculate_torrent_size(&info_with(16, 1, Some(5), &[7])).unwrap();
        assert_eq!(size, 7);
        assert_eq!(torrent_type, TorrentType::MultipleFile);
    }

    #[test]
    fn test_no_size_information_is_zero_single_file() {
        assert_eq!(
            calculate_torrent_size(&info_with(16, 0, None, &[])).unwrap(),
            (0, TorrentType::SingleFile)
        );
        assert_eq!(
            calculate_torrent_size(&info_with(16, 0, None, &[0, 0])).unwrap(),
            (0, TorrentType::SingleFile)
        );
    }

    #[test]
    fn test_file_length_overflow_is_malformed() {
        let result = calculate_torrent_size(&info_with(16, 1, None, &[i64::MAX, 1]));
        assert!(matches!(
            result,
            Err(TorrentError::MalformedTorrent { field, .. }) if field == "info.files"
        ));
    }

    #[test]
    fn test_legacy_last_piece_size() {
        assert_eq!(
            calculate_last_piece_size(LastPieceFormula::Legacy, 3, 1, 10).unwrap(),
            3
        );
        // Evenly divided payload: the legacy formula yields 0, not a full piece
        assert_eq!(
            calculate_last_piece_size(LastPieceFormula::Legacy, 40, 4, 10).unwrap(),
            0
        );
        assert_eq!(
            calculate_last_piece_size(LastPieceFormula::Legacy, 30, 5, 10).unwrap(),
            20
        );
        assert_eq!(
            calculate_last_piece_size(LastPieceFormula::Legacy, 100, 1, 10).unwrap(),
            -90
        );
    }

    #[test]
    fn test_remainder_last_piece_size() {
        assert_eq!(
            calculate_last_piece_size(LastPieceFormula::Remainder, 40, 4, 10).unwrap(),
            10
        );
        assert_eq!(
            calculate_last_piece_size(LastPieceFormula::Remainder, 35, 4, 10).unwrap(),
            5
        );
        assert_eq!(
            calculate_last_piece_size(LastPieceFormula::Remainder, 35, 0, 10).unwrap(),
            0
        );
    }

    #[test]
    fn test_last_piece_overflow_is_malformed() {
        let result = calculate_last_piece_size(LastPieceFormula::Legacy, i64::MAX, 4, i64::MAX);
        assert!(matches!(result, Ok(i64::MAX)));

        let result = calculate_last_piece_size(LastPieceFormula::Remainder, i64::MIN, 3, i64::MAX);
        assert!(result.is_err());
    }

    #[test]
    fn test_piece_hashes_split_into_hex() {
        let mut pieces = vec![0u8; 20];
        pieces.extend_from_slice(&[0xff; 20]);

        let hashes = split_piece_hashes(&pieces).unwrap();
        assert_eq!(
            hashes,
            vec!["0".repeat(40), "f".repeat(40)]
        );
        assert!(split_piece_hashes(&pieces[..39]).is_err());
        assert!(split_piece_hashes(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_no_warning_when_last_piece_fits() {
        let analysis = MetadataAnalyzer::default()
            .analyze(&descriptor_with(info_with(10, 1, Some(3), &[])))
            .unwrap();

        assert_eq!(analysis.last_piece_size, 3);
        assert!(analysis.warnings.is_empty());
    }

    #[test]
    fn test_last_piece_warning_emitted_once() {
        let analysis = MetadataAnalyzer::default()
            .analyze(&descriptor_with(info_with(10, 5, Some(30), &[])))
            .unwrap();

        assert_eq!(analysis.last_piece_size, 20);
        assert_eq!(
            analysis.warnings,
            vec![AnalysisWarning::LastPieceExceedsPieceLength]
        );
    }

    #[test]
    fn test_piece_length_warning_only_for_multi_file() {
        let multi = MetadataAnalyzer::default()
            .analyze(&descriptor_with(info_with(1000, 1, None, &[100, 200])))
            .unwrap();
        assert_eq!(
            multi.warnings,
            vec![AnalysisWarning::PieceLengthExceedsTorrentSize]
        );
        assert_eq!(
            multi.warnings[0].to_string(),
            "piece length exceeds torrent size"
        );

        let single = MetadataAnalyzer::default()
            .analyze(&descriptor_with(info_with(1000, 1, Some(300), &[])))
            .unwrap();
        assert!(single.warnings.is_empty());
    }

    #[test]
    fn test_remainder_formula_changes_warning_basis() {
        let analyzer = MetadataAnalyzer::new(AnalysisConfig {
            last_piece_formula: LastPieceFormula::Remainder,
        });
        let analysis = analyzer
            .analyze(&descriptor_with(info_with(10, 5, Some(30), &[])))
            .unwrap();

        assert_eq!(analysis.last_piece_size, -10);
        assert!(analysis.warnings.is_empty());
    }

    #[test]
    fn test_creation_date_display() {
        assert_eq!(format_creation_date(0), "0 (1970-01-01 00:00:00 UTC)");
        assert_eq!(
            format_creation_date(1_700_000_000),
            "1700000000 (2023-11-14 22:13:20 UTC)"
        );
        assert_eq!(format_creation_date(i64::MAX), i64::MAX.to_string());

        let mut descriptor = descriptor_with(info_with(10, 1, Some(3), &[]));
        assert_eq!(
            MetadataAnalyzer::default()
                .analyze(&descriptor)
                .unwrap()
                .creation_date_display,
            ""
        );
        descriptor.creation_date = Some(0);
        assert_eq!(
            MetadataAnalyzer::default()
                .analyze(&descriptor)
                .unwrap()
                .creation_date_display,
            "0 (1970-01-01 00:00:00 UTC)"
        );
    }

    #[test]
    fn test_info_hash_of_empty_map() {
        // SHA-1("de")
        assert_eq!(
            calculate_info_hash(&BencodeMap::new()).to_hex(),
            "600ccd1b71569232d01d110bc63e906beab04d8c"
        );
    }
}
