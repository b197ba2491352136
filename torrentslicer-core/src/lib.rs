//! Torrentslicer Core - torrent metadata extraction
//!
//! Decodes bencoded `.torrent` buffers, projects the decoded tree onto a typed
//! descriptor and derives statistics such as the info-hash, piece hashes and
//! payload size. All work happens on in-memory buffers; reading files and
//! rendering reports belong to the caller.
//!
//! ```
//! use torrentslicer_core::TorrentSlicer;
//!
//! let data = b"d8:announce9:test:80804:infod6:lengthi1000e4:name8:test.txt12:piece lengthi32768e6:pieces20:12345678901234567890ee";
//! let report = TorrentSlicer::default().slice(data).unwrap();
//!
//! assert_eq!(report.analysis.torrent_size, 1000);
//! assert_eq!(report.analysis.torrent_type.to_string(), "single file torrent");
//! ```

pub mod bencode;
pub mod config;
pub mod torrent;

// Re-export main types for convenient access
pub use bencode::{BencodeMap, BencodeValue, DecodeError};
pub use config::{AnalysisConfig, DecodeLimits, LastPieceFormula, SlicerConfig};
pub use torrent::{
    InfoHash, MetadataAnalyzer, TorrentAnalysis, TorrentDescriptor, TorrentError, TorrentReport,
    TorrentSlicer,
};

pub type Result<T> = std::result::Result<T, TorrentError>;
