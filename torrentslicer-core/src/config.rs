//! Centralized configuration for Torrentslicer.
//!
//! Limits and analysis options are plain data with defaults; nothing here
//! reads the environment. Hosts layer their own overrides on top.

/// Central configuration for the decode and analysis pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlicerConfig {
    pub decode: DecodeLimits,
    pub analysis: AnalysisConfig,
}

/// Bounds applied to untrusted input before and during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Largest buffer accepted for decoding
    pub max_input_bytes: usize,
    /// Deepest permitted nesting of lists and maps
    pub max_depth: usize,
}

/// Default input cap (256 MiB)
pub const DEFAULT_MAX_INPUT_BYTES: usize = 256 * 1024 * 1024;

/// Default nesting bound for lists and maps
pub const DEFAULT_MAX_DEPTH: usize = 1000;

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// How the reported last-piece size is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LastPieceFormula {
    /// `min(size, pieces * piece_length - size)`, kept for compatibility with
    /// existing reports. Not a true remainder.
    #[default]
    Legacy,
    /// Actual byte count of the final piece: `size - (pieces - 1) * piece_length`.
    Remainder,
}

/// Options for the metadata analyzer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub last_piece_formula: LastPieceFormula,
}

impl SlicerConfig {
    /// Creates a configuration with small limits for fast tests.
    pub fn for_testing() -> Self {
        Self {
            decode: DecodeLimits {
                max_input_bytes: 1024 * 1024,
                max_depth: 64,
            },
            analysis: AnalysisConfig::default(),
        }
    }
}
