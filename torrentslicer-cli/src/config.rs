//! Configuration layering for the CLI.
//!
//! Precedence, lowest first: core defaults, `TORRENTSLICER_*` environment
//! variables, command-line flags.

use anyhow::Context;
use torrentslicer_core::{LastPieceFormula, SlicerConfig};

pub const MAX_INPUT_BYTES_VAR: &str = "TORRENTSLICER_MAX_INPUT_BYTES";
pub const MAX_DEPTH_VAR: &str = "TORRENTSLICER_MAX_DEPTH";

/// Values given on the command line. `None` leaves the lower layer in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides {
    pub max_input_bytes: Option<usize>,
    pub max_depth: Option<usize>,
    pub remainder_last_piece: bool,
}

/// Builds the effective configuration from the process environment and `overrides`.
///
/// # Errors
///
/// - `anyhow::Error` - An environment override is not a positive integer
pub fn resolve_config(overrides: &CliOverrides) -> anyhow::Result<SlicerConfig> {
    resolve_with(overrides, |name| std::env::var(name).ok())
}

fn resolve_with(
    overrides: &CliOverrides,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<SlicerConfig> {
    let mut config = SlicerConfig::default();

    if let Some(value) = read_limit(&lookup, MAX_INPUT_BYTES_VAR)? {
        config.decode.max_input_bytes = value;
    }
    if let Some(value) = read_limit(&lookup, MAX_DEPTH_VAR)? {
        config.decode.max_depth = value;
    }

    if let Some(value) = overrides.max_input_bytes {
        config.decode.max_input_bytes = value;
    }
    if let Some(value) = overrides.max_depth {
        config.decode.max_depth = value;
    }
    if overrides.remainder_last_piece {
        config.analysis.last_piece_formula = LastPieceFormula::Remainder;
    }

    tracing::debug!(
        max_input_bytes = config.decode.max_input_bytes,
        max_depth = config.decode.max_depth,
        last_piece_formula = ?config.analysis.last_piece_formula,
        "Resolved configuration"
    );

    Ok(config)
}

fn read_limit(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> anyhow::Result<Option<usize>> {
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let value: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a positive integer, got '{raw}'"))?;
    if value == 0 {
        anyhow::bail!("{name} must be greater than zero");
    }
    Ok(Some(value))
}
