//! CLI command implementations

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::Subcommand;
use torrentslicer_core::{DecodeError, DecodeLimits, SlicerConfig, TorrentReport, TorrentSlicer};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print the metadata report for a torrent file
    Inspect {
        /// Path to the .torrent file
        path: PathBuf,
        /// Emit the report as JSON instead of text
        #[arg(long)]
        json: bool,
        /// Write the piece hashes as a JSON array to this file
        #[arg(long, value_name = "OUT")]
        piece_hashes: Option<PathBuf>,
    },
    /// Print only the info-hash of a torrent file
    InfoHash {
        /// Path to the .torrent file
        path: PathBuf,
    },
}

/// Handle the CLI command
///
/// # Errors
///
/// - `anyhow::Error` - File could not be read or written, or the torrent was rejected
pub fn handle_command(command: Commands, config: SlicerConfig) -> anyhow::Result<()> {
    let slicer = TorrentSlicer::new(config);
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Inspect {
            path,
            json,
            piece_hashes,
        } => inspect(&slicer, &path, json, piece_hashes.as_deref(), &mut stdout),
        Commands::InfoHash { path } => {
            let report = slice_file(&slicer, &path)?;
            writeln!(stdout, "{}", report.analysis.info_hash)?;
            Ok(())
        }
    }
}

/// Analyze one file and write its report to `out`
///
/// # Errors
///
/// - `anyhow::Error` - Reading, slicing or writing failed
pub fn inspect(
    slicer: &TorrentSlicer,
    path: &Path,
    json: bool,
    piece_hashes_out: Option<&Path>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let report = slice_file(slicer, path)?;

    if let Some(artifact) = piece_hashes_out {
        let hashes = report.piece_hashes_json()?;
        fs::write(artifact, hashes)
            .with_context(|| format!("failed to write piece hashes to {}", artifact.display()))?;
        tracing::info!(
            path = %artifact.display(),
            count = report.analysis.number_of_pieces,
            "Wrote piece hashes"
        );
    }

    if json {
        writeln!(out, "{}", report.to_json_pretty()?)?;
    } else {
        render_report(&report, out)?;
    }

    Ok(())
}

/// Read and analyze a torrent file, rejecting oversized files before reading them.
///
/// # Errors
///
/// - `anyhow::Error` - File is unreadable, too large, or not a valid torrent
pub fn slice_file(slicer: &TorrentSlicer, path: &Path) -> anyhow::Result<TorrentReport> {
    let data = read_torrent_file(path, &slicer.config().decode)?;
    tracing::info!(path = %path.display(), size = data.len(), "Analyzing torrent file");

    slicer
        .slice(&data)
        .map_err(|error| anyhow!(error.user_message()))
        .with_context(|| format!("failed to analyze {}", path.display()))
}

fn read_torrent_file(path: &Path, limits: &DecodeLimits) -> anyhow::Result<Vec<u8>> {
    let metadata =
        fs::metadata(path).with_context(|| format!("failed to stat {}", path.display()))?;
    let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
    if size > limits.max_input_bytes {
        let error = DecodeError::InputTooLarge {
            size,
            limit: limits.max_input_bytes,
        };
        return Err(anyhow!(error)).with_context(|| format!("refusing to read {}", path.display()));
    }

    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Text rendering with one block per report section.
///
/// # Errors
///
/// - `io::Error` - Writing to `out` failed
pub fn render_report(report: &TorrentReport, out: &mut impl Write) -> io::Result<()> {
    let descriptor = &report.descriptor;
    let info = &descriptor.info;
    let analysis = &report.analysis;

    section(out, "Torrent File Information")?;
    field(out, "Name", &info.name.to_text())?;
    field(out, "Info Hash", &analysis.info_hash.to_hex())?;
    field(out, "Torrent Type", analysis.torrent_type.as_str())?;
    field(out, "Torrent Size", &analysis.torrent_size.to_string())?;
    field(out, "Piece Length", &analysis.piece_length.to_string())?;
    field(out, "Number of Pieces", &analysis.number_of_pieces.to_string())?;
    field(out, "Last Piece Size", &analysis.last_piece_size.to_string())?;
    field(out, "Announce", &descriptor.announce.to_text())?;
    field(out, "Comment", &descriptor.comment.to_text())?;
    field(out, "Created By", &descriptor.created_by.to_text())?;
    field(out, "Creation Date", &analysis.creation_date_display)?;
    field(out, "Encoding", &descriptor.encoding.to_text())?;
    field(out, "MD5 Sum", &info.md5sum.to_text())?;
    field(
        out,
        "Private",
        if info.private == Some(1) { "yes" } else { "no" },
    )?;

    let trackers: Vec<_> = descriptor
        .tracker_urls()
        .into_iter()
        .filter(|url| !url.is_empty())
        .collect();
    if !trackers.is_empty() {
        section(out, "Tracker URLs")?;
        for url in trackers {
            writeln!(out, "  {url}")?;
        }
    }

    if !descriptor.url_list.is_empty() {
        section(out, "Web Seeds")?;
        for url in &descriptor.url_list {
            writeln!(out, "  {url}")?;
        }
    }

    if !info.files.is_empty() {
        section(out, "Files")?;
        for file in &info.files {
            match &file.md5sum {
                Some(md5sum) => writeln!(
                    out,
                    "  {} ({} bytes, md5 {md5sum})",
                    file.display_path(),
                    file.length
                )?,
                None => writeln!(out, "  {} ({} bytes)", file.display_path(), file.length)?,
            }
        }
    }

    if !analysis.warnings.is_empty() {
        section(out, "Warnings")?;
        for warning in &analysis.warnings {
            writeln!(out, "  {warning}")?;
        }
    }

    Ok(())
}

fn section(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "\n{title}")?;
    writeln!(out, "{:-<60}", "")
}

fn field(out: &mut impl Write, label: &str, value: &str) -> io::Result<()> {
    writeln!(out, "{:<18}{value}", format!("{label}:"))
}
