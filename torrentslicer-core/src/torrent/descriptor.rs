//! Validated projection of a decoded torrent document
//!
//! Required fields must be present with the right variant. Optional fields
//! fall back to a default when absent but are still rejected when present
//! with the wrong variant.

use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};

use super::TorrentError;
use crate::bencode::{BencodeMap, BencodeValue};

type ParseResult<T> = Result<T, TorrentError>;

/// Length of one SHA-1 piece digest inside `info.pieces`
pub const PIECE_HASH_LEN: usize = 20;

/// Byte-string field that is conventionally text.
///
/// The raw bytes are authoritative; [`TextField::to_text`] is a lossy UTF-8
/// rendering for display only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField(Vec<u8>);

impl TextField {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Best-effort UTF-8 decoding, replacing invalid sequences.
    pub fn to_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl Serialize for TextField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

/// One entry of `info.files` in a multi-file torrent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub length: i64,
    pub path: Vec<TextField>,
    pub md5sum: Option<TextField>,
}

impl FileEntry {
    /// Path segments joined with `/` for display.
    pub fn display_path(&self) -> String {
        self.path
            .iter()
            .map(|segment| segment.to_text())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Typed view of the `info` dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoDictionary {
    pub piece_length: i64,
    #[serde(skip)]
    pub pieces: Vec<u8>,
    pub private: Option<i64>,
    pub name: TextField,
    pub length: Option<i64>,
    pub md5sum: TextField,
    pub files: Vec<FileEntry>,
    /// The decoded `info` map, kept for hashing
    #[serde(skip)]
    pub source: BencodeMap,
}

impl InfoDictionary {
    /// Number of 20-byte digests in `pieces`.
    pub fn piece_count(&self) -> usize {
        self.pieces.len() / PIECE_HASH_LEN
    }
}

/// Fields extracted from the root map of a torrent file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TorrentDescriptor {
    pub announce: TextField,
    pub announce_list: Vec<Vec<TextField>>,
    pub creation_date: Option<i64>,
    pub comment: TextField,
    pub created_by: TextField,
    pub encoding: TextField,
    pub url_list: Vec<TextField>,
    pub info: InfoDictionary,
}

impl TorrentDescriptor {
    /// Extracts a descriptor from a decoded document, which must be a map.
    ///
    /// # Errors
    ///
    /// - `TorrentError::MalformedTorrent` - Root is not a map, or a field is missing or mistyped
    pub fn from_root(root: &BencodeValue) -> ParseResult<Self> {
        let map = root.as_map().ok_or_else(|| {
            TorrentError::malformed("<root>", format!("must be a map, found {}", root.kind()))
        })?;
        Self::from_map(map)
    }

    /// Extracts a descriptor from the root map.
    ///
    /// # Errors
    ///
    /// - `TorrentError::MalformedTorrent` - A field is missing or mistyped
    pub fn from_map(root: &BencodeMap) -> ParseResult<Self> {
        let announce = extract_text(required(root, "announce", "announce")?, "announce")?;

        let announce_list = match root.get(b"announce-list") {
            Some(value) => extract_announce_tiers(value)?,
            None => Vec::new(),
        };

        let creation_date = optional(root, "creation date")
            .map(|value| extract_integer(value, "creation date"))
            .transpose()?;
        let comment = optional_text(root, "comment", "comment")?;
        let created_by = optional_text(root, "created by", "created by")?;
        let encoding = optional_text(root, "encoding", "encoding")?;

        let url_list = match root.get(b"url-list") {
            Some(value) => extract_url_list(value)?,
            None => Vec::new(),
        };

        let info_value = required(root, "info", "info")?;
        let info_map = info_value.as_map().ok_or_else(|| wrong_variant("info", "map", info_value))?;
        let info = extract_info(info_map)?;

        Ok(Self {
            announce,
            announce_list,
            creation_date,
            comment,
            created_by,
            encoding,
            url_list,
            info,
        })
    }

    /// Primary announce URL followed by every announce-list entry, in order.
    pub fn tracker_urls(&self) -> Vec<&TextField> {
        std::iter::once(&self.announce)
            .chain(self.announce_list.iter().flatten())
            .collect()
    }
}

fn extract_info(info: &BencodeMap) -> ParseResult<InfoDictionary> {
    let piece_length = extract_integer(
        required(info, "piece length", "info.piece length")?,
        "info.piece length",
    )?;

    let pieces = extract_bytes(required(info, "pieces", "info.pieces")?, "info.pieces")?;
    if pieces.len() % PIECE_HASH_LEN != 0 {
        return Err(TorrentError::malformed(
            "info.pieces",
            format!(
                "length {} is not a multiple of {PIECE_HASH_LEN}",
                pieces.len()
            ),
        ));
    }

    let private = optional(info, "private")
        .map(|value| extract_integer(value, "info.private"))
        .transpose()?;
    let name = optional_text(info, "name", "info.name")?;
    let length = optional(info, "length")
        .map(|value| extract_integer(value, "info.length"))
        .transpose()?;
    let md5sum = optional_text(info, "md5sum", "info.md5sum")?;

    let files = match info.get(b"files") {
        Some(value) => {
            let entries = value
                .as_list()
                .ok_or_else(|| wrong_variant("info.files", "list", value))?;
            entries
                .iter()
                .enumerate()
                .map(|(index, entry)| extract_file_entry(entry, index))
                .collect::<ParseResult<Vec<_>>>()?
        }
        None => Vec::new(),
    };

    Ok(InfoDictionary {
        piece_length,
        pieces: pieces.to_vec(),
        private,
        name,
        length,
        md5sum,
        files,
        source: info.clone(),
    })
}

fn extract_file_entry(entry: &BencodeValue, index: usize) -> ParseResult<FileEntry> {
    let field = format!("info.files[{index}]");
    let map = entry
        .as_map()
        .ok_or_else(|| wrong_variant(&field, "map", entry))?;

    let length_field = format!("{field}.length");
    let length = extract_integer(required(map, "length", &length_field)?, &length_field)?;

    let path_field = format!("{field}.path");
    let path_value = required(map, "path", &path_field)?;
    let segments = path_value
        .as_list()
        .ok_or_else(|| wrong_variant(&path_field, "list", path_value))?;
    let path = segments
        .iter()
        .enumerate()
        .map(|(segment_index, segment)| {
            extract_text(segment, &format!("{path_field}[{segment_index}]"))
        })
        .collect::<ParseResult<Vec<_>>>()?;

    let md5sum_field = format!("{field}.md5sum");
    let md5sum = optional(map, "md5sum")
        .map(|value| extract_text(value, &md5sum_field))
        .transpose()?;

    Ok(FileEntry {
        length,
        path,
        md5sum,
    })
}

fn extract_announce_tiers(value: &BencodeValue) -> ParseResult<Vec<Vec<TextField>>> {
    let tiers = value
        .as_list()
        .ok_or_else(|| wrong_variant("announce-list", "list", value))?;

    tiers
        .iter()
        .enumerate()
        .map(|(tier_index, tier)| {
            let field = format!("announce-list[{tier_index}]");
            let urls = tier
                .as_list()
                .ok_or_else(|| wrong_variant(&field, "list", tier))?;
            urls.iter()
                .enumerate()
                .map(|(url_index, url)| extract_text(url, &format!("{field}[{url_index}]")))
                .collect::<ParseResult<Vec<_>>>()
        })
        .collect()
}

/// BEP 19 allows `url-list` to be a single URL instead of a list.
fn extract_url_list(value: &BencodeValue) -> ParseResult<Vec<TextField>> {
    match value {
        BencodeValue::ByteString(bytes) => Ok(vec![TextField::new(bytes.clone())]),
        BencodeValue::List(urls) => urls
            .iter()
            .enumerate()
            .map(|(index, url)| extract_text(url, &format!("url-list[{index}]")))
            .collect(),
        other => Err(wrong_variant("url-list", "list", other)),
    }
}

fn required<'a>(map: &'a BencodeMap, key: &str, field: &str) -> ParseResult<&'a BencodeValue> {
    map.get(key.as_bytes())
        .ok_or_else(|| TorrentError::malformed(field, "is missing"))
}

fn optional<'a>(map: &'a BencodeMap, key: &str) -> Option<&'a BencodeValue> {
    map.get(key.as_bytes())
}

fn optional_text(map: &BencodeMap, key: &str, field: &str) -> ParseResult<TextField> {
    optional(map, key)
        .map(|value| extract_text(value, field))
        .transpose()
        .map(Option::unwrap_or_default)
}

fn extract_bytes<'a>(value: &'a BencodeValue, field: &str) -> ParseResult<&'a [u8]> {
    value
        .as_bytes()
        .ok_or_else(|| wrong_variant(field, "byte string", value))
}

fn extract_text(value: &BencodeValue, field: &str) -> ParseResult<TextField> {
    extract_bytes(value, field).map(TextField::new)
}

fn extract_integer(value: &BencodeValue, field: &str) -> ParseResult<i64> {
    value
        .as_integer()
        .ok_or_else(|| wrong_variant(field, "integer", value))
}

fn wrong_variant(field: &str, expected: &str, found: &BencodeValue) -> TorrentError {
    TorrentError::malformed(
        field,
        format!("must be a {expected}, found {}", found.kind()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bencode::decode;

    const SINGLE_FILE: &[u8] = b"d8:announce9:test:80804:infod6:lengthi1000e4:name8:test.txt12:piece lengthi32768e6:pieces20:12345678901234567890ee";

    fn descriptor_from(data: &[u8]) -> ParseResult<TorrentDescriptor> {
        let (root, _) = decode(data)?;
        TorrentDescriptor::from_root(&root)
    }

    fn malformed_field(result: ParseResult<TorrentDescriptor>) -> String {
        match result {
            Err(TorrentError::MalformedTorrent { field, .. }) => field,
            other => panic!("expected malformed torrent error, got {other:?}"),
        }
    }

    #[test]
    fn test_single_file_extraction_with_defaults() {
        let descriptor = descriptor_from(SINGLE_FILE).unwrap();

        assert_eq!(descriptor.announce.as_bytes(), b"test:8080");
        assert!(descriptor.announce_list.is_empty());
        assert_eq!(descriptor.creation_date, None);
        assert!(descriptor.comment.is_empty());
        assert!(descriptor.created_by.is_empty());
        assert!(descriptor.encoding.is_empty());
        assert!(descriptor.url_list.is_empty());

        let info = &descriptor.info;
        assert_eq!(info.piece_length, 32768);
        assert_eq!(info.piece_count(), 1);
        assert_eq!(info.private, None);
        assert_eq!(info.name.to_text(), "test.txt");
        assert_eq!(info.length, Some(1000));
        assert!(info.md5sum.is_empty());
        assert!(info.files.is_empty());
        assert_eq!(info.source.len(), 4);
    }

    #[test]
    fn test_multi_file_extraction() {
        let data = b"d8:announce9:test:808013:announce-listll5:tier1el5:tier25:tier3ee\
                     13:creation datei1700000000e7:comment5:hello8:url-list10:http://web\
                     4:infod5:filesld6:lengthi500e4:pathl3:dir5:file1eed6:lengthi300e6:md5sum3:abc4:pathl5:file2eee\
                     4:name8:test.dir12:piece lengthi16384e6:pieces40:1234567890123456789012345678901234567890\
                     7:privatei1eee";
        let descriptor = descriptor_from(data).unwrap();

        assert_eq!(descriptor.announce_list.len(), 2);
        assert_eq!(descriptor.announce_list[1][1].to_text(), "tier3");
        assert_eq!(descriptor.tracker_urls().len(), 4);
        assert_eq!(descriptor.creation_date, Some(1_700_000_000));
        assert_eq!(descriptor.comment.to_text(), "hello");
        assert_eq!(descriptor.url_list, vec![TextField::new("http://web")]);

        let info = &descriptor.info;
        assert_eq!(info.private, Some(1));
        assert_eq!(info.length, None);
        assert_eq!(info.files.len(), 2);
        assert_eq!(info.files[0].display_path(), "dir/file1");
        assert_eq!(info.files[0].md5sum, None);
        assert_eq!(info.files[1].length, 300);
        assert_eq!(info.files[1].md5sum, Some(TextField::new("abc")));
    }

    #[test]
    fn test_missing_required_fields() {
        assert_eq!(
            malformed_field(descriptor_from(
                b"d4:infod12:piece lengthi1e6:pieces0:ee"
            )),
            "announce"
        );
        assert_eq!(
            malformed_field(descriptor_from(b"d8:announce3:urle")),
            "info"
        );
        assert_eq!(
            malformed_field(descriptor_from(b"d8:announce3:url4:infod6:pieces0:ee")),
            "info.piece length"
        );
        assert_eq!(
            malformed_field(descriptor_from(
                b"d8:announce3:url4:infod12:piece lengthi1eee"
            )),
            "info.pieces"
        );
    }

    #[test]
    fn test_wrong_variants_rejected() {
        assert_eq!(
            malformed_field(descriptor_from(b"d8:announcei5e4:infodee")),
            "announce"
        );
        assert_eq!(
            malformed_field(descriptor_from(b"d8:announce3:url4:info3:abce")),
            "info"
        );
        assert_eq!(
            malformed_field(descriptor_from(
                b"d8:announce3:url7:commentli1ee4:infod12:piece lengthi1e6:pieces0:ee"
            )),
            "comment"
        );
        assert_eq!(
            malformed_field(descriptor_from(
                b"d8:announce3:url4:infod5:filesld6:lengthi1e4:pathli7eeee12:piece lengthi1e6:pieces0:ee"
            )),
            "info.files[0].path[0]"
        );
    }

    #[test]
    fn test_pieces_length_must_be_multiple_of_twenty() {
        let data = b"d8:announce9:test:80804:infod6:lengthi1000e4:name8:test.txt12:piece lengthi32768e6:pieces19:1234567890123456789ee";
        let error = descriptor_from(data).unwrap_err();

        assert_eq!(
            error,
            TorrentError::MalformedTorrent {
                field: "info.pieces".to_string(),
                reason: "length 19 is not a multiple of 20".to_string(),
            }
        );
    }

    #[test]
    fn test_root_must_be_map() {
        assert_eq!(malformed_field(descriptor_from(b"l4:teste")), "<root>");
    }

    #[test]
    fn test_non_utf8_text_is_kept_raw() {
        let mut data = b"d8:announce3:url7:comment2:".to_vec();
        data.extend_from_slice(&[0xff, 0xfe]);
        data.extend_from_slice(b"4:infod12:piece lengthi1e6:pieces0:ee");
        let descriptor = descriptor_from(&data).unwrap();

        assert_eq!(descriptor.comment.as_bytes(), &[0xff, 0xfe]);
        assert_eq!(descriptor.comment.to_text(), "\u{fffd}\u{fffd}");
    }
}
