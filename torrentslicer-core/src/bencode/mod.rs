//! Bencode decoding and canonical re-encoding.
//!
//! Bencode defines four term kinds:
//!
//! | Kind | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` |
//! | Byte string | `<length>:<bytes>` | `4:spam` |
//! | List | `l<items>e` | `l4:spami42ee` |
//! | Map | `d<key><value>...e` | `d3:foo3:bare` |
//!
//! Decoding works on a whole in-memory buffer and produces an owned,
//! immutable [`BencodeValue`] tree. Map entries keep their source order so
//! that [`encode`] reproduces the original bytes of a decoded sub-tree.

pub mod decode;
pub mod encode;
pub mod error;
pub mod value;

pub use decode::{decode, decode_with_limits};
pub use encode::encode;
pub use error::DecodeError;
pub use value::{BencodeMap, BencodeValue};
