//! Canonical re-encoding of decoded values
//!
//! Exists so the `info` map can be serialized back to bytes for hashing.
//! Map entries are written in their stored order, never re-sorted.

use super::value::BencodeValue;

/// Encodes a value to its canonical bencode bytes.
///
/// For any value produced by [`decode`](super::decode), decoding the output
/// yields an equal value.
pub fn encode(value: &BencodeValue) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_into(value, &mut buf);
    buf
}

/// Appends the encoding of `value` to `buf`.
pub fn encode_into(value: &BencodeValue, buf: &mut Vec<u8>) {
    match value {
        BencodeValue::Integer(number) => {
            buf.push(b'i');
            buf.extend_from_slice(number.to_string().as_bytes());
            buf.push(b'e');
        }
        BencodeValue::ByteString(bytes) => encode_byte_string(bytes, buf),
        BencodeValue::List(items) => {
            buf.push(b'l');
            for item in items {
                encode_into(item, buf);
            }
            buf.push(b'e');
        }
        BencodeValue::Map(map) => {
            buf.push(b'd');
            for (key, item) in map.iter() {
                encode_byte_string(key, buf);
                encode_into(item, buf);
            }
            buf.push(b'e');
        }
    }
}

fn encode_byte_string(bytes: &[u8], buf: &mut Vec<u8>) {
    buf.extend_from_slice(bytes.len().to_string().as_bytes());
    buf.push(b':');
    buf.extend_from_slice(bytes);
}
