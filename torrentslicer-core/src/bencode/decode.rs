//! Recursive-descent bencode decoder over an in-memory buffer

use std::collections::HashSet;

use super::error::DecodeError;
use super::value::{BencodeMap, BencodeValue};
use crate::config::DecodeLimits;

/// Decodes the first bencode term in `data` using the default limits.
///
/// Returns the term and the number of bytes it occupied. Bytes after the
/// first term are ignored; callers that need the whole buffer to be a single
/// term can compare the consumed count against `data.len()`.
///
/// # Errors
///
/// - `DecodeError` - Malformed syntax, truncated input or a limit violation
pub fn decode(data: &[u8]) -> Result<(BencodeValue, usize), DecodeError> {
    decode_with_limits(data, &DecodeLimits::default())
}

/// Decodes the first bencode term in `data`, enforcing `limits`.
///
/// # Errors
///
/// - `DecodeError::InputTooLarge` - Buffer longer than `limits.max_input_bytes`
/// - `DecodeError::NestingTooDeep` - More than `limits.max_depth` nested containers
/// - Any other `DecodeError` - Malformed or truncated syntax
pub fn decode_with_limits(
    data: &[u8],
    limits: &DecodeLimits,
) -> Result<(BencodeValue, usize), DecodeError> {
    if data.len() > limits.max_input_bytes {
        return Err(DecodeError::InputTooLarge {
            size: data.len(),
            limit: limits.max_input_bytes,
        });
    }

    let mut decoder = Decoder {
        data,
        pos: 0,
        max_depth: limits.max_depth,
    };
    let value = decoder.decode_value(0)?;

    tracing::trace!(
        consumed = decoder.pos,
        total = data.len(),
        kind = value.kind(),
        "Decoded bencode term"
    );

    Ok((value, decoder.pos))
}

/// Cursor state for a single decode call.
struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    fn peek(&self) -> Result<u8, DecodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::UnexpectedEof { offset: self.pos })
    }

    fn decode_value(&mut self, depth: usize) -> Result<BencodeValue, DecodeError> {
        match self.peek()? {
            b'i' => self.decode_integer().map(BencodeValue::Integer),
            b'l' => self.decode_list(depth),
            b'd' => self.decode_map(depth),
            b'0'..=b'9' => self
                .decode_byte_string()
                .map(|bytes| BencodeValue::ByteString(bytes.to_vec())),
            byte => Err(DecodeError::UnexpectedByte {
                offset: self.pos,
                byte,
            }),
        }
    }

    /// Checks the depth bound before opening a container at the cursor.
    fn enter_container(&self, depth: usize) -> Result<usize, DecodeError> {
        let depth = depth + 1;
        if depth > self.max_depth {
            return Err(DecodeError::NestingTooDeep {
                offset: self.pos,
                limit: self.max_depth,
            });
        }
        Ok(depth)
    }

    /// Consumes ASCII digits up to and including `terminator`, returning the digits.
    fn read_digits(&mut self, terminator: u8) -> Result<&'a [u8], DecodeError> {
        let start = self.pos;
        loop {
            let byte = self.peek()?;
            if byte == terminator {
                let digits = &self.data[start..self.pos];
                self.pos += 1;
                return Ok(digits);
            }
            if !byte.is_ascii_digit() {
                return Err(DecodeError::UnexpectedByte {
                    offset: self.pos,
                    byte,
                });
            }
            self.pos += 1;
        }
    }

    fn decode_integer(&mut self) -> Result<i64, DecodeError> {
        let start = self.pos;
        self.pos += 1; // 'i'

        let negative = self.peek()? == b'-';
        if negative {
            self.pos += 1;
        }

        let digits = self.read_digits(b'e')?;
        let invalid = |reason: &str| DecodeError::InvalidInteger {
            offset: start,
            reason: reason.to_string(),
        };

        if digits.is_empty() {
            return Err(invalid("no digits"));
        }
        if digits[0] == b'0' {
            if negative {
                return Err(invalid("negative zero or leading zero"));
            }
            if digits.len() > 1 {
                return Err(invalid("leading zero"));
            }
        }

        // Sign and digits, without the 'i' and 'e' delimiters
        let text = std::str::from_utf8(&self.data[start + 1..self.pos - 1])
            .map_err(|_| invalid("not ASCII"))?;
        text.parse::<i64>()
            .map_err(|_| invalid("out of 64-bit range"))
    }

    fn decode_byte_string(&mut self) -> Result<&'a [u8], DecodeError> {
        let start = self.pos;
        let digits = self.read_digits(b':')?;
        let invalid = |reason: &str| DecodeError::InvalidStringLength {
            offset: start,
            reason: reason.to_string(),
        };

        if digits.len() > 1 && digits[0] == b'0' {
            return Err(invalid("leading zero"));
        }

        let length = std::str::from_utf8(digits)
            .ok()
            .and_then(|text| text.parse::<usize>().ok())
            .ok_or_else(|| invalid("out of range"))?;

        let end = self
            .pos
            .checked_add(length)
            .filter(|end| *end <= self.data.len())
            .ok_or(DecodeError::UnexpectedEof {
                offset: self.data.len(),
            })?;

        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn decode_list(&mut self, depth: usize) -> Result<BencodeValue, DecodeError> {
        let depth = self.enter_container(depth)?;
        self.pos += 1; // 'l'

        let mut items = Vec::new();
        loop {
            if self.peek()? == b'e' {
                self.pos += 1;
                return Ok(BencodeValue::List(items));
            }
            items.push(self.decode_value(depth)?);
        }
    }

    fn decode_map(&mut self, depth: usize) -> Result<BencodeValue, DecodeError> {
        let depth = self.enter_container(depth)?;
        self.pos += 1; // 'd'

        let mut map = BencodeMap::new();
        let mut seen: HashSet<&'a [u8]> = HashSet::new();
        loop {
            match self.peek()? {
                b'e' => {
                    self.pos += 1;
                    return Ok(BencodeValue::Map(map));
                }
                b'0'..=b'9' => {
                    let key_offset = self.pos;
                    let key = self.decode_byte_string()?;
                    if !seen.insert(key) {
                        return Err(DecodeError::DuplicateKey {
                            offset: key_offset,
                            key: String::from_utf8_lossy(key).into_owned(),
                        });
                    }
                    let value = self.decode_value(depth)?;
                    map.push_unique(key.to_vec(), value);
                }
                _ => return Err(DecodeError::NonStringKey { offset: self.pos }),
            }
        }
    }
}
